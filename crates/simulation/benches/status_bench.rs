//! Criterion benchmarks for the per-tick status pipeline.
//!
//! Benchmarks:
//!   - effective value lookup for a house surrounded by shops and parks
//!   - city totals over a fully built grid
//!   - one full `FixedUpdate` tick with every tile occupied
//!
//! Run with: cargo bench -p simulation --bench status_bench --features bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use simulation::building_data::{Attribute, BuildingCatalog, BuildingType};
use simulation::city_state::{CityTotals, InteractionMode};
use simulation::config::GRID_SIZE;
use simulation::grid::{GridPos, Terrain, TileGrid};
use simulation::modifiers::effective_building_value;
use simulation::test_harness::TestCity;

/// Building placed at (x, y) in the benchmark layout: roads on every third
/// row, a mix of homes, shops, parks and power elsewhere.
fn layout(x: i32, y: i32) -> BuildingType {
    if y % 3 == 0 {
        return BuildingType::Road;
    }
    match (x + y) % 6 {
        0 | 1 => BuildingType::House,
        2 => BuildingType::Shop,
        3 => BuildingType::Park,
        4 => BuildingType::WindPower,
        _ => BuildingType::House2,
    }
}

fn full_grid(catalog: &BuildingCatalog) -> TileGrid {
    let mut grid = TileGrid::default();
    let size = GRID_SIZE as i32;
    for y in 0..size {
        for x in 0..size {
            let building = layout(x, y);
            if let Some(tile) = grid.get_mut(GridPos::new(x, y)) {
                tile.terrain = Terrain::Ground;
                tile.building = Some(building);
                tile.level = 1;
                tile.detail = catalog.level(building, 1).cloned();
            }
        }
    }
    grid
}

fn full_city() -> TestCity {
    let mut city = TestCity::new().with_mode(InteractionMode::Select);
    let size = GRID_SIZE as i32;
    for y in 0..size {
        for x in 0..size {
            city = city.with_building(x, y, layout(x, y));
        }
    }
    // Spawn instances before measuring.
    city.tick(1);
    city
}

// ---------------------------------------------------------------------------
// Benchmark: modifier pipeline
// ---------------------------------------------------------------------------

fn bench_effective_value(c: &mut Criterion) {
    let catalog = BuildingCatalog::builtin().expect("built-in tables");
    let grid = full_grid(&catalog);
    let pos = GridPos::new(8, 7);

    c.bench_function("effective_value_house_coin", |b| {
        b.iter(|| {
            black_box(effective_building_value(
                black_box(&grid),
                &catalog,
                pos,
                Attribute::CoinOutput,
            ))
        });
    });

    c.bench_function("city_totals_full_grid", |b| {
        b.iter(|| black_box(CityTotals::compute(black_box(&grid), &catalog)));
    });
}

// ---------------------------------------------------------------------------
// Benchmark: full tick
// ---------------------------------------------------------------------------

fn bench_full_tick(c: &mut Criterion) {
    let mut city = full_city();
    let mut group = c.benchmark_group("full_tick");
    group.sample_size(50);
    group.bench_function("all_tiles_occupied", |b| {
        b.iter(|| city.tick(1));
    });
    group.finish();
}

criterion_group!(benches, bench_effective_value, bench_full_tick);
criterion_main!(benches);
