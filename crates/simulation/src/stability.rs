//! Day cycle: income payout and the stability meter.

use bevy::prelude::*;

use crate::city_state::{CityState, CityTotals};
use crate::config::{DAY_LENGTH_MS, SIM_TICK_MS};

/// Tuning for the stability change rate. Per-second values are scaled to
/// the reporting window before use.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct StabilityConfig {
    pub default_change_rate: f64,
    pub service_per_second: f64,
    pub unemployment_penalty: f64,
    pub pollution_threshold: f64,
    pub pollution_penalty: f64,
    pub power_deficit_penalty: f64,
    /// Seconds of change applied per rollover.
    pub window_secs: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            default_change_rate: 0.0,
            service_per_second: 0.1,
            unemployment_penalty: 0.2,
            pollution_threshold: 100.0,
            pollution_penalty: 0.1,
            power_deficit_penalty: 0.3,
            window_secs: f64::from(DAY_LENGTH_MS) / 1_000.0,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl StabilityConfig {
    fn adjusted(&self, per_second: f64) -> f64 {
        round2(per_second * self.window_secs)
    }

    /// Stability change for the next window, from current city totals.
    pub fn change_rate(&self, totals: &CityTotals) -> f64 {
        let mut rate = self.default_change_rate;

        rate += f64::from(totals.service_count) * self.adjusted(self.service_per_second);

        let job_surplus = totals.total_jobs - totals.max_population;
        if job_surplus > 0.0 && totals.max_population > 0.0 {
            let ratio = round2(job_surplus / totals.max_population);
            rate -= ratio * self.adjusted(self.unemployment_penalty);
        }

        if totals.pollution > self.pollution_threshold {
            let factor = (totals.pollution / self.pollution_threshold).powi(2);
            rate -= round2(factor * self.adjusted(self.pollution_penalty));
        }

        let power_deficit = totals.power_usage - totals.max_power;
        if power_deficit > 0.0 && totals.max_power > 0.0 {
            let ratio = round2(power_deficit / totals.max_power);
            rate -= ratio * self.adjusted(self.power_deficit_penalty);
        }

        if rate.is_finite() {
            rate
        } else {
            0.0
        }
    }
}

/// Milliseconds into the current day.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct DayTimer {
    pub elapsed_ms: u32,
}

/// Pay out the day's income, advance the day and move stability.
pub fn next_day(city: &mut CityState, totals: &CityTotals, config: &StabilityConfig) {
    city.credits += totals.daily_income;
    city.game_day += 1;
    city.stability_change_rate = config.change_rate(totals);
    city.stability = (city.stability + city.stability_change_rate).clamp(0.0, 100.0);
}

pub fn advance_day_cycle(
    mut timer: ResMut<DayTimer>,
    mut city: ResMut<CityState>,
    totals: Res<CityTotals>,
    config: Res<StabilityConfig>,
) {
    timer.elapsed_ms += SIM_TICK_MS;
    if timer.elapsed_ms < DAY_LENGTH_MS {
        return;
    }
    timer.elapsed_ms -= DAY_LENGTH_MS;
    next_day(&mut city, &totals, &config);
    info!(
        "Day {}: +{:.0} credits (now {:.0}), stability {:.2} ({:+.2})",
        city.game_day,
        totals.daily_income,
        city.credits,
        city.stability,
        city.stability_change_rate
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_raise_stability() {
        let config = StabilityConfig::default();
        let totals = CityTotals {
            service_count: 3,
            ..Default::default()
        };
        assert!((config.change_rate(&totals) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_unemployment_penalty() {
        let config = StabilityConfig::default();
        let totals = CityTotals {
            total_jobs: 30.0,
            max_population: 20.0,
            ..Default::default()
        };
        // ratio 0.5 * (0.2 * 5)
        assert!((config.change_rate(&totals) + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_pollution_penalty_is_quadratic() {
        let config = StabilityConfig::default();
        let totals = CityTotals {
            pollution: 200.0,
            ..Default::default()
        };
        // (200 / 100)^2 * (0.1 * 5)
        assert!((config.change_rate(&totals) + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_power_means_no_deficit_ratio() {
        let config = StabilityConfig::default();
        let totals = CityTotals {
            power_usage: 50.0,
            max_power: 0.0,
            ..Default::default()
        };
        assert_eq!(config.change_rate(&totals), 0.0);
    }

    #[test]
    fn test_non_finite_rate_is_neutral() {
        let config = StabilityConfig::default();
        let totals = CityTotals {
            pollution: f64::INFINITY,
            ..Default::default()
        };
        assert_eq!(config.change_rate(&totals), 0.0);
    }

    #[test]
    fn test_next_day_clamps_stability() {
        let config = StabilityConfig::default();
        let mut city = CityState {
            stability: 1.0,
            ..Default::default()
        };
        let totals = CityTotals {
            daily_income: 40.0,
            pollution: 1_000.0,
            ..Default::default()
        };
        next_day(&mut city, &totals, &config);
        assert_eq!(city.stability, 0.0);
        assert_eq!(city.game_day, 2);
        assert_eq!(city.credits, 3_040.0);
    }
}
