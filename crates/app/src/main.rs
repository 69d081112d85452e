use std::time::Duration;

use bevy::prelude::*;
use bevy::render::view::screenshot::{save_to_disk, Screenshot};
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use rendering::camera::IsoCamera;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Isocity".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::Continuous,
        unfocused_mode: UpdateMode::reactive_low_power(Duration::from_millis(100)),
    })
    .add_plugins((simulation::SimulationPlugin, rendering::RenderingPlugin));

    // ISOCITY_SCREENSHOTS=1 captures a fixed set of views to /tmp and exits.
    if std::env::var_os("ISOCITY_SCREENSHOTS").is_some() {
        app.insert_resource(ScreenshotRun::new(vec![
            View {
                name: "overview",
                focus: Vec3::ZERO,
                yaw: std::f32::consts::FRAC_PI_4,
                pitch: 50f32.to_radians(),
                distance: 30.0,
            },
            View {
                name: "factory_closeup",
                focus: Vec3::ZERO,
                yaw: std::f32::consts::FRAC_PI_4,
                pitch: 35f32.to_radians(),
                distance: 10.0,
            },
        ]))
        .add_systems(Update, run_screenshots);
    }

    app.run();
}

struct View {
    name: &'static str,
    focus: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
}

#[derive(Resource)]
struct ScreenshotRun {
    frames: u32,
    views: Vec<View>,
    next: usize,
}

impl ScreenshotRun {
    fn new(views: Vec<View>) -> Self {
        Self {
            frames: 0,
            views,
            next: 0,
        }
    }

    fn last_frame(&self) -> u32 {
        WARMUP_FRAMES + self.views.len() as u32 * FRAMES_PER_VIEW + EXIT_GRACE_FRAMES
    }
}

/// Long enough for the first status indicators to fade in.
const WARMUP_FRAMES: u32 = 120;
const FRAMES_PER_VIEW: u32 = 12;
/// Frame within a view's slot at which the capture is taken.
const CAPTURE_AT: u32 = 6;
/// Frames left for the last image to be written.
const EXIT_GRACE_FRAMES: u32 = 20;

fn run_screenshots(
    mut commands: Commands,
    mut run: ResMut<ScreenshotRun>,
    mut camera: ResMut<IsoCamera>,
    mut exit: EventWriter<AppExit>,
) {
    run.frames += 1;
    if run.frames < WARMUP_FRAMES {
        return;
    }
    if run.next >= run.views.len() {
        if run.frames > run.last_frame() {
            exit.send(AppExit::Success);
        }
        return;
    }

    let slot_frame = (run.frames - WARMUP_FRAMES) % FRAMES_PER_VIEW;
    let view = &run.views[run.next];
    if slot_frame == 0 {
        camera.set_view(view.focus, view.yaw, view.pitch, view.distance);
    } else if slot_frame == CAPTURE_AT {
        let path = format!("/tmp/isocity_{}.png", view.name);
        info!("Capturing {path}");
        commands
            .spawn(Screenshot::primary_window())
            .observe(save_to_disk(path));
        run.next += 1;
    }
}
