//! Isometric view camera.
//!
//! The camera sits on a sphere around a ground focus point. Q/E turn the view
//! in quarter steps (the city is drawn on a square grid, so the four diagonal
//! views are the interesting ones); the turn eases towards the target yaw
//! instead of snapping.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use simulation::buildings::ViewerPosition;
use simulation::config::{CELL_SIZE, GRID_SIZE};

const PAN_SPEED: f32 = 12.0;
/// Fraction of the distance removed per scroll line.
const ZOOM_STEP: f32 = 0.12;
/// Pixel-scrolling devices report roughly this many pixels per line.
const PIXELS_PER_LINE: f32 = 100.0;
const MIN_DISTANCE: f32 = 6.0;
const MAX_DISTANCE: f32 = 60.0;
/// How quickly the yaw closes the gap to its target, per second.
const TURN_RATE: f32 = 8.0;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct IsoCamera {
    pub focus: Vec3,
    pub yaw: f32,
    /// Yaw the view is turning towards.
    pub target_yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for IsoCamera {
    fn default() -> Self {
        // Dimetric angle: arctan(1 / sqrt(2)).
        Self {
            focus: Vec3::ZERO,
            yaw: FRAC_PI_4,
            target_yaw: FRAC_PI_4,
            pitch: 35.264_f32.to_radians(),
            distance: 28.0,
        }
    }
}

impl IsoCamera {
    /// Jump straight to a view, skipping the turn animation.
    pub fn set_view(&mut self, focus: Vec3, yaw: f32, pitch: f32, distance: f32) {
        self.focus = focus;
        self.yaw = yaw;
        self.target_yaw = yaw;
        self.pitch = pitch;
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.focus + self.distance * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.focus, Vec3::Y)
    }

    /// Move the focus by a screen-relative offset (x right, y down) and keep
    /// it over the city.
    fn pan(&mut self, screen: Vec2) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.focus.x += screen.x * cos_yaw + screen.y * sin_yaw;
        self.focus.z += -screen.x * sin_yaw + screen.y * cos_yaw;
        let limit = GRID_SIZE as f32 * CELL_SIZE * 0.5;
        self.focus.x = self.focus.x.clamp(-limit, limit);
        self.focus.z = self.focus.z.clamp(-limit, limit);
    }

    fn zoom(&mut self, lines: f32) {
        self.distance = (self.distance * (1.0 - lines * ZOOM_STEP)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Ease `yaw` towards `target_yaw`; settles exactly once close enough.
    fn settle_turn(&mut self, dt_secs: f32) {
        let gap = self.target_yaw - self.yaw;
        if gap.abs() < 1e-3 {
            self.yaw = self.target_yaw;
            return;
        }
        self.yaw += gap * (TURN_RATE * dt_secs).min(1.0);
    }
}

pub fn setup_camera(mut commands: Commands, mut viewer: ResMut<ViewerPosition>) {
    let camera = IsoCamera::default();
    commands.spawn((Camera3d::default(), camera.transform()));
    viewer.0 = Some(camera.eye());
    commands.insert_resource(camera);
}

/// WASD / arrow keys pan across the ground, relative to the current view.
pub fn camera_pan_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut camera: ResMut<IsoCamera>,
) {
    const BINDINGS: [(KeyCode, KeyCode, Vec2); 4] = [
        (KeyCode::KeyW, KeyCode::ArrowUp, Vec2::NEG_Y),
        (KeyCode::KeyS, KeyCode::ArrowDown, Vec2::Y),
        (KeyCode::KeyA, KeyCode::ArrowLeft, Vec2::NEG_X),
        (KeyCode::KeyD, KeyCode::ArrowRight, Vec2::X),
    ];
    let dir: Vec2 = BINDINGS
        .iter()
        .filter(|(key, alt, _)| keys.pressed(*key) || keys.pressed(*alt))
        .map(|(_, _, d)| *d)
        .sum();
    if dir == Vec2::ZERO {
        return;
    }
    camera.pan(dir.normalize() * PAN_SPEED * time.delta_secs());
}

/// Q / E turn the view a quarter step; the turn itself plays out over a few
/// frames.
pub fn camera_rotate_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut camera: ResMut<IsoCamera>,
) {
    if keys.just_pressed(KeyCode::KeyQ) {
        camera.target_yaw -= FRAC_PI_2;
    }
    if keys.just_pressed(KeyCode::KeyE) {
        camera.target_yaw += FRAC_PI_2;
    }
    if camera.yaw != camera.target_yaw {
        camera.settle_turn(time.delta_secs());
    }
}

pub fn camera_zoom(mut wheel: EventReader<MouseWheel>, mut camera: ResMut<IsoCamera>) {
    let lines: f32 = wheel
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / PIXELS_PER_LINE,
        })
        .sum();
    if lines != 0.0 {
        camera.zoom(lines);
    }
}

/// Copy the camera model onto the camera entity and publish the eye position
/// for billboards.
pub fn apply_iso_camera(
    camera: Res<IsoCamera>,
    mut viewer: ResMut<ViewerPosition>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    if !camera.is_changed() {
        return;
    }
    for mut transform in &mut cameras {
        *transform = camera.transform();
    }
    viewer.0 = Some(camera.eye());
}
