use instant::Duration;
use winit::keyboard::KeyCode;

use crate::math::{Matrix4, Quaternion, Vector2, Vector3};

use super::{HeldKeys, MouseButton, MouseModifier, Pole, ViewProvider};

/// Camera state: the camera looks at `target_pos` from `radius` units away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewData {
    pub target_pos: Vector3,
    pub orient: Quaternion,
    pub radius: f32,
    pub deg_spin_rotation: f32,
}

impl ViewData {
    pub fn new(target_pos: Vector3, orient: Quaternion, radius: f32, deg_spin_rotation: f32) -> Self {
        Self {
            target_pos,
            orient,
            radius,
            deg_spin_rotation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewScale {
    pub min_radius: f32,
    pub max_radius: f32,
    pub large_radius_delta: f32,
    pub small_radius_delta: f32,
    pub large_pos_offset: f32,
    pub small_pos_offset: f32,
    /// Degrees per pixel of drag.
    pub rotation_scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetOffsetDir {
    Up,
    Down,
    Forward,
    Backward,
    Right,
    Left,
}

impl TargetOffsetDir {
    fn vector(self) -> Vector3 {
        match self {
            TargetOffsetDir::Up => Vector3::UP,
            TargetOffsetDir::Down => Vector3::DOWN,
            TargetOffsetDir::Forward => Vector3::FORWARD,
            TargetOffsetDir::Backward => Vector3::BACK,
            TargetOffsetDir::Right => Vector3::RIGHT,
            TargetOffsetDir::Left => Vector3::LEFT,
        }
    }
}

const LEFT_HAND_KEYS: [(KeyCode, TargetOffsetDir); 6] = [
    (KeyCode::KeyW, TargetOffsetDir::Forward),
    (KeyCode::KeyS, TargetOffsetDir::Backward),
    (KeyCode::KeyD, TargetOffsetDir::Right),
    (KeyCode::KeyA, TargetOffsetDir::Left),
    (KeyCode::KeyE, TargetOffsetDir::Up),
    (KeyCode::KeyQ, TargetOffsetDir::Down),
];

const RIGHT_HAND_KEYS: [(KeyCode, TargetOffsetDir); 6] = [
    (KeyCode::KeyI, TargetOffsetDir::Forward),
    (KeyCode::KeyK, TargetOffsetDir::Backward),
    (KeyCode::KeyL, TargetOffsetDir::Right),
    (KeyCode::KeyJ, TargetOffsetDir::Left),
    (KeyCode::KeyO, TargetOffsetDir::Up),
    (KeyCode::KeyU, TargetOffsetDir::Down),
];

/// How a drag maps onto the view orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateMode {
    DualAxis,
    Biaxial,
    XzAxis,
    YAxis,
    SpinViewAxis,
}

/// Orbit camera around a target point.
///
/// Dragging with the action button rotates the view, Ctrl restricts the drag
/// to one axis and Alt spins about the viewing axis. The wheel zooms, WASDEQ
/// (or IJKLOU with right-hand controls) moves the target.
#[derive(Debug, Clone)]
pub struct ViewPole {
    current: ViewData,
    initial: ViewData,
    scale: ViewScale,
    action_button: MouseButton,
    right_keyboard_ctrls: bool,

    dragging: bool,
    rotate_mode: RotateMode,
    deg_start_drag_spin: f32,
    start_drag_mouse: Vector2,
    start_drag_orient: Quaternion,
}

impl ViewPole {
    pub fn new(initial: ViewData, scale: ViewScale, action_button: MouseButton) -> Self {
        Self::with_right_hand_controls(initial, scale, action_button, false)
    }

    pub fn with_right_hand_controls(
        initial: ViewData,
        scale: ViewScale,
        action_button: MouseButton,
        right_keyboard_ctrls: bool,
    ) -> Self {
        Self {
            current: initial,
            initial,
            scale,
            action_button,
            right_keyboard_ctrls,
            dragging: false,
            rotate_mode: RotateMode::DualAxis,
            deg_start_drag_spin: 0.0,
            start_drag_mouse: Vector2::ZERO,
            start_drag_orient: Quaternion::IDENTITY,
        }
    }

    /// Restores the initial view unless a drag is active.
    pub fn reset(&mut self) {
        if !self.dragging {
            self.current = self.initial;
        }
    }

    pub fn set_rotation_scale(&mut self, rotate_scale: f32) {
        self.scale.rotation_scale = rotate_scale;
    }

    pub fn rotation_scale(&self) -> f32 {
        self.scale.rotation_scale
    }

    pub fn view(&self) -> &ViewData {
        &self.current
    }

    pub fn view_mut(&mut self) -> &mut ViewData {
        &mut self.current
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn process_x_change(&mut self, diff_x: i32) {
        let degrees = diff_x as f32 * self.scale.rotation_scale;
        self.current.orient =
            self.start_drag_orient * Quaternion::from_axis_angle_deg(degrees, Vector3::UP);
    }

    fn process_y_change(&mut self, diff_y: i32) {
        let degrees = diff_y as f32 * self.scale.rotation_scale;
        self.current.orient =
            Quaternion::from_axis_angle_deg(degrees, Vector3::RIGHT) * self.start_drag_orient;
    }

    fn process_xy_change(&mut self, diff_x: i32, diff_y: i32) {
        let x_degrees = diff_x as f32 * self.scale.rotation_scale;
        let y_degrees = diff_y as f32 * self.scale.rotation_scale;
        let yawed = self.start_drag_orient * Quaternion::from_axis_angle_deg(x_degrees, Vector3::UP);
        self.current.orient = Quaternion::from_axis_angle_deg(y_degrees, Vector3::RIGHT) * yawed;
    }

    fn process_spin_axis(&mut self, diff_x: i32) {
        let degrees = diff_x as f32 * self.scale.rotation_scale;
        self.current.deg_spin_rotation = degrees + self.deg_start_drag_spin;
    }

    pub fn begin_drag_rotate(&mut self, start: Vector2, mode: RotateMode) {
        self.rotate_mode = mode;
        self.start_drag_mouse = start;
        self.deg_start_drag_spin = self.current.deg_spin_rotation;
        self.start_drag_orient = self.current.orient;
        self.dragging = true;
    }

    pub fn on_drag_rotate(&mut self, position: Vector2) {
        let diff_x = (position.x - self.start_drag_mouse.x) as i32;
        // screen y grows downwards, pitch grows upwards
        let diff_y = -((position.y - self.start_drag_mouse.y) as i32);

        match self.rotate_mode {
            RotateMode::DualAxis => self.process_xy_change(diff_x, diff_y),
            RotateMode::Biaxial => {
                if diff_x.abs() > diff_y.abs() {
                    self.process_x_change(diff_x);
                } else {
                    self.process_y_change(diff_y);
                }
            }
            RotateMode::XzAxis => self.process_x_change(diff_x),
            RotateMode::YAxis => self.process_y_change(diff_y),
            RotateMode::SpinViewAxis => self.process_spin_axis(diff_x),
        }
    }

    pub fn end_drag_rotate(&mut self, end: Vector2, keep_results: bool) {
        if keep_results {
            self.on_drag_rotate(end);
        } else {
            self.current.orient = self.start_drag_orient;
        }
        self.dragging = false;
    }

    pub fn move_closer(&mut self, large_step: bool) {
        let delta = if large_step {
            self.scale.large_radius_delta
        } else {
            self.scale.small_radius_delta
        };
        self.current.radius = (self.current.radius - delta).max(self.scale.min_radius);
    }

    pub fn move_away(&mut self, large_step: bool) {
        let delta = if large_step {
            self.scale.large_radius_delta
        } else {
            self.scale.small_radius_delta
        };
        self.current.radius = (self.current.radius + delta).min(self.scale.max_radius);
    }

    /// Moves the target by `camera_offset`, expressed in camera space.
    pub fn offset_target_pos(&mut self, camera_offset: Vector3) {
        let orientation = self.calc_matrix().to_quaternion();
        self.current.target_pos += orientation.conjugate().rotate(camera_offset);
    }
}

impl ViewProvider for ViewPole {
    fn calc_matrix(&self) -> Matrix4 {
        let spin = Quaternion::from_axis_angle_deg(self.current.deg_spin_rotation, Vector3::BACK);
        let full_rotation = spin * self.current.orient;
        Matrix4::IDENTITY.translate(0.0, 0.0, -self.current.radius)
            * full_rotation.to_matrix()
            * Matrix4::from_translation(-self.current.target_pos)
    }
}

impl Pole for ViewPole {
    fn mouse_move(&mut self, position: Vector2) {
        if self.dragging {
            self.on_drag_rotate(position);
        }
    }

    fn mouse_click(
        &mut self,
        button: MouseButton,
        pressed: bool,
        modifier: Option<MouseModifier>,
        position: Vector2,
    ) {
        if button != self.action_button {
            return;
        }

        if pressed {
            if !self.dragging {
                let mode = match modifier {
                    Some(MouseModifier::Ctrl) => RotateMode::Biaxial,
                    Some(MouseModifier::Alt) => RotateMode::SpinViewAxis,
                    _ => RotateMode::DualAxis,
                };
                self.begin_drag_rotate(position, mode);
            }
        } else if self.dragging
            && matches!(
                self.rotate_mode,
                RotateMode::DualAxis | RotateMode::SpinViewAxis | RotateMode::Biaxial
            )
        {
            self.end_drag_rotate(position, true);
        }
    }

    fn mouse_wheel(&mut self, direction: i32, modifier: Option<MouseModifier>) {
        let large_step = modifier != Some(MouseModifier::Shift);
        if direction > 0 {
            self.move_closer(large_step);
        } else {
            self.move_away(large_step);
        }
    }

    fn char_press(&mut self, dt: Duration, keys: &HeldKeys) {
        let per_second = if keys.is_shift_down() {
            self.scale.small_pos_offset
        } else {
            self.scale.large_pos_offset
        };
        let offset = per_second * 10.0 * dt.as_secs_f32();

        let bindings = if self.right_keyboard_ctrls {
            &RIGHT_HAND_KEYS
        } else {
            &LEFT_HAND_KEYS
        };
        for (key, dir) in bindings.iter() {
            if keys.is_down(*key) {
                self.offset_target_pos(dir.vector() * offset);
            }
        }
    }
}
