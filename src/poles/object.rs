use instant::Duration;

use crate::math::{Matrix4, Quaternion, Vector2, Vector3};

use super::{HeldKeys, MouseButton, MouseModifier, Pole, ViewProvider};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectData {
    pub position: Vector3,
    pub orientation: Quaternion,
}

impl ObjectData {
    pub fn new(position: Vector3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn vector(self) -> Vector3 {
        match self {
            Axis::X => Vector3::RIGHT,
            Axis::Y => Vector3::UP,
            Axis::Z => Vector3::BACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RotateMode {
    DualAxis,
    Biaxial,
    Spin,
}

/// Rotates an object with mouse drags.
///
/// Without modifiers a drag turns the object about Y (horizontal motion) and X
/// (vertical motion). Ctrl restricts the drag to whichever of the two axes the
/// total motion favours. Alt spins about Z. When a view orientation is attached
/// the axes are those of the camera, otherwise of the world.
///
/// The view orientation is a copy taken by [`sync_view`](Self::sync_view), not
/// a live reference. Call it again after every change to the view, for
/// example before forwarding each window event.
#[derive(Debug, Clone)]
pub struct ObjectPole {
    data: ObjectData,
    initial: ObjectData,
    rotate_scale: f32,
    action_button: MouseButton,
    view_orientation: Option<Quaternion>,

    rotate_mode: RotateMode,
    dragging: bool,
    prev_mouse: Vector2,
    start_drag_mouse: Vector2,
    start_drag_orient: Quaternion,
}

impl ObjectPole {
    /// `rotate_scale` is in degrees per pixel.
    pub fn new(initial: ObjectData, rotate_scale: f32, action_button: MouseButton) -> Self {
        Self {
            data: initial,
            initial,
            rotate_scale,
            action_button,
            view_orientation: None,
            rotate_mode: RotateMode::DualAxis,
            dragging: false,
            prev_mouse: Vector2::ZERO,
            start_drag_mouse: Vector2::ZERO,
            start_drag_orient: Quaternion::IDENTITY,
        }
    }

    /// Rotations follow the orientation of `view` from now on. Call again
    /// whenever the view changes.
    pub fn sync_view(&mut self, view: &dyn ViewProvider) {
        self.view_orientation = Some(view.calc_matrix().to_quaternion());
    }

    pub fn detach_view(&mut self) {
        self.view_orientation = None;
    }

    pub fn calc_matrix(&self) -> Matrix4 {
        Matrix4::from_translation(self.data.position) * self.data.orientation.to_matrix()
    }

    pub fn set_rotation_scale(&mut self, rotate_scale: f32) {
        self.rotate_scale = rotate_scale;
    }

    pub fn rotation_scale(&self) -> f32 {
        self.rotate_scale
    }

    pub fn pos_orient(&self) -> &ObjectData {
        &self.data
    }

    pub fn pos_orient_mut(&mut self) -> &mut ObjectData {
        &mut self.data
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Restores the initial position and orientation unless a drag is active.
    pub fn reset(&mut self) {
        if !self.dragging {
            self.data = self.initial;
        }
    }

    fn rotation(axis: Axis, degrees: f32) -> Quaternion {
        Quaternion::from_axis_angle_deg(degrees, axis.vector())
    }

    fn base_orientation(&self, from_initial: bool) -> Quaternion {
        if from_initial && self.dragging {
            self.start_drag_orient
        } else {
            self.data.orientation
        }
    }

    pub fn rotate_world_degrees(&mut self, rot: Quaternion, from_initial: bool) {
        let base = self.base_orientation(from_initial);
        self.data.orientation = (rot * base).normalize();
    }

    pub fn rotate_view_degrees(&mut self, rot: Quaternion, from_initial: bool) {
        match self.view_orientation {
            None => self.rotate_world_degrees(rot, from_initial),
            Some(view) => {
                let base = self.base_orientation(from_initial);
                self.data.orientation = (view.conjugate() * rot * view * base).normalize();
            }
        }
    }
}

impl Pole for ObjectPole {
    fn mouse_move(&mut self, position: Vector2) {
        if !self.dragging {
            return;
        }

        let diff = position - self.prev_mouse;
        match self.rotate_mode {
            RotateMode::DualAxis => {
                let rot = Self::rotation(Axis::Y, diff.x * self.rotate_scale);
                let rot = (Self::rotation(Axis::X, diff.y * self.rotate_scale) * rot).normalize();
                self.rotate_view_degrees(rot, false);
            }
            RotateMode::Biaxial => {
                let init_diff = position - self.start_drag_mouse;
                let (axis, degrees) = if init_diff.x.abs() > init_diff.y.abs() {
                    (Axis::Y, init_diff.x * self.rotate_scale)
                } else {
                    (Axis::X, init_diff.y * self.rotate_scale)
                };
                self.rotate_view_degrees(Self::rotation(axis, degrees), true);
            }
            RotateMode::Spin => {
                let rot = Self::rotation(Axis::Z, -diff.x * self.rotate_scale);
                self.rotate_view_degrees(rot, false);
            }
        }

        self.prev_mouse = position;
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
                self.rotate_mode = match modifier {
                    Some(MouseModifier::Alt) => RotateMode::Spin,
                    Some(MouseModifier::Ctrl) => RotateMode::Biaxial,
                    _ => RotateMode::DualAxis,
                };
                self.prev_mouse = position;
                self.start_drag_mouse = position;
                self.start_drag_orient = self.data.orientation;
                self.dragging = true;
            }
        } else if self.dragging {
            self.mouse_move(position);
            self.dragging = false;
        }
    }

    fn mouse_wheel(&mut self, _direction: i32, _modifier: Option<MouseModifier>) {}

    fn char_press(&mut self, _dt: Duration, _keys: &HeldKeys) {}
}
