//! Mouse driven camera and object controllers.
//!
//! A *pole* turns mouse drags, wheel steps and held keys into a transform:
//!
//! - [`ViewPole`] orbits a camera around a target point and produces a view matrix.
//! - [`ObjectPole`] rotates an object in place, optionally relative to a view.
//!
//! [`PoleInput`] translates winit window events into the [`Pole`] calls so that
//! a demo only needs to forward its events:
//!
//! ```ignore
//! fn window_event(&mut self, _ctx: &mut Context, event: &WindowEvent) {
//!     self.object_pole.sync_view(&self.view_pole);
//!     self.input.handle_window_event(event, &mut [&mut self.view_pole, &mut self.object_pole]);
//! }
//! ```

use std::collections::HashSet;

use instant::Duration;
use winit::{
    event::{ElementState, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
};

use crate::math::{Matrix4, Vector2};

mod object;
mod view;

pub use object::{ObjectData, ObjectPole};
pub use view::{RotateMode as ViewRotateMode, ViewData, ViewPole, ViewScale};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid button: {0}")]
pub struct InvalidButton(pub i32);

impl MouseButton {
    /// Maps the classic button numbering: 0 left, 1 right, 2 middle and -1 for
    /// "no button".
    pub fn from_index(index: i32) -> Result<Option<Self>, InvalidButton> {
        match index {
            0 => Ok(Some(MouseButton::Left)),
            1 => Ok(Some(MouseButton::Right)),
            2 => Ok(Some(MouseButton::Middle)),
            -1 => Ok(None),
            other => Err(InvalidButton(other)),
        }
    }

    pub fn from_winit(button: winit::event::MouseButton) -> Option<Self> {
        match button {
            winit::event::MouseButton::Left => Some(MouseButton::Left),
            winit::event::MouseButton::Right => Some(MouseButton::Right),
            winit::event::MouseButton::Middle => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

/// The single modifier a pole reacts to while a button is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseModifier {
    Shift,
    Ctrl,
    Alt,
}

impl MouseModifier {
    /// Alt wins over Ctrl, Ctrl wins over Shift.
    pub fn from_winit(state: ModifiersState) -> Option<Self> {
        if state.alt_key() {
            Some(MouseModifier::Alt)
        } else if state.control_key() {
            Some(MouseModifier::Ctrl)
        } else if state.shift_key() {
            Some(MouseModifier::Shift)
        } else {
            None
        }
    }
}

/// Physical keys currently held down.
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    keys: HashSet<KeyCode>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn is_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_shift_down(&self) -> bool {
        self.is_down(KeyCode::ShiftLeft) || self.is_down(KeyCode::ShiftRight)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// Mouse positions are window coordinates in pixels with y pointing down.
pub trait Pole {
    fn mouse_move(&mut self, position: Vector2);

    fn mouse_click(
        &mut self,
        button: MouseButton,
        pressed: bool,
        modifier: Option<MouseModifier>,
        position: Vector2,
    );

    fn mouse_wheel(&mut self, direction: i32, modifier: Option<MouseModifier>);

    /// Called once per frame with the keys held during that frame.
    fn char_press(&mut self, dt: Duration, keys: &HeldKeys);
}

pub trait ViewProvider: Pole {
    fn calc_matrix(&self) -> Matrix4;
}

/// Tracks cursor, modifier and key state from winit events and forwards them
/// to poles.
#[derive(Debug, Default)]
pub struct PoleInput {
    cursor: Vector2,
    modifiers: ModifiersState,
    keys: HeldKeys,
}

impl PoleInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Vector2 {
        self.cursor
    }

    pub fn keys(&self) -> &HeldKeys {
        &self.keys
    }

    pub fn modifier(&self) -> Option<MouseModifier> {
        MouseModifier::from_winit(self.modifiers)
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent, poles: &mut [&mut dyn Pole]) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vector2::new(position.x as f32, position.y as f32);
                for pole in poles.iter_mut() {
                    pole.mouse_move(self.cursor);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = MouseButton::from_winit(*button) {
                    let modifier = self.modifier();
                    for pole in poles.iter_mut() {
                        pole.mouse_click(button, state.is_pressed(), modifier, self.cursor);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y as f64,
                    MouseScrollDelta::PixelDelta(position) => position.y,
                };
                if amount != 0.0 {
                    let direction = if amount > 0.0 { 1 } else { -1 };
                    let modifier = self.modifier();
                    for pole in poles.iter_mut() {
                        pole.mouse_wheel(direction, modifier);
                    }
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.keys.press(code),
                        ElementState::Released => self.keys.release(code),
                    }
                }
            }
            WindowEvent::Focused(false) => self.keys.clear(),
            _ => {}
        }
    }

    /// Feeds the held keys to every pole; call once per frame.
    pub fn update(&self, dt: Duration, poles: &mut [&mut dyn Pole]) {
        for pole in poles.iter_mut() {
            pole.char_press(dt, &self.keys);
        }
    }
}
