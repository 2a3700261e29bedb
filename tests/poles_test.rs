use demo_kit::{
    KeyCode, Duration, WindowEvent,
    math::{Quaternion, Vector2, Vector3},
    poles::{
        HeldKeys, InvalidButton, MouseButton, MouseModifier, ObjectData, ObjectPole, Pole,
        PoleInput, ViewData, ViewPole, ViewProvider, ViewScale,
    },
};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceId, ElementState, MouseScrollDelta, TouchPhase},
    keyboard::ModifiersState,
};

fn assert_close(actual: Vector3, expected: Vector3) {
    let close = (actual.x - expected.x).abs() < 1e-4
        && (actual.y - expected.y).abs() < 1e-4
        && (actual.z - expected.z).abs() < 1e-4;
    assert!(close, "{:?} != {:?}", actual, expected);
}

fn view_pole(target: Vector3) -> ViewPole {
    ViewPole::new(
        ViewData::new(target, Quaternion::IDENTITY, 5.0, 0.0),
        ViewScale {
            min_radius: 1.0,
            max_radius: 10.0,
            large_radius_delta: 2.0,
            small_radius_delta: 0.5,
            large_pos_offset: 1.0,
            small_pos_offset: 0.1,
            rotation_scale: 0.5,
        },
        MouseButton::Left,
    )
}

#[test]
fn should_map_button_indices() {
    assert_eq!(MouseButton::from_index(0), Ok(Some(MouseButton::Left)));
    assert_eq!(MouseButton::from_index(1), Ok(Some(MouseButton::Right)));
    assert_eq!(MouseButton::from_index(2), Ok(Some(MouseButton::Middle)));
    assert_eq!(MouseButton::from_index(-1), Ok(None));
    assert_eq!(MouseButton::from_index(7), Err(InvalidButton(7)));
}

#[test]
fn view_matrix_looks_at_target_from_radius() {
    let pole = view_pole(Vector3::new(1.0, 2.0, 3.0));
    let target_in_view = pole.calc_matrix().transform(Vector3::new(1.0, 2.0, 3.0), 1.0);
    assert_close(target_in_view, Vector3::new(0.0, 0.0, -5.0));
}

#[test]
fn wheel_zooms_within_limits() {
    let mut pole = view_pole(Vector3::ZERO);
    pole.mouse_wheel(1, None);
    assert_eq!(pole.view().radius, 3.0);
    pole.mouse_wheel(1, None);
    pole.mouse_wheel(1, None);
    assert_eq!(pole.view().radius, 1.0);

    pole.mouse_wheel(-1, Some(MouseModifier::Shift));
    assert_eq!(pole.view().radius, 1.5);
    for _ in 0..10 {
        pole.mouse_wheel(-1, None);
    }
    assert_eq!(pole.view().radius, 10.0);
}

#[test]
fn cancelled_drag_restores_orientation() {
    let mut pole = view_pole(Vector3::ZERO);

    pole.mouse_click(MouseButton::Right, true, None, Vector2::new(10.0, 10.0));
    assert!(!pole.is_dragging());

    pole.mouse_click(MouseButton::Left, true, None, Vector2::new(10.0, 10.0));
    assert!(pole.is_dragging());
    pole.mouse_move(Vector2::new(30.0, 10.0));
    assert_ne!(pole.view().orient, Quaternion::IDENTITY);

    // reset is ignored mid drag
    pole.reset();
    assert_ne!(pole.view().orient, Quaternion::IDENTITY);

    pole.end_drag_rotate(Vector2::new(30.0, 10.0), false);
    assert!(!pole.is_dragging());
    assert_eq!(pole.view().orient, Quaternion::IDENTITY);
}

#[test]
fn held_keys_move_the_target() {
    let mut pole = view_pole(Vector3::ZERO);
    let mut keys = HeldKeys::new();
    keys.press(KeyCode::KeyW);

    pole.char_press(Duration::from_secs(1), &keys);
    assert_close(pole.view().target_pos, Vector3::new(0.0, 0.0, -10.0));

    keys.press(KeyCode::ShiftLeft);
    keys.release(KeyCode::KeyW);
    keys.press(KeyCode::KeyD);
    pole.char_press(Duration::from_secs(1), &keys);
    assert_close(pole.view().target_pos, Vector3::new(1.0, 0.0, -10.0));

    pole.reset();
    assert_eq!(pole.view().target_pos, Vector3::ZERO);
}

#[test]
fn object_pole_rotates_and_resets() {
    let initial = ObjectData::new(Vector3::new(0.0, 1.0, 0.0), Quaternion::IDENTITY);
    let mut pole = ObjectPole::new(initial, 1.0, MouseButton::Left);

    pole.rotate_world_degrees(Quaternion::from_axis_angle_deg(90.0, Vector3::UP), false);
    let x_axis = pole.calc_matrix().transform(Vector3::new(1.0, 0.0, 0.0), 0.0);
    assert_close(x_axis, Vector3::new(0.0, 0.0, -1.0));

    pole.reset();
    assert_eq!(*pole.pos_orient(), initial);
}

fn assert_quat(actual: Quaternion, expected: Quaternion) {
    let close = (actual.x - expected.x).abs() < 1e-5
        && (actual.y - expected.y).abs() < 1e-5
        && (actual.z - expected.z).abs() < 1e-5
        && (actual.w - expected.w).abs() < 1e-5;
    assert!(close, "{} != {}", actual, expected);
}

fn about(axis: Vector3, degrees: f32) -> Quaternion {
    Quaternion::from_axis_angle_deg(degrees, axis)
}

fn object_pole() -> ObjectPole {
    ObjectPole::new(
        ObjectData::new(Vector3::ZERO, Quaternion::IDENTITY),
        1.0,
        MouseButton::Left,
    )
}

#[test]
fn object_drag_rotates_incrementally_about_both_axes() {
    let mut pole = object_pole();
    pole.mouse_move(Vector2::new(50.0, 50.0));
    assert_eq!(pole.pos_orient().orientation, Quaternion::IDENTITY);

    pole.mouse_click(MouseButton::Left, true, None, Vector2::new(10.0, 10.0));
    pole.mouse_move(Vector2::new(20.0, 15.0));
    assert_quat(
        pole.pos_orient().orientation,
        about(Vector3::RIGHT, 5.0) * about(Vector3::UP, 10.0),
    );

    // only the motion since the last event is applied
    pole.mouse_move(Vector2::new(20.0, 25.0));
    assert_quat(
        pole.pos_orient().orientation,
        about(Vector3::RIGHT, 15.0) * about(Vector3::UP, 10.0),
    );
}

#[test]
fn object_ctrl_drag_picks_one_axis_from_the_total_motion() {
    let mut pole = object_pole();
    let start = about(Vector3::UP, 30.0);
    pole.pos_orient_mut().orientation = start;

    pole.mouse_click(MouseButton::Left, true, Some(MouseModifier::Ctrl), Vector2::ZERO);
    pole.mouse_move(Vector2::new(10.0, 4.0));
    assert_quat(pole.pos_orient().orientation, about(Vector3::UP, 40.0));

    // the vertical motion now dominates and replaces the earlier yaw
    pole.mouse_move(Vector2::new(10.0, 30.0));
    assert_quat(pole.pos_orient().orientation, about(Vector3::RIGHT, 30.0) * start);
}

#[test]
fn object_alt_drag_spins_about_z() {
    let mut pole = object_pole();
    pole.mouse_click(MouseButton::Left, true, Some(MouseModifier::Alt), Vector2::ZERO);
    pole.mouse_move(Vector2::new(20.0, 7.0));
    assert_quat(pole.pos_orient().orientation, about(Vector3::BACK, -20.0));
}

#[test]
fn object_release_applies_the_last_motion() {
    let mut pole = object_pole();
    pole.mouse_click(MouseButton::Right, true, None, Vector2::ZERO);
    assert!(!pole.is_dragging());

    pole.mouse_click(MouseButton::Left, true, None, Vector2::ZERO);
    pole.mouse_move(Vector2::new(10.0, 0.0));
    pole.mouse_click(MouseButton::Left, false, None, Vector2::new(30.0, 0.0));
    assert!(!pole.is_dragging());
    assert_quat(pole.pos_orient().orientation, about(Vector3::UP, 30.0));

    pole.mouse_move(Vector2::new(90.0, 0.0));
    assert_quat(pole.pos_orient().orientation, about(Vector3::UP, 30.0));
}

#[test]
fn object_rotates_in_view_space_after_sync() {
    let mut view = view_pole(Vector3::ZERO);
    view.view_mut().orient = about(Vector3::UP, 90.0);
    let mut pole = object_pole();
    pole.sync_view(&view);

    // pitching in front of a camera turned by 90 degrees rolls about world Z
    pole.mouse_click(MouseButton::Left, true, None, Vector2::ZERO);
    pole.mouse_move(Vector2::new(0.0, 10.0));
    pole.mouse_click(MouseButton::Left, false, None, Vector2::new(0.0, 10.0));
    assert_quat(pole.pos_orient().orientation, about(Vector3::BACK, 10.0));

    // the synced orientation is a copy until synced again
    view.view_mut().orient = Quaternion::IDENTITY;
    pole.pos_orient_mut().orientation = Quaternion::IDENTITY;
    pole.mouse_click(MouseButton::Left, true, None, Vector2::ZERO);
    pole.mouse_move(Vector2::new(0.0, 10.0));
    assert_quat(pole.pos_orient().orientation, about(Vector3::BACK, 10.0));
    pole.mouse_click(MouseButton::Left, false, None, Vector2::new(0.0, 10.0));

    pole.sync_view(&view);
    pole.pos_orient_mut().orientation = Quaternion::IDENTITY;
    pole.mouse_click(MouseButton::Left, true, None, Vector2::ZERO);
    pole.mouse_move(Vector2::new(0.0, 10.0));
    assert_quat(pole.pos_orient().orientation, about(Vector3::RIGHT, 10.0));
    pole.mouse_click(MouseButton::Left, false, None, Vector2::new(0.0, 10.0));

    pole.detach_view();
    pole.pos_orient_mut().orientation = Quaternion::IDENTITY;
    pole.rotate_view_degrees(about(Vector3::RIGHT, 10.0), false);
    assert_quat(pole.pos_orient().orientation, about(Vector3::RIGHT, 10.0));
}

#[test]
fn view_ctrl_drag_rotates_about_one_axis() {
    let mut pole = view_pole(Vector3::ZERO);
    pole.mouse_click(MouseButton::Left, true, Some(MouseModifier::Ctrl), Vector2::ZERO);

    pole.mouse_move(Vector2::new(10.0, 4.0));
    assert_quat(pole.view().orient, about(Vector3::UP, 5.0));

    // dragging down pitches by the inverted screen y
    pole.mouse_move(Vector2::new(2.0, 20.0));
    assert_quat(pole.view().orient, about(Vector3::RIGHT, -10.0));

    pole.mouse_click(MouseButton::Left, false, None, Vector2::new(2.0, 20.0));
    assert!(!pole.is_dragging());
    assert_quat(pole.view().orient, about(Vector3::RIGHT, -10.0));
}

#[test]
fn view_alt_drag_spins_the_view_axis() {
    let mut pole = view_pole(Vector3::ZERO);
    pole.view_mut().deg_spin_rotation = 5.0;
    pole.mouse_click(MouseButton::Left, true, Some(MouseModifier::Alt), Vector2::ZERO);
    pole.mouse_move(Vector2::new(30.0, 5.0));

    assert_eq!(pole.view().deg_spin_rotation, 20.0);
    assert_eq!(pole.view().orient, Quaternion::IDENTITY);

    pole.mouse_click(MouseButton::Left, false, None, Vector2::new(40.0, 5.0));
    assert_eq!(pole.view().deg_spin_rotation, 25.0);
}

fn send(input: &mut PoleInput, event: WindowEvent, view: &mut ViewPole, object: &mut ObjectPole) {
    input.handle_window_event(&event, &mut [view as &mut dyn Pole, object as &mut dyn Pole]);
}

fn cursor(x: f64, y: f64) -> WindowEvent {
    WindowEvent::CursorMoved {
        device_id: unsafe { DeviceId::dummy() },
        position: PhysicalPosition::new(x, y),
    }
}

fn left_button(state: ElementState) -> WindowEvent {
    WindowEvent::MouseInput {
        device_id: unsafe { DeviceId::dummy() },
        state,
        button: winit::event::MouseButton::Left,
    }
}

fn wheel(delta: MouseScrollDelta) -> WindowEvent {
    WindowEvent::MouseWheel {
        device_id: unsafe { DeviceId::dummy() },
        delta,
        phase: TouchPhase::Moved,
    }
}

#[test]
fn pole_input_forwards_window_events() {
    let mut input = PoleInput::new();
    let mut view = view_pole(Vector3::ZERO);
    let mut object = object_pole();

    send(&mut input, WindowEvent::ModifiersChanged(ModifiersState::ALT.into()), &mut view, &mut object);
    assert_eq!(input.modifier(), Some(MouseModifier::Alt));

    send(&mut input, cursor(10.0, 10.0), &mut view, &mut object);
    assert_eq!(input.cursor(), Vector2::new(10.0, 10.0));
    send(&mut input, left_button(ElementState::Pressed), &mut view, &mut object);
    assert!(view.is_dragging());
    assert!(object.is_dragging());

    send(&mut input, cursor(30.0, 10.0), &mut view, &mut object);
    assert_eq!(view.view().deg_spin_rotation, 10.0);
    assert_quat(object.pos_orient().orientation, about(Vector3::BACK, -20.0));

    send(&mut input, WindowEvent::ModifiersChanged(ModifiersState::empty().into()), &mut view, &mut object);
    assert_eq!(input.modifier(), None);
    send(&mut input, left_button(ElementState::Released), &mut view, &mut object);
    assert!(!view.is_dragging());
    assert!(!object.is_dragging());

    send(&mut input, wheel(MouseScrollDelta::LineDelta(0.0, 1.0)), &mut view, &mut object);
    assert_eq!(view.view().radius, 3.0);
    send(
        &mut input,
        wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -12.0))),
        &mut view,
        &mut object,
    );
    assert_eq!(view.view().radius, 5.0);
    send(&mut input, wheel(MouseScrollDelta::LineDelta(0.0, 0.0)), &mut view, &mut object);
    assert_eq!(view.view().radius, 5.0);
}
