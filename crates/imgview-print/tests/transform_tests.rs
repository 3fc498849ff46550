use imgview_print::*;

#[test]
fn test_four_quarter_turns_restore_rotation() {
    let mut state = TransformState::default();
    let start = state.rotation();
    for _ in 0..4 {
        state.rotate_clockwise();
    }
    assert_eq!(state.rotation(), start);
    for _ in 0..4 {
        state.rotate_counterclockwise();
    }
    assert_eq!(state.rotation(), start);
}

#[test]
fn test_double_flip_is_noop() {
    let mut state = TransformState::default();
    let before = state.orientation();
    state.flip_horizontal();
    state.flip_horizontal();
    state.flip_vertical();
    state.flip_vertical();
    assert_eq!(state.orientation(), before);
}

#[test]
fn test_every_mutation_bumps_revision() {
    let mut state = TransformState::default();
    let mut last = state.revision();
    let mutations: Vec<fn(&mut TransformState)> = vec![
        TransformState::zoom_in,
        TransformState::zoom_out,
        TransformState::reset_zoom,
        TransformState::rotate_clockwise,
        TransformState::rotate_counterclockwise,
        TransformState::flip_horizontal,
        TransformState::flip_vertical,
    ];
    for mutate in mutations {
        mutate(&mut state);
        assert!(state.revision() > last);
        last = state.revision();
    }
}

#[test]
fn test_fit_to_window_then_manual_zoom() {
    let mut state = TransformState::default();
    let zoom = state
        .fit_to_window(Size::new(800.0, 600.0), PixelSize::new(1600, 900))
        .unwrap();
    assert_eq!(zoom, 0.5);
    assert_eq!(state.fit_mode(), FitMode::FitWindow);
    assert_eq!(state.zoom_mode(), ZoomMode::FitToWindow);

    state.set_zoom(2.0).unwrap();
    assert_eq!(state.fit_mode(), FitMode::Manual);
    assert_eq!(state.zoom_mode(), ZoomMode::Custom);

    state.reset_zoom();
    assert_eq!(state.zoom(), 1.0);
    assert_eq!(state.zoom_mode(), ZoomMode::Identity);
}

#[test]
fn test_set_zoom_rejects_bad_factors() {
    let mut state = TransformState::new(ZoomLimits::new(0.1, 10.0).unwrap());
    state.set_zoom(2.0).unwrap();
    let revision = state.revision();

    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, 0.05, 11.0] {
        assert!(matches!(state.set_zoom(bad), Err(PrintError::Validation(_))));
    }
    assert_eq!(state.zoom(), 2.0);
    assert_eq!(state.revision(), revision);
}

#[test]
fn test_zoom_steps_are_clamped() {
    let mut state = TransformState::new(ZoomLimits::new(0.5, 2.0).unwrap());
    for _ in 0..10 {
        state.zoom_in();
    }
    assert_eq!(state.zoom(), 2.0);
    for _ in 0..10 {
        state.zoom_out();
    }
    assert_eq!(state.zoom(), 0.5);
}

#[test]
fn test_resize_only_refits_in_fit_mode() {
    let image = PixelSize::new(1600, 900);
    let mut state = TransformState::default();
    assert!(!state.viewport_resized(Size::new(400.0, 300.0), image).unwrap());
    assert_eq!(state.zoom(), 1.0);

    state.fit_to_window(Size::new(800.0, 600.0), image).unwrap();
    assert!(state.viewport_resized(Size::new(400.0, 300.0), image).unwrap());
    assert_eq!(state.zoom(), 0.25);
}

#[test]
fn test_rotation_swaps_oriented_size_and_fit() {
    let mut state = TransformState::default();
    state.rotate_clockwise();
    assert_eq!(
        state.oriented_size(Size::new(1600.0, 900.0)),
        Size::new(900.0, 1600.0)
    );
    let zoom = state
        .fit_to_window(Size::new(800.0, 600.0), PixelSize::new(1600, 900))
        .unwrap();
    assert_eq!(zoom, 0.375);
}

#[test]
fn test_point_mapping_round_trips() {
    let image = Size::new(40.0, 20.0);
    let mut state = TransformState::default();
    state.flip_horizontal();
    state.rotate_clockwise();

    // Top-left pixel center: flipped to the right edge, then turned to the bottom
    let p = state.image_to_oriented(Point::new(0.5, 0.5), image);
    assert_eq!(p, Point::new(19.5, 39.5));

    for rotation in [0, 90, 180, 270] {
        state.set_rotation(Rotation::from_degrees(rotation).unwrap());
        let q = Point::new(3.25, 17.0);
        let back = state.oriented_to_image(state.image_to_oriented(q, image), image);
        assert!((back.x - q.x).abs() < 1e-12 && (back.y - q.y).abs() < 1e-12);
    }
}

#[test]
fn test_fitted_zoom_is_not_persisted() {
    let mut state = TransformState::default();
    state.rotate_counterclockwise();
    state
        .fit_to_window(Size::new(800.0, 600.0), PixelSize::new(1600, 900))
        .unwrap();

    let persisted = state.to_persisted();
    assert_eq!(persisted.zoom, None);
    assert_eq!(persisted.fit_mode, FitMode::FitWindow);

    let restored = TransformState::from_persisted(&persisted, ZoomLimits::default()).unwrap();
    assert_eq!(restored.rotation(), Rotation::Clockwise270);
    assert_eq!(restored.fit_mode(), FitMode::FitWindow);

    state.set_zoom(3.0).unwrap();
    assert_eq!(state.to_persisted().zoom, Some(3.0));
}

#[test]
fn test_new_image_resets_unless_remembered() {
    let mut state = TransformState::default();
    state.rotate_clockwise();
    state.zoom_in();
    state.reset_for_new_image(true);
    assert_eq!(state.rotation(), Rotation::Clockwise90);

    state.reset_for_new_image(false);
    assert_eq!(state.rotation(), Rotation::None);
    assert_eq!(state.zoom(), 1.0);
}
