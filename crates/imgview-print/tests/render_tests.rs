use image::{Rgba, RgbaImage};
use imgview_print::render::{PixelRect, target_pixel_rect};
use imgview_print::*;

const RED: Rgba<u8> = Rgba([220, 20, 20, 255]);
const GREEN: Rgba<u8> = Rgba([20, 200, 40, 255]);
const BLUE: Rgba<u8> = Rgba([30, 40, 210, 255]);
const YELLOW: Rgba<u8> = Rgba([240, 230, 10, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 40 x 20 image: red | green over blue | yellow
fn quadrant_image() -> RgbaImage {
    RgbaImage::from_fn(40, 20, |x, y| match (x < 20, y < 10) {
        (true, true) => RED,
        (false, true) => GREEN,
        (true, false) => BLUE,
        (false, false) => YELLOW,
    })
}

fn placement_for(transform: &TransformState, image: &RgbaImage) -> PagePlacement {
    PageLayoutEngine::default()
        .compute_placement(
            &PageGeometry::default(),
            transform,
            PixelSize::new(image.width(), image.height()),
            Resolution::new(1.0, ResolutionUnit::PixelsPerMillimeter).unwrap(),
            PlacementOptions::default(),
        )
        .unwrap()
}

fn orientations() -> Vec<TransformState> {
    let mut states = Vec::new();
    for turns in 0..4 {
        for (flip_h, flip_v) in [(false, false), (true, false), (false, true), (true, true)] {
            let mut state = TransformState::default();
            for _ in 0..turns {
                state.rotate_clockwise();
            }
            if flip_h {
                state.flip_horizontal();
            }
            if flip_v {
                state.flip_vertical();
            }
            states.push(state);
        }
    }
    states
}

fn with_legacy(effects: PrintEffects, legacy_rendering: bool) -> PrintEffects {
    PrintEffects {
        legacy_rendering,
        ..effects
    }
}

fn quadrant_centers(target: PixelRect) -> [(u32, u32); 4] {
    let x0 = target.x as u32;
    let y0 = target.y as u32;
    let (w, h) = (target.width, target.height);
    [
        (x0 + w / 4, y0 + h / 4),
        (x0 + 3 * w / 4, y0 + h / 4),
        (x0 + w / 4, y0 + 3 * h / 4),
        (x0 + 3 * w / 4, y0 + 3 * h / 4),
    ]
}

#[test]
fn test_compositors_agree_on_rect_and_quadrants() {
    let image = quadrant_image();
    for transform in orientations() {
        let placement = placement_for(&transform, &image);
        let effects = PrintEffects::default();

        let direct = render_preview(&image, &placement, &with_legacy(effects, false), 4.0).unwrap();
        let legacy = render_preview(&image, &placement, &with_legacy(effects, true), 4.0).unwrap();

        assert_eq!(direct.target, legacy.target);
        assert_eq!(direct.target, target_pixel_rect(&placement, 4.0).unwrap());
        assert_eq!(direct.width(), legacy.width());
        assert_eq!(direct.height(), legacy.height());

        let target = direct.target.unwrap();
        for (x, y) in quadrant_centers(target) {
            assert_eq!(
                direct.image.get_pixel(x, y),
                legacy.image.get_pixel(x, y),
                "pixel ({}, {}) with {:?}",
                x,
                y,
                transform.orientation()
            );
        }
        // Paper outside the image stays white
        assert_eq!(*direct.image.get_pixel(0, 0), WHITE);
        assert_eq!(*legacy.image.get_pixel(0, 0), WHITE);
    }
}

#[test]
fn test_uniform_image_renders_identically() {
    let image = RgbaImage::from_pixel(30, 50, Rgba([90, 140, 200, 255]));
    let effects = PrintEffects {
        brightness: 10.0,
        contrast: -20.0,
        exposure: 15.0,
        grayscale: false,
        legacy_rendering: false,
    };
    for transform in orientations() {
        let placement = placement_for(&transform, &image);
        let direct = render_preview(&image, &placement, &with_legacy(effects, false), 3.0).unwrap();
        let legacy = render_preview(&image, &placement, &with_legacy(effects, true), 3.0).unwrap();
        assert_eq!(direct.image, legacy.image);
    }
}

#[test]
fn test_overflowing_placement_clipped_to_canvas() {
    let image = quadrant_image();
    // 500 x 250 mm at 0.08 px/mm, larger than the landscape page both ways
    let placement = PageLayoutEngine::default()
        .compute_placement(
            &PageGeometry::default(),
            &TransformState::default(),
            PixelSize::new(image.width(), image.height()),
            Resolution::new(0.08, ResolutionUnit::PixelsPerMillimeter).unwrap(),
            PlacementOptions {
                ignore_paper_bounds: true,
                ..Default::default()
            },
        )
        .unwrap();
    let target = target_pixel_rect(&placement, 2.0).unwrap().unwrap();
    assert!(target.x < 0 && target.y < 0);

    let effects = PrintEffects::default();
    let direct = render_preview(&image, &placement, &with_legacy(effects, false), 2.0).unwrap();
    let legacy = render_preview(&image, &placement, &with_legacy(effects, true), 2.0).unwrap();
    assert_eq!((legacy.width(), legacy.height()), (594, 420));
    assert_eq!(direct.image, legacy.image);
    // The page shows the middle of the image, where all four quadrants meet
    assert_eq!(*legacy.image.get_pixel(0, 0), RED);
    assert_eq!(*legacy.image.get_pixel(593, 0), GREEN);
    assert_eq!(*legacy.image.get_pixel(0, 419), BLUE);
    assert_eq!(*legacy.image.get_pixel(593, 419), YELLOW);
}

#[test]
fn test_rotation_moves_quadrants() {
    let image = quadrant_image();
    let mut transform = TransformState::default();
    transform.rotate_clockwise();
    let placement = placement_for(&transform, &image);
    assert_eq!(placement.oriented_image_size(), PixelSize::new(20, 40));

    let preview = render_preview(&image, &placement, &PrintEffects::default(), 4.0).unwrap();
    let [top_left, top_right, bottom_left, bottom_right] =
        quadrant_centers(preview.target.unwrap());
    // A clockwise turn brings the bottom-left corner to the top-left
    assert_eq!(*preview.image.get_pixel(top_left.0, top_left.1), BLUE);
    assert_eq!(*preview.image.get_pixel(top_right.0, top_right.1), RED);
    assert_eq!(*preview.image.get_pixel(bottom_left.0, bottom_left.1), YELLOW);
    assert_eq!(*preview.image.get_pixel(bottom_right.0, bottom_right.1), GREEN);
}

#[test]
fn test_flip_mirrors_quadrants() {
    let image = quadrant_image();
    let mut transform = TransformState::default();
    transform.flip_horizontal();
    let placement = placement_for(&transform, &image);
    let preview = render_preview(&image, &placement, &PrintEffects::default(), 4.0).unwrap();
    let [top_left, _, _, bottom_right] = quadrant_centers(preview.target.unwrap());
    assert_eq!(*preview.image.get_pixel(top_left.0, top_left.1), GREEN);
    assert_eq!(*preview.image.get_pixel(bottom_right.0, bottom_right.1), BLUE);
}

#[test]
fn test_preview_canvas_covers_oriented_page() {
    let image = quadrant_image();
    let placement = placement_for(&TransformState::default(), &image);
    // Wide image: AutoRotate turns the A4 page to landscape
    assert_eq!(placement.orientation, Orientation::Landscape);
    let preview = render_preview(&image, &placement, &PrintEffects::default(), 2.0).unwrap();
    assert_eq!((preview.width(), preview.height()), (594, 420));
}

#[test]
fn test_grayscale_preview_has_no_color() {
    let image = quadrant_image();
    let placement = placement_for(&TransformState::default(), &image);
    let effects = PrintEffects {
        grayscale: true,
        ..Default::default()
    };
    for legacy in [false, true] {
        let preview = render_preview(&image, &placement, &with_legacy(effects, legacy), 2.0).unwrap();
        assert!(preview.image.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
    }
}

#[test]
fn test_invalid_effects_rejected_before_rendering() {
    let image = quadrant_image();
    let placement = placement_for(&TransformState::default(), &image);
    let effects = PrintEffects {
        brightness: 101.0,
        ..Default::default()
    };
    assert!(matches!(
        render_preview(&image, &placement, &effects, 2.0),
        Err(PrintError::Validation(_))
    ));
}
