use super::*;
use crate::style::render::{StyleVariant, render_style};

fn settled(variant: StyleVariant) -> RasterBuffer {
    let mut base = RasterBuffer::transparent_square(16);
    for y in 2..14 {
        for x in 3..12 {
            if (x + y) % 3 != 0 {
                base.put_pixel(x, y, [40, 40, 40, 255]);
            }
        }
    }
    render_style(&base, 16, 6, variant).unwrap()
}

#[test]
fn full_progress_reproduces_settled_raster() {
    for variant in StyleVariant::ALL {
        let s = settled(variant);
        assert_eq!(build_break_frame(&s, 16, 6, 1.0), s);
    }
}

#[test]
fn zero_progress_is_empty() {
    let s = settled(StyleVariant::SOLID_LIGHT);
    assert!(build_break_frame(&s, 16, 6, 0.0).is_fully_transparent());
}

#[test]
fn midway_frame_is_partial_and_deterministic() {
    let s = settled(StyleVariant::SOLID_DARK);
    let a = build_break_frame(&s, 16, 6, 0.25);
    let b = build_break_frame(&s, 16, 6, 0.25);
    assert_eq!(a, b);

    let drawn = |r: &RasterBuffer| r.data.chunks_exact(4).filter(|p| p[3] != 0).count();
    assert!(drawn(&a) > 0);
    assert!(drawn(&a) < drawn(&s));
}

#[test]
fn progress_is_clamped() {
    let s = settled(StyleVariant::BORDER_LIGHT);
    assert_eq!(build_break_frame(&s, 16, 6, 3.0), s);
    assert!(build_break_frame(&s, 16, 6, -1.0).is_fully_transparent());
}

#[test]
fn break_progress_holds_steps_for_speed_frames() {
    assert_eq!(break_progress(0, 1, 10), 0.0);
    assert_eq!(break_progress(9, 1, 10), 1.0);
    assert_eq!(break_progress(3, 2, 10), 1.0 / 9.0);
    assert_eq!(break_progress(19, 2, 10), 1.0);
    assert_eq!(break_progress(0, 1, 1), 0.0);
    assert_eq!(break_progress(5, 1, 0), 1.0);
}
