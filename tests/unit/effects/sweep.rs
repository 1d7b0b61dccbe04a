use super::*;

/// Square ring with a vertical stroke through columns 7..=8 (24 grid, like the loader icon).
fn ring_with_bar(n: usize) -> GridMask {
    let mut m = GridMask::new(n);
    for y in 0..n {
        for x in 0..n {
            let ring = x < 3 || y < 3 || x >= n - 3 || y >= n - 3;
            let bar = (n / 2..=n / 2 + 1).contains(&x);
            m.set(x, y, ring || bar);
        }
    }
    m
}

fn border_clockwise(n: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for x in 0..n {
        out.push((x, 0));
    }
    for y in 1..n {
        out.push((n - 1, y));
    }
    for x in (0..n - 1).rev() {
        out.push((x, n - 1));
    }
    for y in (1..n - 1).rev() {
        out.push((0, y));
    }
    out
}

#[test]
fn top_left_cell_starts_the_field() {
    let field = AngleField::new(32);
    assert!(field.get(0, 0).abs() < 1e-6, "got {}", field.get(0, 0));
    assert!((field.get(31, 0) - 0.25).abs() < 1e-9);
    assert!((field.get(31, 31) - 0.5).abs() < 1e-9);
    assert!((field.get(0, 31) - 0.75).abs() < 1e-9);
}

#[test]
fn field_is_clockwise_monotone_and_wraps_once() {
    let field = AngleField::new(32);
    let ring = border_clockwise(32);
    let values: Vec<f64> = ring.iter().map(|&(x, y)| field.get(x, y)).collect();
    for w in values.windows(2) {
        assert!(w[0] <= w[1], "{} > {}", w[0], w[1]);
    }
    assert!(values.iter().all(|v| (0.0..1.0).contains(v)));

    let wraps = (0..values.len())
        .filter(|&i| values[(i + 1) % values.len()] < values[i])
        .count();
    assert_eq!(wraps, 1);
}

#[test]
fn clear_then_rebuild_round_trip_restores_mask() {
    let mask = ring_with_bar(32);
    let sweep = AngularSweep::new(mask.clone(), 0.55);

    let cleared = sweep.frame_mask(SweepDirection::Clear, 1.0);
    assert_eq!(cleared.count_on(), 0);

    let rebuilt = sweep.frame_mask(SweepDirection::Rebuild, 1.0);
    for y in 0..32 {
        for x in 0..32 {
            if !sweep.bar().contains(x) {
                assert_eq!(rebuilt.get(x, y), mask.get(x, y), "cell ({x},{y})");
            }
        }
    }
    assert_eq!(rebuilt, mask);
}

#[test]
fn clear_hides_cells_from_the_start_bearing_first() {
    let sweep = AngularSweep::new(ring_with_bar(32), 0.55);
    let early = sweep.frame_mask(SweepDirection::Clear, 0.2);
    assert!(!early.get(0, 0));
    assert!(early.get(31, 31));

    let later = sweep.frame_mask(SweepDirection::Clear, 0.6);
    assert!(later.count_on() < early.count_on());
}

#[test]
fn bar_detection_finds_central_stroke() {
    let sweep = AngularSweep::new(ring_with_bar(32), 0.55);
    assert_eq!(sweep.bar().columns(), &[16, 17]);
}

#[test]
fn bar_detection_falls_back_to_midpoint() {
    let mut m = GridMask::new(10);
    for y in 0..10 {
        for x in 0..10 {
            m.set(x, y, x < 2 || x >= 8);
        }
    }
    assert_eq!(BarColumns::detect(&m), BarColumns::midpoint(10));
    assert_eq!(BarColumns::detect(&GridMask::new(7)).columns(), &[3]);
}

#[test]
fn rebuild_bar_waits_for_delay_then_fills_bottom_up() {
    let sweep = AngularSweep::new(ring_with_bar(32), 0.5);
    let bar_x = sweep.bar().columns()[0];

    assert!(!sweep.is_visible(SweepDirection::Rebuild, bar_x, 31, 0.5));
    assert!(!sweep.is_visible(SweepDirection::Rebuild, bar_x, 16, 0.5));

    // bar progress 0.5 lights rows 31 - floor(0.5 * 31) = 16 and below
    assert!(sweep.is_visible(SweepDirection::Rebuild, bar_x, 31, 0.75));
    assert!(sweep.is_visible(SweepDirection::Rebuild, bar_x, 16, 0.75));
    assert!(!sweep.is_visible(SweepDirection::Rebuild, bar_x, 15, 0.75));

    assert!(sweep.is_visible(SweepDirection::Rebuild, bar_x, 0, 1.0));
}

#[test]
fn rebuild_progress_matches_angle_threshold() {
    let sweep = AngularSweep::new(ring_with_bar(32), 0.55);
    assert!(sweep.is_visible(SweepDirection::Rebuild, 0, 0, 0.01));
    assert!(!sweep.is_visible(SweepDirection::Rebuild, 31, 31, 0.4));
    assert!(sweep.is_visible(SweepDirection::Rebuild, 31, 31, 0.51));
}

#[test]
fn sweep_progress_steps_by_three_cells_and_clamps() {
    assert!((sweep_progress(0, 32) - 3.0 / 32.0).abs() < 1e-12);
    assert!((sweep_progress(4, 32) - 15.0 / 32.0).abs() < 1e-12);
    assert_eq!(sweep_progress(10, 32), 1.0);
    assert_eq!(sweep_progress(100, 32), 1.0);
}

#[test]
fn render_draws_only_visible_cells() {
    let mask = ring_with_bar(8);
    let sweep = AngularSweep::new(mask, 0.55);
    let mut settled = RasterBuffer::transparent_square(16);
    for y in 0..16 {
        for x in 0..16 {
            settled.put_pixel(x, y, [0, 0, 0, 255]);
        }
    }
    let full = sweep.render(&settled, 2, SweepDirection::Rebuild, 1.0);
    assert_eq!(full.pixel(0, 0)[3], 255);
    let empty = sweep.render(&settled, 2, SweepDirection::Clear, 1.0);
    assert!(empty.is_fully_transparent());
}
