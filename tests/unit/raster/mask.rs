use super::*;

fn mask_from_art(rows: &[&str]) -> GridMask {
    let mut m = GridMask::new(rows.len());
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            m.set(x, y, ch == '#');
        }
    }
    m
}

#[test]
fn out_of_bounds_writes_are_noops() {
    let mut m = GridMask::new(4);
    m.set_if_in_bounds(-1, 0, true);
    m.set_if_in_bounds(0, -3, true);
    m.set_if_in_bounds(4, 1, true);
    m.set_if_in_bounds(1, 4, true);
    assert_eq!(m.count_on(), 0);
    assert!(!m.get(10, 10));

    m.set_if_in_bounds(3, 3, true);
    assert!(m.get(3, 3));
}

#[test]
fn row_segments_find_runs_including_trailing_run() {
    let m = mask_from_art(&[
        "##..#.##", "........", "########", "#.#.#.#.", "........", "........", "........",
        "........",
    ]);
    assert_eq!(
        m.row_segments(0).as_slice(),
        &[
            Segment { start: 0, end: 1 },
            Segment { start: 4, end: 4 },
            Segment { start: 6, end: 7 },
        ]
    );
    assert!(m.row_segments(1).is_empty());
    assert_eq!(m.row_segments(2).as_slice(), &[Segment { start: 0, end: 7 }]);
    assert_eq!(m.row_segments(3).len(), 4);
}

#[test]
fn center_segment_takes_middle_run_of_first_three_run_row() {
    let m = mask_from_art(&["######", "#.##.#", "#....#", "######", "......", "......"]);
    assert_eq!(m.center_segment(), Some(Segment { start: 2, end: 3 }));

    let plain = mask_from_art(&["##", "##"]);
    assert_eq!(plain.center_segment(), None);
}

#[test]
fn differs_within_ignores_cells_outside_visibility() {
    let visibility = mask_from_art(&["##.", "...", "..."]);
    let a = mask_from_art(&["#..", "...", "..#"]);
    let b = mask_from_art(&["#.#", "#..", "..."]);
    assert!(!a.differs_within(&b, &visibility));

    let c = mask_from_art(&["##.", "...", "..."]);
    assert!(a.differs_within(&c, &visibility));
}

#[test]
fn bit_rows_read_most_significant_first() {
    let m = GridMask::from_bit_rows(&[0b1001, 0b0110, 0, 0b1111], 4);
    assert!(m.get(0, 0) && !m.get(1, 0) && m.get(3, 0));
    assert!(m.get(1, 1) && m.get(2, 1));
    assert_eq!(m.count_on(), 8);
}

#[test]
fn from_alpha_marks_any_nonzero_alpha() {
    let mut r = RasterBuffer::transparent_square(3);
    r.put_pixel(0, 0, [0, 0, 0, 1]);
    r.put_pixel(2, 1, [255, 255, 255, 255]);
    let m = GridMask::from_alpha(&r).unwrap();
    assert_eq!(m.size(), 3);
    assert!(m.get(0, 0));
    assert!(m.get(2, 1));
    assert_eq!(m.count_on(), 2);

    assert!(GridMask::from_alpha(&RasterBuffer::transparent(3, 2)).is_err());
}

#[test]
fn from_alpha_at_least_applies_the_threshold() {
    let mut r = RasterBuffer::transparent_square(2);
    r.put_pixel(0, 0, [0, 0, 0, 127]);
    r.put_pixel(1, 1, [0, 0, 0, 128]);
    let m = GridMask::from_alpha_at_least(&r, 128).unwrap();
    assert!(!m.get(0, 0));
    assert!(m.get(1, 1));
}
