use super::*;

#[test]
fn defaults_match_the_reference_build() {
    let cfg = LoaderConfig::default();
    assert_eq!(cfg.grid_size, 32);
    assert_eq!(cfg.cell_size, 8);
    assert_eq!(cfg.frame_count, 16);
    assert_eq!(cfg.frame_ms, 40);
    assert_eq!(cfg.palette, Some(32));
    assert_eq!(cfg.transition_frames, 10);
    assert_eq!(cfg.clear_frames, 8);
    assert_eq!(cfg.rebuild_frames, 12);
    assert_eq!(cfg.bar_reveal_delay, 0.55);
    assert_eq!(cfg.output_size().unwrap(), 256);
}

#[test]
fn normalized_clamps_instead_of_failing() {
    let cfg = LoaderConfig {
        grid_size: 0,
        cell_size: 0,
        frame_count: 0,
        transition_frames: 0,
        clear_frames: 0,
        rebuild_frames: 0,
        bar_reveal_delay: 1.5,
        speed: 0,
        palette: Some(0),
        ..LoaderConfig::default()
    }
    .normalized();
    assert_eq!(cfg.grid_size, 1);
    assert_eq!(cfg.cell_size, 1);
    assert_eq!(cfg.frame_count, 1);
    assert_eq!(cfg.transition_frames, 1);
    assert_eq!(cfg.clear_frames, 1);
    assert_eq!(cfg.rebuild_frames, 1);
    assert!(cfg.bar_reveal_delay < 1.0);
    assert_eq!(cfg.bar_reveal_delay, MAX_BAR_DELAY);
    assert_eq!(cfg.speed, 1);
    assert_eq!(cfg.palette, None);

    let nan = LoaderConfig {
        bar_reveal_delay: f64::NAN,
        ..LoaderConfig::default()
    };
    assert_eq!(nan.normalized().bar_reveal_delay, 0.55);
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = LoaderConfig::from_json_slice(
        br#"{ "frame_count": 24, "strategy": "custom-build", "palette": null }"#,
    )
    .unwrap();
    assert_eq!(cfg.frame_count, 24);
    assert_eq!(cfg.strategy, StrategyKind::CustomBuild);
    assert_eq!(cfg.palette, None);
    assert_eq!(cfg.grid_size, 32);

    assert!(matches!(
        LoaderConfig::from_json_slice(b"{ not json"),
        Err(LoaderError::Serde(_))
    ));
}

#[test]
fn cell_sizes_are_deduplicated_around_the_primary() {
    let cfg = LoaderConfig {
        cell_size: 8,
        cell_sizes: vec![4, 8, 0, 4],
        ..LoaderConfig::default()
    }
    .normalized();
    assert_eq!(cfg.all_cell_sizes(), vec![8, 1, 4]);
    assert_eq!(cfg.with_cell_size(4).output_size().unwrap(), 128);
}

#[test]
fn strategy_parses_aliases() {
    assert_eq!(StrategyKind::parse("Sweep").unwrap(), StrategyKind::Sweep);
    assert_eq!(
        StrategyKind::parse("custom").unwrap(),
        StrategyKind::CustomBuild
    );
    assert!(StrategyKind::parse("spiral").is_err());
}

#[test]
fn bar_delay_keeps_values_just_below_one() {
    let cfg = LoaderConfig {
        bar_reveal_delay: 0.995,
        ..LoaderConfig::default()
    };
    assert_eq!(cfg.normalized().bar_reveal_delay, 0.995);
}

#[test]
fn oversized_output_is_a_validation_error() {
    let cfg = LoaderConfig {
        grid_size: 100_000,
        cell_size: 100_000,
        ..LoaderConfig::default()
    };
    assert!(matches!(cfg.output_size(), Err(LoaderError::Validation(_))));
    assert!(matches!(
        output_edge(u32::MAX, 2),
        Err(LoaderError::Validation(_))
    ));
    assert_eq!(output_edge(32, 8).unwrap(), 256);
}
