use super::*;
use crate::encode::sink::InMemorySink;

fn icon_image() -> RgbaImage {
    RgbaImage::from_fn(32, 32, |x, y| {
        let ring = (4..28).contains(&x) && (4..28).contains(&y);
        let hole = (8..24).contains(&x) && (8..24).contains(&y);
        let bar = (15..17).contains(&x);
        if (ring && !hole) || (ring && bar) {
            image::Rgba([20, 40, 60, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    })
}

fn small_cfg() -> LoaderConfig {
    LoaderConfig {
        cell_size: 2,
        ..LoaderConfig::default()
    }
}

fn synth(kind: LoopKind) -> FrameSynth {
    let cfg = small_cfg();
    let icon = SourceIcon::from_image(&icon_image(), cfg.grid_size, cfg.cell_size).unwrap();
    FrameSynth::new(&cfg, &icon, StyleVariant::BORDER_DARK, kind).unwrap()
}

#[test]
fn parallel_render_matches_sequential() {
    let synth = synth(LoopKind::Transition);
    let range = FrameRange::with_len(0, synth.total_frames());
    let sequential = render_frames(&synth, range, &RenderThreading::default()).unwrap();
    let parallel = render_frames(
        &synth,
        range,
        &RenderThreading {
            parallel: true,
            chunk_size: 7,
            threads: Some(3),
        },
    )
    .unwrap();
    assert_eq!(sequential.len() as u64, synth.total_frames());
    assert_eq!(sequential, parallel);
}

#[test]
fn render_to_sink_pushes_every_frame_in_order() {
    let synth = synth(LoopKind::Transition);
    let mut sink = InMemorySink::new();
    let stats = render_to_sink(
        &synth,
        &mut sink,
        &RenderThreading {
            parallel: true,
            chunk_size: 16,
            threads: Some(2),
        },
    )
    .unwrap();

    assert_eq!(stats.frames_total, 56);
    assert_eq!(stats.chunks, 4);
    assert!(sink.is_finished());
    let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, (0..56).collect::<Vec<_>>());
    assert_eq!(sink.config().unwrap(), sink_config(&synth));
}

#[test]
fn zero_threads_is_rejected() {
    let synth = synth(LoopKind::Idle);
    let err = render_frames(
        &synth,
        FrameRange::with_len(0, 1),
        &RenderThreading {
            parallel: true,
            chunk_size: 1,
            threads: Some(0),
        },
    )
    .unwrap_err();
    assert!(matches!(err, LoaderError::Validation(_)));
}

#[test]
fn ranges_past_the_plan_are_rejected() {
    let synth = synth(LoopKind::Idle);
    assert!(
        render_frames(
            &synth,
            FrameRange::with_len(10, 10),
            &RenderThreading::default()
        )
        .is_err()
    );
}

#[test]
fn manifest_comes_from_the_plan() {
    let synth = synth(LoopKind::Transition);
    assert_eq!(
        manifest(&synth),
        Manifest {
            frames: 56,
            ms: 40,
            width: 64,
            height: 64
        }
    );
    assert_eq!(manifest(&self::synth(LoopKind::Idle)).frames, 16);
}

#[test]
fn variant_builds_cover_every_combination() {
    let cfg = LoaderConfig {
        cell_sizes: vec![4],
        ..small_cfg()
    }
    .normalized();
    let builds = variant_builds(&cfg);
    assert_eq!(builds.len(), 16);
    assert_eq!(builds[0].cell_size, 2);
    assert_eq!(builds[0].kind, LoopKind::Idle);
    assert_eq!(builds[15].cell_size, 4);
    assert_eq!(builds[15].kind, LoopKind::Transition);
    assert_eq!(builds[15].stem(32), "transition-solid-dark-128");
    assert_eq!(builds[0].stem(32), "loader-border-light-64");
}

#[test]
fn build_variants_writes_frame_directories() {
    let out_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("unit-pipeline")
        .join("build_variants");
    let opts = OutputOpts {
        write_gif: false,
        ..OutputOpts::new(&out_dir)
    };
    let cfg = LoaderConfig {
        cell_size: 1,
        ..LoaderConfig::default()
    };
    let reports = build_variants(&cfg, &icon_image(), &opts).unwrap();
    assert_eq!(reports.len(), 8);
    for report in &reports {
        assert!(report.gif.is_none());
        let dir = report.frames_dir.as_ref().unwrap();
        let on_disk = Manifest::load(dir.join(crate::encode::frames::MANIFEST_FILE)).unwrap();
        assert_eq!(on_disk, report.manifest);
        assert!(dir.join("frame-000.png").exists());
        let last = format!("frame-{:03}.png", report.manifest.frames - 1);
        assert!(dir.join(last).exists());
    }
}

#[test]
fn write_frame_png_rejects_out_of_range_frames() {
    let synth = synth(LoopKind::Idle);
    let out = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("unit-pipeline")
        .join("never.png");
    assert!(write_frame_png(&synth, FrameIndex(16), &out).is_err());
}
