use super::*;

fn sweep(speed: u32, transition: u32, idle: u32) -> PhasePlan {
    PhasePlan::compute(PlanParams {
        speed,
        transition_frames: transition,
        idle_frames: idle,
        strategy: PhaseStrategy::AngularSweep {
            clear_frames: 8,
            rebuild_frames: 12,
        },
    })
}

fn custom(speed: u32, hold_frames: u32, sequence_len: u64) -> PhasePlan {
    PhasePlan::compute(PlanParams {
        speed,
        transition_frames: 10,
        idle_frames: 16,
        strategy: PhaseStrategy::CustomBuild {
            hold_frames,
            sequence_len,
        },
    })
}

fn assert_tiles(plan: &PhasePlan) {
    let total = plan.total_frames();
    for i in 0..total {
        assert!(
            plan.phase_at(FrameIndex(i)).is_some(),
            "frame {i} of {total} is not covered"
        );
    }
    assert!(plan.phase_at(FrameIndex(total)).is_none());

    let phases = plan.phases();
    assert_eq!(phases[0].range.start, FrameIndex(0));
    assert_eq!(phases.last().unwrap().range.end, FrameIndex(total));
    for pair in phases.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(a.range.start <= b.range.start, "phases out of order");
        if a.kind == PhaseKind::Hold {
            assert_eq!(b.kind, PhaseKind::Break);
            let overlap = a.range.end.0 - b.range.start.0;
            assert!((1..=u64::from(OVERLAP_FRAMES * plan.speed())).contains(&overlap));
        } else {
            assert_eq!(a.range.end, b.range.start, "gap or overlap after {:?}", a.kind);
        }
        assert!(!a.range.is_empty());
    }
}

#[test]
fn default_sweep_plan_has_the_documented_boundaries() {
    let plan = sweep(1, 10, 16);
    let kinds: Vec<_> = plan.phases().iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PhaseKind::Hold,
            PhaseKind::Break,
            PhaseKind::Clear,
            PhaseKind::Rebuild,
            PhaseKind::Idle
        ]
    );
    assert_eq!(plan.total_frames(), 56);
    assert_eq!(plan.range_of(PhaseKind::Hold), Some(FrameRange::with_len(0, 10)));
    assert_eq!(plan.range_of(PhaseKind::Break), Some(FrameRange::with_len(8, 10)));
    assert_eq!(plan.range_of(PhaseKind::Clear), Some(FrameRange::with_len(18, 8)));
    assert_eq!(plan.range_of(PhaseKind::Rebuild), Some(FrameRange::with_len(26, 12)));
    assert_eq!(plan.range_of(PhaseKind::Idle), Some(FrameRange::with_len(38, 18)));
    assert_tiles(&plan);
}

#[test]
fn overlap_frames_dispatch_to_break_over_the_hold() {
    let plan = sweep(1, 10, 16);
    assert_eq!(plan.phase_at(FrameIndex(7)).unwrap().kind, PhaseKind::Hold);
    for i in 8..10 {
        assert_eq!(plan.phase_at(FrameIndex(i)).unwrap().kind, PhaseKind::Break);
        assert!(plan.hold_contains(FrameIndex(i)));
    }
    assert!(!plan.hold_contains(FrameIndex(10)));
}

#[test]
fn speed_scales_hold_overlap_and_break() {
    let plan = sweep(2, 10, 16);
    assert_eq!(plan.range_of(PhaseKind::Hold), Some(FrameRange::with_len(0, 20)));
    assert_eq!(plan.range_of(PhaseKind::Break), Some(FrameRange::with_len(16, 20)));
    assert_eq!(plan.total_frames(), 20 + 20 + 8 + 12 + 16);
    assert_tiles(&plan);
}

#[test]
fn zero_transition_is_clamped_to_a_single_step() {
    let plan = sweep(1, 0, 16);
    assert_eq!(plan.transition_steps(), 1);
    assert_eq!(plan.range_of(PhaseKind::Break), Some(FrameRange::with_len(8, 1)));
    // Hold is cut at the end of the short break.
    assert_eq!(plan.range_of(PhaseKind::Hold), Some(FrameRange::with_len(0, 9)));
    assert_tiles(&plan);
}

#[test]
fn custom_build_plan_holds_then_plays_the_sequence() {
    let plan = custom(1, 22, 170);
    assert_eq!(plan.range_of(PhaseKind::Hold2), Some(FrameRange::with_len(18, 22)));
    assert_eq!(
        plan.range_of(PhaseKind::CustomBuild),
        Some(FrameRange::with_len(40, 170))
    );
    assert_eq!(plan.total_frames(), 10 + 10 + 22 + 170 + 16);
    assert!(plan.range_of(PhaseKind::Clear).is_none());
    assert_tiles(&plan);
}

#[test]
fn empty_hold2_is_omitted() {
    let plan = custom(1, 0, 5);
    assert!(plan.range_of(PhaseKind::Hold2).is_none());
    assert_tiles(&plan);
}

#[test]
fn tiling_holds_across_a_config_grid() {
    for speed in 1..=4 {
        for transition in 0..=12 {
            for idle in [0, 1, 16] {
                assert_tiles(&sweep(speed, transition, idle));
            }
            assert_tiles(&custom(speed, 3, 17));
        }
    }
}

#[test]
fn idle_only_is_a_single_phase() {
    let plan = PhasePlan::idle_only(16);
    assert_eq!(plan.total_frames(), 16);
    assert_eq!(plan.phases().len(), 1);
    assert_eq!(plan.phase_at(FrameIndex(15)).unwrap().kind, PhaseKind::Idle);
    assert!(!plan.hold_contains(FrameIndex(0)));
}
