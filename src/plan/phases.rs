use crate::foundation::core::{FrameIndex, FrameRange};

/// Baseline hold on the original icon, in unscaled frames.
pub const HOLD_FRAMES: u32 = 10;
/// How many unscaled frames before the end of the hold the break starts.
pub const OVERLAP_FRAMES: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseKind {
    /// Original icon, unmodified.
    Hold,
    /// Dissolve from nothing into the settled raster.
    Break,
    /// Fully-progressed break frame held still.
    Hold2,
    Clear,
    Rebuild,
    /// Precomputed stroke-grown mask sequence.
    CustomBuild,
    /// Settled raster.
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub range: FrameRange,
}

/// What follows the break.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseStrategy {
    AngularSweep { clear_frames: u32, rebuild_frames: u32 },
    CustomBuild { hold_frames: u32, sequence_len: u64 },
    /// No transition at all: the plan is a single idle phase.
    IdleOnly,
}

/// Inputs to [`PhasePlan::compute`]; counts are clamped the same way config normalization does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanParams {
    pub speed: u32,
    pub transition_frames: u32,
    pub idle_frames: u32,
    pub strategy: PhaseStrategy,
}

/// Ordered phases tiling `[0, total_frames)`.
///
/// Phases are contiguous except that `Hold` runs into the first `overlap` frames of `Break`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PhasePlan {
    phases: Vec<Phase>,
    total_frames: u64,
    speed: u32,
    transition_steps: u32,
}

impl PhasePlan {
    pub fn compute(params: PlanParams) -> Self {
        let speed = params.speed.max(1);
        let steps = params.transition_frames.max(1);
        let idle = u64::from(params.idle_frames.max(1));

        let mut phases = Vec::new();
        let mut push = |kind: PhaseKind, start: u64, len: u64| {
            if len > 0 {
                phases.push(Phase {
                    kind,
                    range: FrameRange::with_len(start, len),
                });
            }
        };

        let (hold, break_start, sequence_end) = match params.strategy {
            PhaseStrategy::IdleOnly => {
                return Self {
                    phases: vec![Phase {
                        kind: PhaseKind::Idle,
                        range: FrameRange::with_len(0, idle),
                    }],
                    total_frames: idle,
                    speed,
                    transition_steps: steps,
                };
            }
            PhaseStrategy::AngularSweep {
                clear_frames,
                rebuild_frames,
            } => {
                let (hold, break_start, break_end) = hold_and_break(speed, steps);
                push(PhaseKind::Hold, 0, hold.min(break_end));
                push(PhaseKind::Break, break_start, break_end - break_start);
                let clear = u64::from(clear_frames.max(1));
                let rebuild = u64::from(rebuild_frames.max(1));
                push(PhaseKind::Clear, break_end, clear);
                push(PhaseKind::Rebuild, break_end + clear, rebuild);
                (hold, break_start, break_end + clear + rebuild)
            }
            PhaseStrategy::CustomBuild {
                hold_frames,
                sequence_len,
            } => {
                let (hold, break_start, break_end) = hold_and_break(speed, steps);
                push(PhaseKind::Hold, 0, hold.min(break_end));
                push(PhaseKind::Break, break_start, break_end - break_start);
                let hold2 = u64::from(hold_frames);
                push(PhaseKind::Hold2, break_end, hold2);
                push(PhaseKind::CustomBuild, break_end + hold2, sequence_len);
                (hold, break_start, break_end + hold2 + sequence_len)
            }
        };

        // The hold baseline is counted in full, so idle absorbs the overlap.
        let total_frames = sequence_end + (hold - break_start) + idle;
        push(PhaseKind::Idle, sequence_end, total_frames - sequence_end);

        let plan = Self {
            phases,
            total_frames,
            speed,
            transition_steps: steps,
        };
        tracing::debug!(total_frames, phases = plan.phases.len(), "computed phase plan");
        plan
    }

    pub fn idle_only(idle_frames: u32) -> Self {
        Self::compute(PlanParams {
            speed: 1,
            transition_frames: 1,
            idle_frames,
            strategy: PhaseStrategy::IdleOnly,
        })
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Unscaled transition length used to normalize dissolve progress.
    pub fn transition_steps(&self) -> u32 {
        self.transition_steps
    }

    /// The phase that drives frame `f`: the last one containing it.
    pub fn phase_at(&self, f: FrameIndex) -> Option<&Phase> {
        self.phases.iter().rev().find(|p| p.range.contains(f))
    }

    /// Whether the original-icon hold still covers `f` (true under the break overlap).
    pub fn hold_contains(&self, f: FrameIndex) -> bool {
        self.phases
            .iter()
            .any(|p| p.kind == PhaseKind::Hold && p.range.contains(f))
    }

    pub fn range_of(&self, kind: PhaseKind) -> Option<FrameRange> {
        self.phases.iter().find(|p| p.kind == kind).map(|p| p.range)
    }
}

/// `(hold, break_start, break_end)` for the given speed and transition steps.
fn hold_and_break(speed: u32, steps: u32) -> (u64, u64, u64) {
    let speed = u64::from(speed);
    let hold = u64::from(HOLD_FRAMES) * speed;
    let overlap = u64::from(OVERLAP_FRAMES) * speed;
    let break_start = hold.saturating_sub(overlap);
    let break_end = break_start + u64::from(steps) * speed;
    (hold, break_start, break_end)
}

#[cfg(test)]
#[path = "../../tests/unit/plan/phases.rs"]
mod tests;
