use crate::assets::decode::SourceIcon;
use crate::config::{LoaderConfig, StrategyKind};
use crate::effects::custom_build::{expand_slow, icon_mask, loop_frames, render_custom_frame};
use crate::effects::dissolve::{break_progress, build_break_frame};
use crate::effects::sweep::{AngularSweep, SweepDirection, sweep_progress};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LoaderError, LoaderResult};
use crate::plan::phases::{PhaseKind, PhasePlan, PhaseStrategy, PlanParams};
use crate::raster::buffer::RasterBuffer;
use crate::raster::mask::GridMask;
use crate::style::render::{ALPHA_THRESHOLD, StyleVariant, render_mask_style, render_style};

/// Which animation a [`FrameSynth`] produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopKind {
    /// The settled variant only.
    Idle,
    /// Original icon, break, then the configured strategy, then idle.
    Transition,
}

/// Per-variant frame synthesizer.
///
/// Everything shared across frames (settled raster, sweep field, custom sequence) is built once in
/// [`FrameSynth::new`]; [`FrameSynth::render_frame`] is then a pure function of the index, so
/// frames can be rendered in any order and on any thread.
#[derive(Clone, Debug)]
pub struct FrameSynth {
    cfg: LoaderConfig,
    variant: StyleVariant,
    plan: PhasePlan,
    original: RasterBuffer,
    settled: RasterBuffer,
    final_break: RasterBuffer,
    sweep: Option<AngularSweep>,
    custom: Vec<GridMask>,
}

impl FrameSynth {
    #[tracing::instrument(skip(cfg, icon, variant), fields(variant = variant.name()))]
    pub fn new(
        cfg: &LoaderConfig,
        icon: &SourceIcon,
        variant: StyleVariant,
        kind: LoopKind,
    ) -> LoaderResult<Self> {
        let cfg = cfg.normalized();
        let grid = cfg.grid_size;
        let out_size = cfg.output_size()?;
        if icon.grid.width != grid || icon.grid.height != grid {
            return Err(LoaderError::validation(format!(
                "grid icon must be {grid}x{grid}, got {}x{}",
                icon.grid.width, icon.grid.height
            )));
        }
        if icon.original.width != out_size || icon.original.height != out_size {
            return Err(LoaderError::validation(format!(
                "original icon must be {out_size}x{out_size}, got {}x{}",
                icon.original.width, icon.original.height
            )));
        }

        // Idle and transition loops share one settled look.
        let settled = if cfg.strategy == StrategyKind::CustomBuild && cfg.use_icon_mask {
            render_mask_style(&icon_mask(), grid, cfg.cell_size, variant)
        } else {
            render_style(&icon.grid, grid, cfg.cell_size, variant)?
        };
        let original = if variant.theme.is_inverted() {
            icon.original.negated()
        } else {
            icon.original.clone()
        };

        let mut sweep = None;
        let mut custom = Vec::new();
        let strategy = match (kind, cfg.strategy) {
            (LoopKind::Idle, _) => PhaseStrategy::IdleOnly,
            (LoopKind::Transition, StrategyKind::Sweep) => {
                let mask = GridMask::from_alpha_at_least(&icon.grid, ALPHA_THRESHOLD)?;
                sweep = Some(AngularSweep::new(mask, cfg.bar_reveal_delay));
                PhaseStrategy::AngularSweep {
                    clear_frames: cfg.clear_frames,
                    rebuild_frames: cfg.rebuild_frames,
                }
            }
            (LoopKind::Transition, StrategyKind::CustomBuild) => {
                let frames = loop_frames(&icon_mask(), cfg.custom_target_len as usize);
                custom = expand_slow(frames, cfg.slow_loading_frames as usize, cfg.speed);
                PhaseStrategy::CustomBuild {
                    hold_frames: cfg.transition_hold_frames,
                    sequence_len: custom.len() as u64,
                }
            }
        };

        let plan = PhasePlan::compute(PlanParams {
            speed: cfg.speed,
            transition_frames: cfg.transition_frames,
            idle_frames: cfg.frame_count,
            strategy,
        });
        let final_break = build_break_frame(&settled, grid, cfg.cell_size, 1.0);
        tracing::debug!(
            total_frames = plan.total_frames(),
            custom_frames = custom.len(),
            "frame synth ready"
        );

        Ok(Self {
            cfg,
            variant,
            plan,
            original,
            settled,
            final_break,
            sweep,
            custom,
        })
    }

    pub fn plan(&self) -> &PhasePlan {
        &self.plan
    }

    pub fn total_frames(&self) -> u64 {
        self.plan.total_frames()
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.cfg
    }

    pub fn variant(&self) -> StyleVariant {
        self.variant
    }

    /// Steady-state raster shown in the idle phase.
    pub fn settled(&self) -> &RasterBuffer {
        &self.settled
    }

    /// Original icon as shown during the hold (negated for dark themes).
    pub fn original(&self) -> &RasterBuffer {
        &self.original
    }

    pub fn output_size(&self) -> u32 {
        self.settled.width
    }

    /// Synthesize frame `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is outside `[0, total_frames)`: the plan tiles that range exactly, so any
    /// other index is a caller bug.
    pub fn render_frame(&self, idx: FrameIndex) -> LoaderResult<RasterBuffer> {
        let Some(phase) = self.plan.phase_at(idx) else {
            panic!(
                "frame {} is outside the phase plan (total {})",
                idx.0,
                self.plan.total_frames()
            );
        };
        let local = phase.range.local(idx);
        let grid = self.cfg.grid_size;
        let cell = self.cfg.cell_size;

        match phase.kind {
            PhaseKind::Hold => Ok(self.original.clone()),
            PhaseKind::Break => {
                let progress =
                    break_progress(local, self.plan.speed(), self.plan.transition_steps());
                let frame = build_break_frame(&self.settled, grid, cell, progress);
                if self.plan.hold_contains(idx) {
                    self.original.composite_under(&frame)
                } else {
                    Ok(frame)
                }
            }
            PhaseKind::Hold2 => Ok(self.final_break.clone()),
            PhaseKind::Clear | PhaseKind::Rebuild => {
                let sweep = self
                    .sweep
                    .as_ref()
                    .ok_or_else(|| LoaderError::render("sweep phase without a sweep field"))?;
                let dir = if phase.kind == PhaseKind::Clear {
                    SweepDirection::Clear
                } else {
                    SweepDirection::Rebuild
                };
                Ok(sweep.render(&self.settled, cell, dir, sweep_progress(local, grid)))
            }
            PhaseKind::CustomBuild => {
                let frame = self.custom.get(local as usize).ok_or_else(|| {
                    LoaderError::render(format!("custom frame {local} out of sequence"))
                })?;
                Ok(render_custom_frame(&self.settled, frame, grid, cell))
            }
            PhaseKind::Idle => Ok(self.settled.clone()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/orchestrator.rs"]
mod tests;
