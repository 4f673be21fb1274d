use std::time::Duration;

use tracing::{debug, trace};

use crate::timers::{Generation, ManualScheduler, Scheduler, TimerId, VirtualClock};

/// What the user asked to generate from. Only changes one status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Prank,
    Template,
}

/// Steps of the simulated timeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GenerationStage {
    Analyzing,
    Applying,
    Generating,
    Finalizing,
    Done,
}

impl GenerationStage {
    pub const ALL: [GenerationStage; 5] = [
        Self::Analyzing,
        Self::Applying,
        Self::Generating,
        Self::Finalizing,
        Self::Done,
    ];

    /// Offset of the stage from the start of the run.
    pub fn offset(self) -> Duration {
        Duration::from_millis(match self {
            Self::Analyzing => 0,
            Self::Applying => 1500,
            Self::Generating => 3500,
            Self::Finalizing => 5500,
            Self::Done => 7000,
        })
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Analyzing => Some(Self::Applying),
            Self::Applying => Some(Self::Generating),
            Self::Generating => Some(Self::Finalizing),
            Self::Finalizing => Some(Self::Done),
            Self::Done => None,
        }
    }

    pub fn status_text(self, kind: GenerationKind) -> &'static str {
        match (self, kind) {
            (Self::Analyzing, _) => "Analyzing photo...",
            (Self::Applying, GenerationKind::Prank) => "Applying prompt...",
            (Self::Applying, GenerationKind::Template) => "Applying template...",
            (Self::Generating, _) => "Generating image...",
            (Self::Finalizing, _) => "Finalizing...",
            (Self::Done, _) => "Done!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimer {
    generation: Generation,
    stage: GenerationStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Running {
        kind: GenerationKind,
        stage: GenerationStage,
    },
}

/// Plays the fake generation timeline. One stage timer is live at a time.
#[derive(Debug)]
pub struct GenerationSimulator<S> {
    scheduler: S,
    state: GenerationState,
    generation: Generation,
    timer: Option<TimerId>,
}

impl<S: Scheduler<StageTimer>> GenerationSimulator<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: GenerationState::Idle,
            generation: Generation::default(),
            timer: None,
        }
    }

    /// Starts (or restarts) the timeline from "Analyzing photo...".
    pub fn start(&mut self, kind: GenerationKind) {
        self.cancel_timer();
        let generation = self.generation.bump();
        self.state = GenerationState::Running {
            kind,
            stage: GenerationStage::Analyzing,
        };
        self.arm_next(GenerationStage::Analyzing);
        debug!(?kind, generation = generation.value(), "Generation started");
    }

    /// Abandons the run. No further stage changes are delivered.
    pub fn cancel(&mut self) {
        self.cancel_timer();
        self.generation.bump();
        if self.state != GenerationState::Idle {
            debug!("Generation cancelled");
        }
        self.state = GenerationState::Idle;
    }

    pub fn on_timer(&mut self, timer: StageTimer) -> bool {
        let GenerationState::Running { kind, stage } = self.state else {
            return false;
        };
        if timer.generation != self.generation || stage.next() != Some(timer.stage) {
            trace!(?timer, "Dropping stale generation timer");
            return false;
        }

        self.timer = None;
        self.state = GenerationState::Running {
            kind,
            stage: timer.stage,
        };
        self.arm_next(timer.stage);
        debug!(status = timer.stage.status_text(kind), "Generation progressed");
        true
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Status line for the current stage, `None` when idle.
    pub fn status_text(&self) -> Option<&'static str> {
        match self.state {
            GenerationState::Idle => None,
            GenerationState::Running { kind, stage } => Some(stage.status_text(kind)),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(
            self.state,
            GenerationState::Running {
                stage: GenerationStage::Done,
                ..
            }
        )
    }

    pub fn live_timers(&self) -> usize {
        self.scheduler.live_timers()
    }

    fn arm_next(&mut self, current: GenerationStage) {
        if let Some(next) = current.next() {
            let delay = next.offset() - current.offset();
            self.timer = Some(self.scheduler.schedule(
                delay,
                StageTimer {
                    generation: self.generation,
                    stage: next,
                },
            ));
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(id) = self.timer.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl GenerationSimulator<ManualScheduler<StageTimer>> {
    pub fn manual() -> Self {
        Self::new(ManualScheduler::new())
    }
}

impl VirtualClock for GenerationSimulator<ManualScheduler<StageTimer>> {
    type Event = StageTimer;

    fn manual_scheduler(&mut self) -> &mut ManualScheduler<StageTimer> {
        &mut self.scheduler
    }

    fn fire(&mut self, event: StageTimer) -> bool {
        self.on_timer(event)
    }
}
