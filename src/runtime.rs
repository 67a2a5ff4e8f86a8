use crate::dom::NodeId;

/// Work a controller deferred onto the virtual clock. Jobs are plain data,
/// so a pending queue can be inspected and replayed deterministically.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TimerJob {
    /// Re-attach the `delay-*` classes stripped when a repeating reveal
    /// element left the viewport.
    RestoreDelayClasses {
        node: NodeId,
        classes: Vec<String>,
    },
    /// The post-init pass that marks elements already in view as visible.
    RevealCatchUp,
}

impl TimerJob {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::RestoreDelayClasses { .. } => "delay_restore",
            Self::RevealCatchUp => "reveal_catch_up",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) job: TimerJob,
}

/// Public snapshot of a scheduled task, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub job: &'static str,
}

/// One dispatched input event. Handlers flip the two flags the same way
/// listener callbacks would via `preventDefault` / `stopPropagation`.
#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) target: NodeId,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
}

impl EventState {
    pub(crate) fn new(target: NodeId) -> Self {
        Self {
            target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }
}

/// A smooth-scroll request issued by a handler. The harness applies the
/// position immediately (it has no animation frames) and keeps the request
/// on record for assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRequest {
    pub target_y: f64,
    pub behavior: &'static str,
}

/// Side effects accumulated while handlers run. Handlers only see the DOM
/// and geometry; everything that touches the harness itself (clock, trace,
/// scroll position) goes through here and is applied after the handler
/// pass, which keeps the borrow story simple and the ordering explicit.
#[derive(Debug, Default)]
pub(crate) struct Effects {
    pub(crate) timers: Vec<(i64, TimerJob)>,
    pub(crate) scrolls: Vec<ScrollRequest>,
    pub(crate) traces: Vec<String>,
}

impl Effects {
    pub(crate) fn schedule(&mut self, delay_ms: i64, job: TimerJob) {
        self.timers.push((delay_ms, job));
    }

    pub(crate) fn smooth_scroll(&mut self, target_y: f64) {
        self.scrolls.push(ScrollRequest {
            target_y,
            behavior: "smooth",
        });
    }

    pub(crate) fn trace(&mut self, line: String) {
        self.traces.push(line);
    }
}
