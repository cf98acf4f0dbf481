//! Focus timer state machine.
//!
//! # Responsibility
//! - Track a countdown through `Idle`, `Running` and `Completed`.
//! - Emit one completion notification per run and drive the in-app banner.
//!
//! # Invariants
//! - Ticks and banner expiries carry the handle they were scheduled with;
//!   any handle minted before a pause, reset or completion is stale and its
//!   deliveries are ignored.
//! - A run reaches `Completed` at most once; only `reset` leaves it.

use crate::timer::notify::Notifier;
use log::{debug, info};
use std::time::Duration;

/// Default focus session length (25 minutes).
pub const DEFAULT_FOCUS_SECS: u32 = 25 * 60;
/// Default delay before the completion banner hides itself.
pub const DEFAULT_BANNER_DISMISS_SECS: u32 = 5;
/// Interval between scheduled ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const COMPLETION_TITLE: &str = "Focus session complete";
const COMPLETION_BODY: &str = "Time for a break!";

/// Durations used by the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTimerConfig {
    pub duration_secs: u32,
    pub banner_dismiss_secs: u32,
}

impl Default for FocusTimerConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_FOCUS_SECS,
            banner_dismiss_secs: DEFAULT_BANNER_DISMISS_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle { remaining: u32 },
    Running { remaining: u32 },
    Completed,
}

/// Flat snapshot for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub running: bool,
    pub notification_visible: bool,
}

/// Registration token for the tick schedule of one run segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
}

impl TickHandle {
    pub fn interval(&self) -> Duration {
        TICK_INTERVAL
    }
}

/// Registration token for one banner auto-dismiss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerHandle {
    generation: u64,
    delay: Duration,
}

impl BannerHandle {
    /// How long the scheduler should wait before `expire_banner`.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale handle or not running.
    Ignored,
    Ticked { remaining: u32 },
    Completed { banner: BannerHandle },
}

/// Countdown timer with explicit, cancellable schedule handles.
pub struct FocusTimer<N: Notifier> {
    config: FocusTimerConfig,
    phase: TimerPhase,
    banner_visible: bool,
    tick_generation: u64,
    banner_generation: u64,
    notifier: N,
    notifications_allowed: bool,
}

impl<N: Notifier> FocusTimer<N> {
    pub fn new(config: FocusTimerConfig, notifier: N) -> Self {
        Self {
            config,
            phase: TimerPhase::Idle {
                remaining: config.duration_secs,
            },
            banner_visible: false,
            tick_generation: 0,
            banner_generation: 0,
            notifier,
            notifications_allowed: false,
        }
    }

    /// Requests notification permission; denial leaves the banner as the only
    /// completion signal.
    pub fn request_notification_permission(&mut self) -> bool {
        self.notifications_allowed = self.notifier.request_permission();
        debug!(
            "event=notify_permission module=timer granted={}",
            self.notifications_allowed
        );
        self.notifications_allowed
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn state(&self) -> TimerState {
        let (remaining_seconds, running) = match self.phase {
            TimerPhase::Idle { remaining } => (remaining, false),
            TimerPhase::Running { remaining } => (remaining, true),
            TimerPhase::Completed => (0, false),
        };
        TimerState {
            remaining_seconds,
            running,
            notification_visible: self.banner_visible,
        }
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format_clock(self.state().remaining_seconds)
    }

    pub fn banner_visible(&self) -> bool {
        self.banner_visible
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Idle → Running. Returns the handle ticks must carry; `None` when
    /// completed (reset first).
    pub fn start(&mut self) -> Option<TickHandle> {
        match self.phase {
            TimerPhase::Idle { remaining } => {
                self.tick_generation += 1;
                self.phase = TimerPhase::Running { remaining };
                Some(self.tick_handle())
            }
            TimerPhase::Running { .. } => Some(self.tick_handle()),
            TimerPhase::Completed => None,
        }
    }

    /// Advances one second. The tick that brings the countdown to zero
    /// completes the run.
    pub fn tick(&mut self, handle: TickHandle) -> TickOutcome {
        if handle.generation != self.tick_generation {
            return TickOutcome::Ignored;
        }
        let TimerPhase::Running { remaining } = self.phase else {
            return TickOutcome::Ignored;
        };

        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.phase = TimerPhase::Running { remaining };
            return TickOutcome::Ticked { remaining };
        }

        TickOutcome::Completed {
            banner: self.complete(),
        }
    }

    /// Running → Idle, keeping the remaining time.
    pub fn pause(&mut self) {
        if let TimerPhase::Running { remaining } = self.phase {
            self.tick_generation += 1;
            self.phase = TimerPhase::Idle { remaining };
        }
    }

    /// Any state → Idle(default duration); hides the banner and cancels all
    /// outstanding handles.
    pub fn reset(&mut self) {
        self.tick_generation += 1;
        self.banner_generation += 1;
        self.banner_visible = false;
        self.phase = TimerPhase::Idle {
            remaining: self.config.duration_secs,
        };
    }

    /// Hides the banner on explicit user action.
    pub fn dismiss_banner(&mut self) {
        self.banner_generation += 1;
        self.banner_visible = false;
    }

    /// Auto-dismiss delivery. Returns whether the banner was hidden.
    pub fn expire_banner(&mut self, handle: BannerHandle) -> bool {
        if handle.generation != self.banner_generation || !self.banner_visible {
            return false;
        }
        self.banner_visible = false;
        true
    }

    fn complete(&mut self) -> BannerHandle {
        self.tick_generation += 1;
        self.banner_generation += 1;
        self.phase = TimerPhase::Completed;
        self.banner_visible = true;

        if self.notifications_allowed {
            if let Err(err) = self.notifier.notify(COMPLETION_TITLE, COMPLETION_BODY) {
                debug!("event=focus_notify module=timer status=ignored error={err}");
            }
        }
        info!(
            "event=focus_complete module=timer status=ok duration_secs={} notified={}",
            self.config.duration_secs, self.notifications_allowed
        );

        BannerHandle {
            generation: self.banner_generation,
            delay: Duration::from_secs(u64::from(self.config.banner_dismiss_secs)),
        }
    }

    fn tick_handle(&self) -> TickHandle {
        TickHandle {
            generation: self.tick_generation,
        }
    }
}

/// Formats seconds as zero-padded `MM:SS`.
pub fn format_clock(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
