use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Why a full refresh was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// Auto-refresh timer fired.
    Poll,
    /// User asked for a refresh.
    Manual,
    /// Follow-up after an upload batch or job action settled.
    AfterMutation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshDecision {
    Start,
    /// A refresh is outstanding; this trigger is discarded.
    Dropped,
    /// A refresh is outstanding; one follow-up will run when it settles.
    Coalesced,
}

/// Ensures at most one `GET /api/jobs` is outstanding at any time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct RefreshGate {
    in_flight: bool,
    follow_up: bool,
}

impl RefreshGate {
    pub(crate) fn request(&mut self, trigger: RefreshTrigger) -> RefreshDecision {
        if !self.in_flight {
            self.in_flight = true;
            return RefreshDecision::Start;
        }
        match trigger {
            RefreshTrigger::Poll | RefreshTrigger::Manual => RefreshDecision::Dropped,
            RefreshTrigger::AfterMutation => {
                self.follow_up = true;
                RefreshDecision::Coalesced
            }
        }
    }

    /// Mark the outstanding refresh settled. Returns true when a coalesced
    /// follow-up must start now; the gate stays closed in that case.
    pub(crate) fn settle(&mut self) -> bool {
        if self.follow_up {
            self.follow_up = false;
            true
        } else {
            self.in_flight = false;
            false
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.in_flight || self.follow_up
    }
}

/// Single-shot poll timer bookkeeping.
///
/// The timer is armed after each refresh settles. Every arming bumps the
/// generation; a tick is honoured only if it carries the current generation
/// and auto-refresh is still enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PollTimer {
    enabled: bool,
    armed: bool,
    generation: u64,
    interval: Duration,
}

impl Default for PollTimer {
    fn default() -> Self {
        Self {
            enabled: false,
            armed: false,
            generation: 0,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollTimer {
    pub(crate) fn configure(&mut self, enabled: bool, interval: Duration) {
        self.enabled = enabled;
        self.interval = interval;
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Arm for the next tick; returns the generation and delay, or None when disabled.
    pub(crate) fn arm(&mut self) -> Option<(u64, Duration)> {
        if !self.enabled {
            return None;
        }
        self.generation += 1;
        self.armed = true;
        Some((self.generation, self.interval))
    }

    /// Invalidate any outstanding tick. Returns whether one was armed.
    pub(crate) fn disarm(&mut self) -> bool {
        let was_armed = self.armed;
        self.armed = false;
        self.generation += 1;
        was_armed
    }

    pub(crate) fn accept_tick(&mut self, generation: u64) -> bool {
        if self.enabled && self.armed && generation == self.generation {
            self.armed = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_drops_poll_and_manual_while_busy() {
        let mut gate = RefreshGate::default();
        assert_eq!(gate.request(RefreshTrigger::Poll), RefreshDecision::Start);
        assert_eq!(gate.request(RefreshTrigger::Manual), RefreshDecision::Dropped);
        assert_eq!(gate.request(RefreshTrigger::Poll), RefreshDecision::Dropped);
        assert!(!gate.settle());
        assert!(!gate.is_busy());
    }

    #[test]
    fn gate_coalesces_follow_ups_into_one() {
        let mut gate = RefreshGate::default();
        gate.request(RefreshTrigger::Manual);
        assert_eq!(
            gate.request(RefreshTrigger::AfterMutation),
            RefreshDecision::Coalesced
        );
        assert_eq!(
            gate.request(RefreshTrigger::AfterMutation),
            RefreshDecision::Coalesced
        );
        assert!(gate.settle());
        assert!(gate.is_busy());
        assert!(!gate.settle());
        assert!(!gate.is_busy());
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let mut timer = PollTimer::default();
        timer.configure(true, Duration::from_secs(1));
        let (first, _) = timer.arm().unwrap();
        let (second, _) = timer.arm().unwrap();
        assert!(!timer.accept_tick(first));
        assert!(timer.accept_tick(second));
        assert!(!timer.accept_tick(second));
    }

    #[test]
    fn disabled_timer_never_arms() {
        let mut timer = PollTimer::default();
        assert_eq!(timer.arm(), None);
        timer.configure(true, Duration::from_secs(1));
        let (generation, _) = timer.arm().unwrap();
        timer.set_enabled(false);
        assert!(!timer.accept_tick(generation));
    }
}
