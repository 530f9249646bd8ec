/// Default time the player has between two releases.
pub const DEFAULT_INPUT_TIMEOUT_MS: u64 = 5_000;

/// One-shot inactivity timer for the player's turn.
#[derive(Debug, Clone)]
pub struct TimeoutSupervisor {
    limit_ms: u64,
    armed_at: Option<u64>,
}

impl TimeoutSupervisor {
    /// Create a disarmed supervisor.
    pub fn new(limit_ms: u64) -> Self {
        Self {
            limit_ms,
            armed_at: None,
        }
    }

    /// Start (or restart) the timer at `now_ms`.
    pub fn arm(&mut self, now_ms: u64) {
        self.armed_at = Some(now_ms);
    }

    /// Stop the timer without firing.
    pub fn disarm(&mut self) {
        self.armed_at = None;
    }

    /// Whether the timer is running.
    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Configured limit.
    pub fn limit_ms(&self) -> u64 {
        self.limit_ms
    }

    /// Returns `true` exactly once when more than the limit elapsed since arming.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.armed_at {
            Some(armed_at) if now_ms.saturating_sub(armed_at) > self.limit_ms => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for TimeoutSupervisor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_TIMEOUT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_the_limit() {
        let mut timeout = TimeoutSupervisor::default();
        timeout.arm(0);
        assert!(!timeout.poll(4_999));
        assert!(!timeout.poll(5_000));
        assert!(timeout.poll(5_001));
        assert!(!timeout.poll(5_002));
        assert!(!timeout.is_armed());
    }

    #[test]
    fn rearming_moves_the_deadline() {
        let mut timeout = TimeoutSupervisor::new(100);
        timeout.arm(0);
        timeout.arm(80);
        assert!(!timeout.poll(150));
        assert!(timeout.poll(181));
    }

    #[test]
    fn disarmed_never_fires() {
        let mut timeout = TimeoutSupervisor::new(10);
        timeout.arm(0);
        timeout.disarm();
        assert!(!timeout.poll(1_000));
    }
}
