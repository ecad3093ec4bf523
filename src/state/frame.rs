//! Per-frame coalescing of map recomputation.

/// Collapses any number of recompute requests between two frames into a
/// single recompute.
#[derive(Debug, Default)]
pub struct FrameThrottle {
    pending: bool,
    /// Requests absorbed by an already pending recompute
    coalesced: u64,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks for a recompute on the next frame.
    ///
    /// Returns true if this request scheduled it, false if one was already pending.
    pub fn request(&mut self) -> bool {
        if self.pending {
            self.coalesced += 1;
            return false;
        }
        self.pending = true;
        true
    }

    /// Called once per frame. Returns true if a recompute should run now.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Requests absorbed so far by an already pending recompute.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce_until_frame() {
        let mut throttle = FrameThrottle::new();
        assert!(throttle.request());
        assert!(!throttle.request());
        assert!(!throttle.request());
        assert_eq!(throttle.coalesced(), 2);

        assert!(throttle.take());
        assert!(!throttle.take());
    }

    #[test]
    fn test_idle_frame_does_nothing() {
        let mut throttle = FrameThrottle::new();
        assert!(!throttle.take());
        assert_eq!(throttle.coalesced(), 0);

        // The next request schedules normally
        assert!(throttle.request());
        assert!(throttle.take());
    }
}
