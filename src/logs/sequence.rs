//! Apply-latest-only guard for overlapping fetches
//!
//! Superseded requests are not cancelled; their responses are discarded on
//! arrival instead, so completion order cannot clobber newer results.

/// Tag attached to one issued fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// Monotonic sequence of issued fetches
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
    in_flight: bool,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding every earlier one
    pub fn issue(&mut self) -> FetchTicket {
        self.latest += 1;
        self.in_flight = true;
        FetchTicket(self.latest)
    }

    pub fn is_latest(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Record that `ticket` resolved. Returns whether its result may be applied.
    pub fn resolve(&mut self, ticket: FetchTicket) -> bool {
        if self.is_latest(ticket) {
            self.in_flight = false;
            true
        } else {
            false
        }
    }

    /// Whether the latest issued fetch has not resolved yet
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_late_response_is_discarded() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();

        assert!(seq.is_loading());
        assert!(seq.resolve(b));
        assert!(!seq.is_loading());
        assert!(!seq.resolve(a));
        assert!(!seq.is_loading());
    }

    #[test]
    fn test_stale_resolution_keeps_loading() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let _b = seq.issue();

        assert!(!seq.resolve(a));
        assert!(seq.is_loading());
    }

    #[test]
    fn test_tickets_increase() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        assert!(b > a);
        assert_eq!(b.seq(), 2);
    }
}
