//! Monotonic room id generator.

use super::types::RoomId;

/// Hands out room ids in strictly increasing order.
///
/// One generator is shared by both allocation phases of a run. It is an
/// ordinary owned value: callers that want ids to continue across runs
/// keep the generator and pass it back in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomIdGenerator {
    start: RoomId,
    next: RoomId,
}

impl RoomIdGenerator {
    /// Creates a generator whose first id is `start`, clamped to
    /// [`RoomId::MAX_FIRST`].
    pub fn new(start: RoomId) -> Self {
        let start = start.min(RoomId::MAX_FIRST);
        Self { start, next: start }
    }

    /// Creates a generator from a raw first id, clamping zero to 1.
    pub fn starting_at(start: u64) -> Self {
        Self::new(RoomId::new(start).unwrap_or_default())
    }

    /// Returns the next id and advances the counter.
    pub fn next_id(&mut self) -> RoomId {
        let id = self.next;
        self.next = id.successor();
        id
    }

    /// The id the next call to [`next_id`](Self::next_id) will return.
    pub fn peek(&self) -> RoomId {
        self.next
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.next.get() - self.start.get()
    }
}

impl Default for RoomIdGenerator {
    fn default() -> Self {
        Self::new(RoomId::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_consecutive() {
        let mut ids = RoomIdGenerator::default();
        let got: Vec<u64> = (0..4).map(|_| ids.next_id().get()).collect();
        assert_eq!(got, vec![1, 2, 3, 4]);
        assert_eq!(ids.issued(), 4);
        assert_eq!(ids.peek().get(), 5);
    }

    #[test]
    fn test_zero_start_clamps() {
        let mut ids = RoomIdGenerator::starting_at(0);
        assert_eq!(ids.next_id().get(), 1);
    }

    #[test]
    fn test_start_clamps_to_max_first() {
        let mut ids = RoomIdGenerator::starting_at(u64::MAX);
        let first = ids.next_id();
        let second = ids.next_id();
        assert_eq!(first, RoomId::MAX_FIRST);
        assert_eq!(second.get(), RoomId::MAX_FIRST.get() + 1);
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_custom_start() {
        let mut ids = RoomIdGenerator::starting_at(100);
        assert_eq!(ids.issued(), 0);
        assert_eq!(ids.next_id().get(), 100);
        assert_eq!(ids.issued(), 1);
    }
}
