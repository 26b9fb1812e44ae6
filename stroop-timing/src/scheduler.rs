use std::time::Duration;

/// Cancellation handle for one scheduled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Pending<A> {
    id: u64,
    due_ns: u64,
    action: A,
}

/// Deadline queue for delayed actions.
///
/// Every timed phase transition of the session goes through this queue.
/// The owner polls `pop_due` with the current time and applies drained
/// actions one at a time, so timer effects and user input are serialized
/// and never concurrent. A handle returned by `schedule_after` cancels the
/// entry before it fires; `cancel_all` clears the queue on state resets so
/// a stale timer can never mutate a fresh session.
#[derive(Debug)]
pub struct Scheduler<A> {
    pending: Vec<Pending<A>>,
    next_id: u64,
}

impl<A> Scheduler<A> {
    pub fn new() -> Scheduler<A> {
        Scheduler {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedules `action` to fire once `delay` has elapsed past `now_ns`.
    pub fn schedule_after(&mut self, now_ns: u64, delay: Duration, action: A) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due_ns: now_ns + delay.as_nanos() as u64,
            action,
        });
        TimerHandle(id)
    }

    /// Removes a pending entry. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != handle.0);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Pops the earliest entry whose deadline has passed. Ties resolve in
    /// schedule order.
    pub fn pop_due(&mut self, now_ns: u64) -> Option<A> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ns <= now_ns)
            .min_by_key(|(_, p)| (p.due_ns, p.id))
            .map(|(i, _)| i)?;
        Some(self.pending.remove(idx).action)
    }

    pub fn next_due_ns(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ns).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<A> Default for Scheduler<A> {
    fn default() -> Scheduler<A> {
        Scheduler::new()
    }
}
