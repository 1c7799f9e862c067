//! Slot-based admission of events into the portfolio.
//!
//! A fixed number of slots each remember the close time of the trade that
//! last occupied them. An event is admitted into the first slot, in list
//! order, whose expiry is strictly before the event's entry. The occupied
//! slot is moved to the end of the list with its new expiry, so the scan
//! order after an admission matches "remove then append".

use chrono::NaiveDateTime;

use crate::domain::barrier::ResolvedEvent;

#[derive(Debug, Clone)]
pub struct SlotGate {
    expiries: Box<[NaiveDateTime]>,
}

impl SlotGate {
    /// A gate with `capacity` free slots. A capacity of zero admits nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            expiries: vec![NaiveDateTime::MIN; capacity].into_boxed_slice(),
        }
    }

    /// Try to occupy a slot from `entry_ts` until `close_ts`.
    pub fn admit(&mut self, entry_ts: NaiveDateTime, close_ts: NaiveDateTime) -> bool {
        match self.expiries.iter().position(|&expiry| expiry < entry_ts) {
            Some(i) => {
                self.expiries[i..].rotate_left(1);
                let last = self.expiries.len() - 1;
                self.expiries[last] = close_ts;
                true
            }
            None => false,
        }
    }
}

/// Active flag for each event, in the order given. Events are fed to the gate
/// in chronological entry order regardless of input order.
pub fn gate_events(events: &[ResolvedEvent], max_concurrent_trades: usize) -> Vec<bool> {
    let mut order: Vec<usize> = (0..events.len()).collect();
    order.sort_by_key(|&i| (events[i].event.entry_ts, i));

    let mut gate = SlotGate::new(max_concurrent_trades);
    let mut active = vec![false; events.len()];
    for i in order {
        let resolved = &events[i];
        active[i] = gate.admit(resolved.event.entry_ts, resolved.close_ts);
    }
    active
}
