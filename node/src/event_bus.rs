//! In-process fan-out of governance events.

use quorum_types::EventRecord;

/// Synchronous fan-out event bus for governance events.
///
/// Listeners are invoked inline on the engine task after each request;
/// keep handlers fast to avoid stalling the command loop. Subscribers that
/// want to run elsewhere should use [`NodeHandle::subscribe`] instead.
///
/// [`NodeHandle::subscribe`]: crate::NodeHandle::subscribe
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&EventRecord) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&EventRecord) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &EventRecord) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_types::{Address, Event, ProposalId, ProposalState, Timepoint, TokenAmount};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn record(seq: u64, event: Event) -> EventRecord {
        EventRecord {
            seq,
            at: Timepoint::new(seq),
            event,
        }
    }

    fn transfer() -> Event {
        Event::Transfer {
            from: Address::ZERO,
            to: Address::from_low_u64(1),
            amount: TokenAmount::new(5),
        }
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&record(0, transfer()));
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::default();
        assert!(bus.is_empty());
        bus.emit(&record(0, transfer()));
    }

    #[test]
    fn listener_sees_event_variant() {
        let state_changes = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let sc = Arc::clone(&state_changes);
        bus.subscribe(Box::new(move |record| {
            if let Event::ProposalStateChanged { .. } = record.event {
                sc.fetch_add(1, Ordering::SeqCst);
            }
        }));

        bus.emit(&record(0, transfer()));
        bus.emit(&record(
            1,
            Event::ProposalStateChanged {
                id: ProposalId::ZERO,
                state: ProposalState::Queued,
            },
        ));
        assert_eq!(state_changes.load(Ordering::SeqCst), 1);
    }
}
