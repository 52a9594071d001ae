//! Aggregate root abstraction.
//!
//! Every state machine in the engine (stage controllers and both
//! orchestrators) is an aggregate: commands validate against the current
//! state, record an event, and the event is applied immediately. `apply` is
//! the only place state transitions happen.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for state machines that change only by applying their own events.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded since the last drain.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears recorded events once a consumer has observed them.
    fn clear_uncommitted_events(&mut self);
}
