//! Activation rules: when a task counts as active, and which event (if any)
//! a transition emits.
//!
//! Transitions:
//! - inactive -> active: TaskActivated
//! - active -> inactive: TaskDeactivated
//! - no flip: no event

use chrono::{DateTime, Utc};

use super::events::DomainEvent;
use super::ids::TaskId;

/// A task is active once its activation time has been reached.
///
/// Both sides are UTC, so comparisons never mix offsets. The boundary is
/// inclusive: a task whose activation time equals `now` is active.
pub fn is_active_at(activation_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    activation_time <= now
}

/// Event for an activation flip, or `None` when the state did not change.
pub fn transition_event(id: TaskId, was_active: bool, is_active: bool) -> Option<DomainEvent> {
    match (was_active, is_active) {
        (false, true) => Some(DomainEvent::TaskActivated { id }),
        (true, false) => Some(DomainEvent::TaskDeactivated { id }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn noon(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn past_activation_time_is_active() {
        assert!(is_active_at(noon(1), noon(2)));
    }

    #[test]
    fn exact_activation_time_is_active() {
        assert!(is_active_at(noon(1), noon(1)));
    }

    #[test]
    fn future_activation_time_is_inactive() {
        assert!(!is_active_at(noon(2), noon(1)));
    }

    #[test]
    fn flip_emits_exactly_one_event() {
        let id = TaskId::generate();
        assert_eq!(
            transition_event(id, false, true),
            Some(DomainEvent::TaskActivated { id })
        );
        assert_eq!(
            transition_event(id, true, false),
            Some(DomainEvent::TaskDeactivated { id })
        );
    }

    #[test]
    fn no_flip_emits_nothing() {
        let id = TaskId::generate();
        assert_eq!(transition_event(id, true, true), None);
        assert_eq!(transition_event(id, false, false), None);
    }
}
