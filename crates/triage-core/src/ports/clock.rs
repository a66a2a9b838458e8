//! Clock port: the current time as a dependency.
//!
//! Activation is a comparison against "now", so time is injected rather than
//! read ambiently. Production wires `SystemClock`; tests use `FixedClock`
//! and move it by hand.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
