//! Task triage engine: density-based priority, dependency propagation, and
//! time-based activation.
//!
//! A task's own priority is its density (importance over effort). A task
//! blocking something denser inherits that density plus a margin, and carries
//! a pointer to the task its chain ultimately blocks. Activation is purely
//! time-based, and activation changes are the only thing that cascades
//! through stored dependency snapshots.
//!
//! # Layout
//! - [`domain`]: tasks, priority math, activation rules, events
//! - [`ports`]: repository, clock, and event sink seams
//! - [`app`]: the task service, cascade protocol, and activation sweep
//! - [`impls`]: in-memory and wall-clock implementations of the ports

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
