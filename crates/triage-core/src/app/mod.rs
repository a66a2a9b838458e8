//! Application layer: the task service, the cascade protocol, and the
//! background activation sweep.

pub mod cascade;
pub mod service;
pub mod sweep;

pub use service::TaskService;
pub use sweep::ActivationSweep;
