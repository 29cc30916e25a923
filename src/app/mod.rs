//! Application core — orchestration above the protocol layer.
//!
//! [`service::RigService`] owns the shared serial channel and the task
//! scheduler. All interaction with the outside world (capture processes,
//! telemetry sinks, config storage) happens through the **port traits**
//! defined in [`ports`], keeping this layer fully testable with mock
//! adapters.

pub mod events;
pub mod ports;
pub mod service;
