//! # System Interaction Layer
//!
//! Boundary between the planning logic in `core` and process-wide state.
//!
//! ## Modules
//!
//! - **`logging`**: Applies a `SinkPlan` to the `log` façade through `env_logger` sinks,
//!   replacing the previous sink set on every call.

pub mod logging;
