//! HTTP plumbing shared by the giveaway service: health probes, request ids,
//! tracing set-up and timestamp serialization.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
