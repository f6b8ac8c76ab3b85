//! Parameter model for a discrete-event simulation of COVID exposure in a
//! dialysis clinic.
//!
//! Two pieces: seeded sampling [`distribution`]s with per-instance random
//! streams, and the immutable [`Scenario`] bundle of every knob a
//! replication runs against. The simulation engine holds one `Scenario` per
//! replication and samples its distribution fields as patients move through
//! states; this crate does no stepping of its own.

pub mod config;
pub mod distribution;
pub mod error;
mod hashing;
pub mod log;
pub mod scenario;

pub use config::{DistributionSpec, ScenarioConfig};
pub use distribution::{Distribution, Normal, Uniform};
pub use error::DialysisError;
pub use scenario::{Scenario, ScenarioBuilder};
