//! Reversible, audited performance tuning of a single
//! host for ML workloads.
//!
//! The acceleration core: context detection, pre-change state capture,
//! guarded apply (dry-run and risk gating), selective restore, and
//! status aggregation. A bounded catalog of known tunables is applied
//! and later reverted exactly; the catalog never chooses values, it
//! only applies and undoes the fixed ones.
//!
//! All host access goes through the [`host::HostOps`] seam so the
//! engines are testable against a scripted host.

pub mod catalog;
pub mod context;
pub mod engine;
pub mod error;
pub mod host;
pub mod model;
pub mod state;
pub mod status;

pub use context::HostContext;
pub use error::AccelError;
pub use host::{HostOps, RealHost};
pub use model::{AccelerationRecord, ActiveStatus, Change, ChangeResult, Mode, Scope};
