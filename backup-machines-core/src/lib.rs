//! Core types and traits for the backup-machines declarative state-machine
//! framework.
//!
//! A machine is a directed graph of nodes, each a single unit of work that
//! performs one observable side effect and returns a [`result::Transition`]
//! naming the next node and the [`result::Outcome`] (Success or Failure) of
//! that step. This crate owns the parts that are the same for every
//! pipeline built on it:
//!
//! - [`result`]: the `Outcome`/`Transition` sum types.
//! - [`metadata`]: the `'static` per-node/per-machine design contract.
//! - [`spec`]: the pure graph validator, run by `backup-machines-macro` at
//!   compile time.
//! - [`driver`]: the `Machine` trait and the `Driver` that executes it.
//! - [`logger`]: the external logging contract.
//! - [`binder`]: the dependency binder that carries a logger into adapter
//!   calls without any shared mutable state.
//!
//! Everything concrete (shell invocations, cloud SDK calls, GPG, database
//! dumps, pipeline state objects) lives outside this crate, built against
//! the interfaces here.

pub mod binder;
pub mod driver;
pub mod logger;
pub mod metadata;
pub mod result;
pub mod spec;

pub use binder::{Binder, Bound, RepositoryAdapter};
pub use driver::{Driver, DriverError, Machine, NodeError, NodeOutcome, Runtime};
pub use logger::{Logger, NullLogger};
pub use metadata::{MachineMetadata, NodeMetadata, RESERVED_NAMES};
pub use result::{Outcome, QualifiedName, Transition};
pub use spec::{validate, MachineSpec, NodeSpec, ValidationError};
