//! Declarative state machines for backup and restore pipelines.
//!
//! A pipeline is written as one `impl` block decorated with
//! [`machine`](backup_machines_macro::machine); each node method is
//! decorated with `#[node(...)]` and either `#[handle_exceptions(...)]` or
//! `#[no_exceptions]`. The macro validates the resulting graph at compile
//! time and [`Driver::run`](core::Driver::run) executes it.
//!
//! ```ignore
//! use backup_machines::prelude::*;
//!
//! struct ArchiveEncrypt {
//!     runtime: Runtime,
//!     failure_prefix: String,
//!     logger: Box<dyn Logger>,
//! }
//!
//! #[machine(overview = "Archives and encrypts a file.")]
//! impl ArchiveEncrypt {
//!     #[node(overview = "Entry point.", is_entry, happy_paths(report_results))]
//!     #[no_exceptions]
//!     fn ensure_staging(&mut self) -> NodeOutcome {
//!         Ok(self.success("report_results"))
//!     }
//!
//!     #[node(overview = "Reports the outcome.", is_terminal)]
//!     #[no_exceptions]
//!     fn report_results(&mut self) -> NodeOutcome {
//!         Ok(self.exit())
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod logging;
pub mod pool;

/// Re-export of `backup-machines-core`, the path macro-generated code
/// addresses its types through.
pub mod core {
    pub use backup_machines_core::*;
}

pub use backup_machines_macro::machine;

/// Common imports for a pipeline crate.
pub mod prelude {
    pub use crate::core::{
        Binder, Bound, Driver, DriverError, Logger, Machine, MachineMetadata, NodeError,
        NodeMetadata, NodeOutcome, Outcome, QualifiedName, RepositoryAdapter, Runtime, Transition,
    };
    pub use crate::logging::TracingLogger;
    pub use crate::machine;
}
