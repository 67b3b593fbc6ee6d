//! The execution engine and the `Machine` contract it drives.

use std::error::Error as StdError;
use std::fmt;
use std::time::{Duration, Instant};

use crate::logger::Logger;
use crate::metadata::MachineMetadata;
use crate::result::{Outcome, QualifiedName, Transition};

/// An unexpected error raised out of a node body. Node bodies signal
/// *expected* failures through `Machine::failure`, returning `Ok`; this
/// type only carries the data-plane doesn't-normally-happen case, a
/// panic-free stand-in for "the body threw."
///
/// A node wrapped by `handle_exceptions` never lets this escape its own
/// call: the generated wrapper catches it and turns it into a `Failure`
/// routed to the declared `on_exception` edge. A `no_exceptions` node lets
/// it propagate out of `Driver::run` as `DriverError::Unhandled`.
#[derive(Debug)]
pub struct NodeError(Box<dyn StdError + Send + Sync + 'static>);

impl NodeError {
    pub fn new(source: impl StdError + Send + Sync + 'static) -> Self {
        Self(Box::new(source))
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for NodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.0.as_ref())
    }
}

impl<E> From<E> for NodeError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(source: E) -> Self {
        Self::new(source)
    }
}

/// The return type of every node body: either the `Transition` it chose,
/// or an unexpected error (see [`NodeError`]).
pub type NodeOutcome = Result<Transition, NodeError>;

/// The mutable part of a machine instance: where it currently is, and the
/// append-only log of what has happened so far. Concrete machines hold one
/// of these (by convention, in a field named `runtime`) alongside their
/// state object and logger.
#[derive(Debug, Default)]
pub struct Runtime {
    current_node: &'static str,
    results: Vec<Outcome>,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            current_node: "",
            results: Vec::new(),
        }
    }

    pub fn current_node(&self) -> &'static str {
        self.current_node
    }

    pub fn results(&self) -> &[Outcome] {
        &self.results
    }
}

/// Implemented (mostly by the `#[machine]` macro; the last four methods by
/// hand, per the struct-field convention documented on the macro) by every
/// concrete machine type. Provides the default helper API node bodies use
/// to build their `Transition`.
pub trait Machine: Sized {
    /// The machine's own name, used to qualify `Outcome`s.
    fn type_name() -> &'static str;

    /// The validated, compile-time design contract for this machine.
    fn metadata() -> &'static MachineMetadata<Self>;

    fn runtime(&self) -> &Runtime;
    fn runtime_mut(&mut self) -> &mut Runtime;

    /// Prefixed onto every failure/exception message so the message
    /// identifies the pipeline context (e.g. `"[nightly-backup]"`).
    fn failure_prefix(&self) -> &str;

    fn logger(&self) -> &dyn Logger;

    fn qualified(&self, node: &'static str) -> QualifiedName {
        QualifiedName::new(Self::type_name(), node)
    }

    /// Build a `Success` transition to `exit_to`.
    ///
    /// # Panics
    ///
    /// Panics if `exit_to` does not name a node on this machine. This is
    /// a programmer error the compile-time validator should already have
    /// ruled out for any edge reachable from a `#[node]` declaration.
    fn success(&self, exit_to: &'static str) -> Transition {
        self.assert_known_node(exit_to);
        let current = self.runtime().current_node();
        Transition::step(Outcome::success(self.qualified(current)), exit_to)
    }

    /// Build a `Failure` transition to `exit_to`, logging the message at
    /// `error` level.
    ///
    /// # Panics
    ///
    /// Same as `success`.
    fn failure(&self, exit_to: &'static str, message: impl Into<String>) -> Transition {
        self.assert_known_node(exit_to);
        let current = self.runtime().current_node();
        let full_message = format!("{} {}", self.failure_prefix(), message.into());
        self.logger().error(&full_message);
        Transition::step(
            Outcome::failure(self.qualified(current), full_message),
            exit_to,
        )
    }

    /// Like `failure`, but for an unexpected error caught by the exception
    /// barrier: logs the error and a debug-level detail line (the nearest
    /// stand-in for a stack trace without unstable backtrace capture).
    fn exception(&self, exit_to: &'static str, error: &NodeError) -> Transition {
        self.assert_known_node(exit_to);
        let current = self.runtime().current_node();
        let full_message = format!(
            "{} unrecognized exception: {error}",
            self.failure_prefix()
        );
        self.logger().error(&full_message);
        self.logger().debug(&format!("{error:?}"));
        Transition::step(
            Outcome::failure(self.qualified(current), full_message),
            exit_to,
        )
    }

    /// Build the terminal `Transition`.
    fn exit(&self) -> Transition {
        let current = self.runtime().current_node();
        Transition::exit(Outcome::success(self.qualified(current)))
    }

    fn assert_known_node(&self, name: &'static str) {
        assert!(
            Self::metadata().node(name).is_some(),
            "{} is not a node of {}",
            name,
            Self::type_name()
        );
    }
}

/// Control-plane errors the driver can raise. Never reported as a
/// `Failure` `Outcome`. These abort `Driver::run` entirely.
#[derive(Debug)]
pub enum DriverError {
    /// The current node's `Transition` named a node the current node does
    /// not declare as an exit, or sent a `Success` down an unhappy edge
    /// (or a `Failure` down a happy one).
    IllegalTransition {
        from: &'static str,
        to: &'static str,
        reason: &'static str,
    },
    /// A non-terminal node returned an exit `Transition`.
    NotTerminal { node: &'static str },
    /// A `no_exceptions` node's body returned an error.
    Unhandled {
        node: &'static str,
        source: NodeError,
    },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalTransition { from, to, reason } => {
                write!(f, "illegal transition {from} -> {to}: {reason}")
            }
            Self::NotTerminal { node } => {
                write!(f, "node {node} returned Exit but declares outgoing edges")
            }
            Self::Unhandled { node, source } => {
                write!(f, "node {node} raised an unhandled error: {source}")
            }
        }
    }
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Unhandled { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The execution engine. Stateless; `run` drives one machine instance from
/// its entry node to an `Exit`, or aborts with a [`DriverError`].
pub struct Driver;

impl Driver {
    /// Runs `machine` to completion, starting at its entry node and
    /// following `Transition`s until one names no next node.
    pub fn run<M: Machine>(machine: &mut M) -> Result<Vec<Outcome>, DriverError> {
        let metadata = M::metadata();
        let entry = metadata
            .entry_node()
            .expect("a constructed machine always has exactly one entry node");

        machine.runtime_mut().current_node = entry.name;
        let mut previous = entry;
        let machine_start = Instant::now();
        machine
            .logger()
            .info(&format!("{} started", M::type_name()));

        loop {
            let node_start = Instant::now();
            machine
                .logger()
                .debug(&format!("start {}.{}", M::type_name(), previous.name));

            let outcome = (previous.run)(machine);

            let elapsed = node_elapsed(node_start);
            machine.logger().debug(&format!(
                "completed {}.{} runtime={elapsed:?}",
                M::type_name(),
                previous.name
            ));

            let transition = outcome.map_err(|source| DriverError::Unhandled {
                node: previous.name,
                source,
            })?;

            match transition.next() {
                None => {
                    if previous.has_exit() {
                        return Err(DriverError::NotTerminal { node: previous.name });
                    }
                    machine.runtime_mut().results.push(transition.result().clone());
                    break;
                }
                Some(next_name) => {
                    let next = metadata.node(next_name).ok_or(DriverError::IllegalTransition {
                        from: previous.name,
                        to: next_name,
                        reason: "not a defined node on this machine",
                    })?;

                    if !previous.exits().any(|e| e == next_name) {
                        return Err(DriverError::IllegalTransition {
                            from: previous.name,
                            to: next_name,
                            reason: "not a declared exit of the previous node",
                        });
                    }
                    match transition.result() {
                        Outcome::Failure { .. } if !previous.unhappy_paths.iter().any(|p| *p == next_name) => {
                            return Err(DriverError::IllegalTransition {
                                from: previous.name,
                                to: next_name,
                                reason: "a Failure result followed a happy edge",
                            });
                        }
                        Outcome::Success(_) if !previous.happy_paths.iter().any(|p| *p == next_name) => {
                            return Err(DriverError::IllegalTransition {
                                from: previous.name,
                                to: next_name,
                                reason: "a Success result followed an unhappy edge",
                            });
                        }
                        _ => {}
                    }

                    machine.runtime_mut().results.push(transition.result().clone());
                    machine.runtime_mut().current_node = next_name;
                    previous = next;
                }
            }
        }

        machine.logger().info(&format!(
            "{} completed runtime={:?}",
            M::type_name(),
            node_elapsed(machine_start)
        ));

        Ok(std::mem::take(&mut machine.runtime_mut().results))
    }
}

fn node_elapsed(start: Instant) -> Duration {
    start.elapsed()
}
