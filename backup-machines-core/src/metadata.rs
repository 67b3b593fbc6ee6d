//! Class-level (in our case: `'static`, compile-time-constant) metadata
//! attached to every node and machine by the `#[machine]` attribute macro.
//!
//! This is runtime data, plain structs plus function pointers, not a base
//! class, following a "polymorphism without inheritance" design: a
//! machine is concrete data, and dispatch to a node is a direct call
//! through `NodeMetadata::run`, not a virtual method lookup.

use crate::driver::NodeOutcome;

/// Names a concrete machine may not use for one of its nodes, because
/// `Machine` or the `#[machine]` macro's own generated items already use
/// them.
pub const RESERVED_NAMES: &[&str] = &[
    "type_name",
    "metadata",
    "runtime",
    "runtime_mut",
    "failure_prefix",
    "logger",
    "qualified",
    "success",
    "failure",
    "exception",
    "exit",
    "assert_known_node",
];

/// The per-node design contract, recorded once at compile time and never
/// mutated afterward.
pub struct NodeMetadata<M: 'static> {
    pub name: &'static str,
    pub overview: &'static str,
    pub is_entry: bool,
    pub is_terminal: bool,
    pub happy_paths: &'static [&'static str],
    pub unhappy_paths: &'static [&'static str],
    pub invokes_machine: Option<&'static str>,
    pub handles_exceptions: bool,
    pub on_exception: Option<&'static str>,
    /// The node's body. Already wrapped in the exception barrier if
    /// `handles_exceptions` is set. See `crate::driver::Machine`.
    pub run: fn(&mut M) -> NodeOutcome,
}

impl<M: 'static> NodeMetadata<M> {
    /// The union of `happy_paths` and `unhappy_paths`.
    pub fn exits(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.happy_paths.iter().copied().chain(self.unhappy_paths.iter().copied())
    }

    pub fn has_exit(&self) -> bool {
        !self.happy_paths.is_empty() || !self.unhappy_paths.is_empty()
    }
}

/// Class-level collection of all of a machine's nodes, plus the machine's
/// own overview/todo free text.
pub struct MachineMetadata<M: 'static> {
    pub overview: &'static str,
    pub todo: Option<&'static str>,
    pub nodes: &'static [NodeMetadata<M>],
}

impl<M: 'static> MachineMetadata<M> {
    pub fn node(&self, name: &str) -> Option<&NodeMetadata<M>> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn entry_nodes(&self) -> impl Iterator<Item = &NodeMetadata<M>> {
        self.nodes.iter().filter(|n| n.is_entry)
    }

    pub fn terminal_nodes(&self) -> impl Iterator<Item = &NodeMetadata<M>> {
        self.nodes.iter().filter(|n| n.is_terminal)
    }

    /// The sole entry node. Assumes the graph was already validated (the
    /// `#[machine]` macro refuses to compile a machine without exactly
    /// one), so this never returns `None` for a machine that built.
    pub fn entry_node(&self) -> Option<&NodeMetadata<M>> {
        let mut entries = self.entry_nodes();
        let first = entries.next()?;
        if entries.next().is_some() {
            return None;
        }
        Some(first)
    }
}
