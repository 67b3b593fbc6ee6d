//! The closed sum of outcomes a node can produce, and the `Transition` that
//! pairs an outcome with where the driver should go next.

use core::fmt;

/// `"<MachineTypeName>.<NodeName>"`, the fully-qualified name of the node
/// that produced an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    machine: &'static str,
    node: &'static str,
}

impl QualifiedName {
    pub const fn new(machine: &'static str, node: &'static str) -> Self {
        Self { machine, node }
    }

    pub const fn machine(&self) -> &'static str {
        self.machine
    }

    pub const fn node(&self) -> &'static str {
        self.node
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.machine, self.node)
    }
}

/// A tagged value recording what happened when a node ran. Immutable once
/// constructed; both variants carry the originating node's qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(QualifiedName),
    Failure { node: QualifiedName, message: String },
}

impl Outcome {
    pub fn success(node: QualifiedName) -> Self {
        Self::Success(node)
    }

    pub fn failure(node: QualifiedName, message: impl Into<String>) -> Self {
        Self::Failure {
            node,
            message: message.into(),
        }
    }

    pub const fn node(&self) -> &QualifiedName {
        match self {
            Self::Success(node) => node,
            Self::Failure { node, .. } => node,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(node) => write!(f, "{node}: success"),
            Self::Failure { node, message } => write!(f, "{node}: failure ({message})"),
        }
    }
}

/// The pair `(result, next-node-reference)` a node hands back to the driver.
/// `next == None` marks an [`Transition::exit`], termination of the machine.
///
/// Constructed only through the [`crate::driver::Machine`] helper methods
/// (`success`/`failure`/`exception`/`exit`), never directly by node bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub(crate) result: Outcome,
    pub(crate) next: Option<&'static str>,
}

impl Transition {
    /// A non-terminal step: `result` happened, the driver should move to
    /// the node named `next`.
    pub(crate) fn step(result: Outcome, next: &'static str) -> Self {
        Self {
            result,
            next: Some(next),
        }
    }

    /// A terminal step: the machine is finished.
    pub(crate) fn exit(result: Outcome) -> Self {
        Self { result, next: None }
    }

    pub const fn result(&self) -> &Outcome {
        &self.result
    }

    pub const fn next(&self) -> Option<&'static str> {
        self.next
    }

    pub const fn is_exit(&self) -> bool {
        self.next.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_formats_as_dotted_pair() {
        let name = QualifiedName::new("ArchiveEncryptMachine", "copy_to_staging");
        assert_eq!(name.to_string(), "ArchiveEncryptMachine.copy_to_staging");
    }

    #[test]
    fn outcome_node_accessor_covers_both_variants() {
        let name = QualifiedName::new("M", "n");
        assert_eq!(Outcome::success(name.clone()).node(), &name);
        assert_eq!(
            Outcome::failure(name.clone(), "boom").node(),
            &name
        );
    }

    #[test]
    fn exit_transition_has_no_next() {
        let t = Transition::exit(Outcome::success(QualifiedName::new("M", "n")));
        assert!(t.is_exit());
        assert_eq!(t.next(), None);
    }
}
