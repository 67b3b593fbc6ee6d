//! The pure graph validator.
//!
//! [`validate`] consults only the data in a [`MachineSpec`]. It never
//! touches a machine instance, a logger, or any `'static` metadata, so it
//! can run both inside the `#[machine]` proc-macro (against the
//! still-unexpanded node attributes, turning a malformed graph into a
//! compile error) and directly in a unit test (against a hand-built
//! `MachineSpec`), with identical behavior.

use std::fmt;

use crate::metadata::RESERVED_NAMES;

/// Owned, compile-time view of one node's design contract. Mirrors
/// [`crate::metadata::NodeMetadata`] but without the `'static` function
/// pointer, since at the point this is built (macro expansion) there is no
/// function to point to yet, only its *name*.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: String,
    pub overview: String,
    pub is_entry: bool,
    pub is_terminal: bool,
    pub happy_paths: Vec<String>,
    pub unhappy_paths: Vec<String>,
    pub invokes_machine: Option<String>,
    pub handles_exceptions: bool,
    pub on_exception: Option<String>,
}

impl NodeSpec {
    pub fn exits(&self) -> impl Iterator<Item = &str> {
        self.happy_paths
            .iter()
            .map(String::as_str)
            .chain(self.unhappy_paths.iter().map(String::as_str))
    }
}

/// Owned, compile-time view of a whole machine's design contract.
#[derive(Debug, Clone)]
pub struct MachineSpec {
    pub overview: String,
    pub todo: Option<String>,
    pub nodes: Vec<NodeSpec>,
}

/// Every way [`validate`] can reject a [`MachineSpec`]. Each variant names
/// exactly one of the invariants in the data model: a malformed graph is a
/// control-plane error, never reported as a data-plane `Failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The machine's own overview text is empty.
    MissingOverviewError,
    /// A node's overview text is empty.
    MissingNodeOverviewError { node: String },
    /// A node's name collides with a name the generated code reserves.
    OverrideError { node: String },
    /// No node is marked `is_entry`.
    NoEntryNodeError,
    /// More than one node is marked `is_entry`.
    MultipleEntryNodeError { nodes: Vec<String> },
    /// No node is marked `is_terminal`.
    NoTerminalNodeError,
    /// A node's `exits` names a node that isn't defined on the machine.
    UndefinedNodeError { node: String, undefined: String },
    /// A non-entry node is not named in any other node's `exits`.
    UnreachableNodeError { node: String },
    /// A terminal node declares a non-empty `exits`.
    NotTerminalNodeError { node: String },
    /// A node declares neither `handle_exceptions` nor `no_exceptions`.
    NoExceptionHandlingError { node: String },
    /// A node's `on_exception` target is not in its own `unhappy_paths`.
    IllegalTransitionError { node: String, on_exception: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOverviewError => write!(f, "machine has no overview"),
            Self::MissingNodeOverviewError { node } => {
                write!(f, "node `{node}` has no overview")
            }
            Self::OverrideError { node } => {
                write!(f, "node `{node}` shadows a reserved name")
            }
            Self::NoEntryNodeError => write!(f, "machine has no entry node"),
            Self::MultipleEntryNodeError { nodes } => {
                write!(f, "machine has more than one entry node: {nodes:?}")
            }
            Self::NoTerminalNodeError => write!(f, "machine has no terminal node"),
            Self::UndefinedNodeError { node, undefined } => {
                write!(f, "node `{node}` references undefined node `{undefined}`")
            }
            Self::UnreachableNodeError { node } => {
                write!(f, "node `{node}` is unreachable")
            }
            Self::NotTerminalNodeError { node } => {
                write!(f, "terminal node `{node}` declares outgoing edges")
            }
            Self::NoExceptionHandlingError { node } => {
                write!(
                    f,
                    "node `{node}` declares neither handle_exceptions nor no_exceptions"
                )
            }
            Self::IllegalTransitionError { node, on_exception } => {
                write!(
                    f,
                    "node `{node}` handles exceptions to `{on_exception}`, which is not one of its unhappy_paths"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check every structural invariant of a machine's design against `spec`.
/// Pure: consults only `spec`, never panics, never touches I/O.
pub fn validate(spec: &MachineSpec) -> Result<(), ValidationError> {
    if spec.overview.trim().is_empty() {
        return Err(ValidationError::MissingOverviewError);
    }

    for node in &spec.nodes {
        if node.overview.trim().is_empty() {
            return Err(ValidationError::MissingNodeOverviewError {
                node: node.name.clone(),
            });
        }
        if RESERVED_NAMES.contains(&node.name.as_str()) {
            return Err(ValidationError::OverrideError {
                node: node.name.clone(),
            });
        }
    }

    let entries: Vec<&NodeSpec> = spec.nodes.iter().filter(|n| n.is_entry).collect();
    if entries.is_empty() {
        return Err(ValidationError::NoEntryNodeError);
    }
    if entries.len() > 1 {
        return Err(ValidationError::MultipleEntryNodeError {
            nodes: entries.iter().map(|n| n.name.clone()).collect(),
        });
    }

    if !spec.nodes.iter().any(|n| n.is_terminal) {
        return Err(ValidationError::NoTerminalNodeError);
    }

    // Every exit must resolve to a defined node.
    for node in &spec.nodes {
        for exit in node.exits() {
            if !spec.nodes.iter().any(|n| n.name == exit) {
                return Err(ValidationError::UndefinedNodeError {
                    node: node.name.clone(),
                    undefined: exit.into(),
                });
            }
        }
    }

    // Every non-entry node must be named in some other node's exits.
    for node in &spec.nodes {
        if node.is_entry {
            continue;
        }
        let reachable = spec
            .nodes
            .iter()
            .any(|other| other.exits().any(|exit| exit == node.name));
        if !reachable {
            return Err(ValidationError::UnreachableNodeError {
                node: node.name.clone(),
            });
        }
    }

    // Every terminal node must have no exits.
    for node in &spec.nodes {
        if node.is_terminal && (node.happy_paths.len() + node.unhappy_paths.len()) > 0 {
            return Err(ValidationError::NotTerminalNodeError {
                node: node.name.clone(),
            });
        }
    }

    // Every node declares an exception policy, and a declared handler's
    // target must be one of its own unhappy_paths.
    for node in &spec.nodes {
        match &node.on_exception {
            Some(target) if node.handles_exceptions => {
                if !node.unhappy_paths.iter().any(|p| p == target) {
                    return Err(ValidationError::IllegalTransitionError {
                        node: node.name.clone(),
                        on_exception: target.clone(),
                    });
                }
            }
            None if node.handles_exceptions => {
                return Err(ValidationError::NoExceptionHandlingError {
                    node: node.name.clone(),
                });
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> NodeSpec {
        NodeSpec {
            name: name.to_string(),
            overview: "does a thing".to_string(),
            is_entry: false,
            is_terminal: false,
            happy_paths: Vec::new(),
            unhappy_paths: Vec::new(),
            invokes_machine: None,
            handles_exceptions: false,
            on_exception: None,
        }
    }

    fn three_node_machine() -> MachineSpec {
        let mut entry = node("start");
        entry.is_entry = true;
        entry.happy_paths = vec!["finish".to_string()];

        let mut finish = node("finish");
        finish.is_terminal = true;

        MachineSpec {
            overview: "a tiny machine".to_string(),
            todo: None,
            nodes: vec![entry, finish],
        }
    }

    #[test]
    fn accepts_a_well_formed_two_node_machine() {
        assert_eq!(validate(&three_node_machine()), Ok(()));
    }

    #[test]
    fn rejects_missing_machine_overview() {
        let mut spec = three_node_machine();
        spec.overview = "   ".to_string();
        assert_eq!(validate(&spec), Err(ValidationError::MissingOverviewError));
    }

    #[test]
    fn rejects_zero_entry_nodes() {
        let mut spec = three_node_machine();
        spec.nodes[0].is_entry = false;
        // start is now unreachable too, but NoEntryNodeError is checked first.
        assert_eq!(validate(&spec), Err(ValidationError::NoEntryNodeError));
    }

    #[test]
    fn rejects_multiple_entry_nodes() {
        let mut spec = three_node_machine();
        spec.nodes[1].is_entry = true;
        spec.nodes[1].is_terminal = false;
        spec.nodes.push({
            let mut terminal = node("report");
            terminal.is_terminal = true;
            terminal
        });
        spec.nodes[0].happy_paths = vec!["report".to_string()];
        spec.nodes[1].happy_paths = vec!["report".to_string()];
        match validate(&spec) {
            Err(ValidationError::MultipleEntryNodeError { nodes }) => {
                assert_eq!(nodes.len(), 2);
            }
            other => panic!("expected MultipleEntryNodeError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_machine_with_no_terminal_node() {
        let mut spec = three_node_machine();
        spec.nodes[1].is_terminal = false;
        spec.nodes[0].happy_paths.clear();
        assert_eq!(validate(&spec), Err(ValidationError::NoTerminalNodeError));
    }

    #[test]
    fn rejects_unreachable_node() {
        let mut spec = three_node_machine();
        spec.nodes.push(node("orphan"));
        assert_eq!(
            validate(&spec),
            Err(ValidationError::UnreachableNodeError {
                node: "orphan".to_string()
            })
        );
    }

    #[test]
    fn rejects_undefined_exit() {
        let mut spec = three_node_machine();
        spec.nodes[0].happy_paths = vec!["nowhere".to_string()];
        assert_eq!(
            validate(&spec),
            Err(ValidationError::UndefinedNodeError {
                node: "start".to_string(),
                undefined: "nowhere".to_string()
            })
        );
    }

    #[test]
    fn rejects_terminal_node_with_exits() {
        let mut spec = three_node_machine();
        spec.nodes[1].happy_paths = vec!["start".to_string()];
        assert_eq!(
            validate(&spec),
            Err(ValidationError::NotTerminalNodeError {
                node: "finish".to_string()
            })
        );
    }

    #[test]
    fn rejects_handler_target_outside_unhappy_paths() {
        let mut spec = three_node_machine();
        spec.nodes[0].handles_exceptions = true;
        spec.nodes[0].on_exception = Some("finish".to_string());
        // `finish` is a happy_path, not an unhappy_path: illegal.
        assert_eq!(
            validate(&spec),
            Err(ValidationError::IllegalTransitionError {
                node: "start".to_string(),
                on_exception: "finish".to_string()
            })
        );
    }

    #[test]
    fn accepts_handler_target_inside_unhappy_paths() {
        let mut spec = three_node_machine();
        spec.nodes[0].unhappy_paths = vec!["finish".to_string()];
        spec.nodes[0].handles_exceptions = true;
        spec.nodes[0].on_exception = Some("finish".to_string());
        assert_eq!(validate(&spec), Ok(()));
    }

    #[test]
    fn rejects_reserved_node_name() {
        let mut spec = three_node_machine();
        spec.nodes[0].name = "success".to_string();
        spec.nodes[0].happy_paths = vec!["finish".to_string()];
        assert_eq!(
            validate(&spec),
            Err(ValidationError::OverrideError {
                node: "success".to_string()
            })
        );
    }

    #[test]
    fn allows_a_node_to_name_the_same_unconditional_successor_on_both_edges() {
        // Cleanup nodes (like `remove_encrypted_file` in the archive-encrypt
        // pipeline) are allowed a single successor reachable on both
        // Success and Failure.
        let mut spec = three_node_machine();
        spec.nodes[0].unhappy_paths = vec!["finish".to_string()];
        assert_eq!(validate(&spec), Ok(()));
    }
}
