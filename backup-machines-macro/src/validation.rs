//! Bridges a parsed [`MachineDef`] to `backup_machines_core::spec::validate`,
//! the same pure validator exercised directly in that crate's unit tests,
//! and turns any rejection into a `syn::Error` pointing at the offending
//! node so the graph is malformed as a compile error, not a runtime panic.

use backup_machines_core::spec::{self, MachineSpec, NodeSpec, ValidationError};
use syn::spanned::Spanned;

use crate::types::{ExceptionPolicy, MachineDef};

impl MachineDef {
    pub fn to_spec(&self) -> MachineSpec {
        MachineSpec {
            overview: self.attr.overview.clone(),
            todo: self.attr.todo.clone(),
            nodes: self.nodes.iter().map(node_spec).collect(),
        }
    }

    pub fn validate(&self) -> syn::Result<()> {
        let spec = self.to_spec();
        spec::validate(&spec).map_err(|err| self.spanned_error(err))
    }

    fn spanned_error(&self, err: ValidationError) -> syn::Error {
        let node_name = match &err {
            ValidationError::MissingNodeOverviewError { node }
            | ValidationError::OverrideError { node }
            | ValidationError::UndefinedNodeError { node, .. }
            | ValidationError::UnreachableNodeError { node }
            | ValidationError::NotTerminalNodeError { node }
            | ValidationError::NoExceptionHandlingError { node }
            | ValidationError::IllegalTransitionError { node, .. } => Some(node.as_str()),
            ValidationError::MissingOverviewError
            | ValidationError::NoEntryNodeError
            | ValidationError::NoTerminalNodeError => None,
            ValidationError::MultipleEntryNodeError { nodes } => {
                nodes.first().map(String::as_str)
            }
        };

        let span = node_name
            .and_then(|name| self.nodes.iter().find(|n| n.ident == name))
            .map(|n| n.ident.span())
            .unwrap_or_else(proc_macro2::Span::call_site);

        syn::Error::new(span, err.to_string())
    }
}

fn node_spec(node: &crate::types::NodeDef) -> NodeSpec {
    let (handles_exceptions, on_exception) = match &node.exceptions {
        ExceptionPolicy::None => (false, None),
        ExceptionPolicy::Handle(target) => (true, Some(target.to_string())),
    };

    NodeSpec {
        name: node.ident.to_string(),
        overview: node.attr.overview.clone(),
        is_entry: node.attr.is_entry,
        is_terminal: node.attr.is_terminal,
        happy_paths: node.attr.happy_paths.iter().map(ToString::to_string).collect(),
        unhappy_paths: node
            .attr
            .unhappy_paths
            .iter()
            .map(ToString::to_string)
            .collect(),
        invokes_machine: node.attr.invokes_machine.clone(),
        handles_exceptions,
        on_exception,
    }
}
