//! Data structures the `#[machine]` macro builds while walking an `impl`
//! block, before any code is generated or the graph is validated.

use syn::{Ident, ImplItemFn};

/// Parsed arguments of `#[machine(overview = "...", todo = "...")]`.
pub struct MachineAttr {
    pub overview: String,
    pub todo: Option<String>,
}

/// Parsed arguments of a single method's `#[node(...)]` attribute.
pub struct NodeAttr {
    pub overview: String,
    pub is_entry: bool,
    pub is_terminal: bool,
    pub happy_paths: Vec<Ident>,
    pub unhappy_paths: Vec<Ident>,
    pub invokes_machine: Option<String>,
}

/// A node's exception-handling policy. Exactly one of these is required
/// per node.
pub enum ExceptionPolicy {
    /// `#[no_exceptions]`: an error out of the body is left to propagate.
    None,
    /// `#[handle_exceptions(on_exception = <name>)]`: an error out of the
    /// body is caught and routed to `<name>`, which must be one of the
    /// node's own `unhappy_paths`.
    Handle(Ident),
}

/// One node method, fully parsed: its own design contract plus its (not
/// yet rewritten) body.
pub struct NodeDef {
    pub ident: Ident,
    pub attr: NodeAttr,
    pub exceptions: ExceptionPolicy,
    pub method: ImplItemFn,
}

/// The whole `impl` block the `#[machine]` attribute is attached to.
pub struct MachineDef {
    pub self_ty_name: Ident,
    pub attr: MachineAttr,
    pub nodes: Vec<NodeDef>,
    /// Items in the impl block that are not `#[node]` methods (helper
    /// methods, constants, etc.), passed through unchanged.
    pub other_items: Vec<syn::ImplItem>,
}
