//! Parsing logic for `#[machine(...)]` and the `#[node(...)]` /
//! `#[handle_exceptions(...)]` / `#[no_exceptions]` attributes nested
//! inside it.
//!
//! These never become real, independently-registered proc-macro
//! attributes: `#[machine]` receives the whole `impl` block, including
//! every still-unexpanded attribute on every method inside it, as one
//! token tree, parses the node attributes itself, and strips them from its
//! own output. The compiler never sees `#[node]`/`#[handle_exceptions]`/
//! `#[no_exceptions]` as attributes needing their own resolution.

use proc_macro2::Span;
use syn::{
    Ident, ImplItem, ItemImpl, LitBool, LitStr, Token, Type,
    parenthesized,
    parse::{Parse, ParseStream},
};

use crate::types::{ExceptionPolicy, MachineAttr, MachineDef, NodeAttr, NodeDef};

impl Parse for MachineAttr {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let mut overview = None;
        let mut todo = None;

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            match key.to_string().as_str() {
                "overview" => overview = Some(input.parse::<LitStr>()?.value()),
                "todo" => todo = Some(input.parse::<LitStr>()?.value()),
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unexpected key `{other}` in #[machine(...)]"),
                    ));
                }
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(MachineAttr {
            overview: overview.ok_or_else(|| {
                syn::Error::new(
                    Span::call_site(),
                    "#[machine(...)] is missing its required `overview`",
                )
            })?,
            todo,
        })
    }
}

impl Parse for NodeAttr {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let mut overview = None;
        let mut is_entry = false;
        let mut is_terminal = false;
        let mut happy_paths = Vec::new();
        let mut unhappy_paths = Vec::new();
        let mut invokes_machine = None;

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            match key.to_string().as_str() {
                "overview" => {
                    input.parse::<Token![=]>()?;
                    overview = Some(input.parse::<LitStr>()?.value());
                }
                "invokes_machine" => {
                    input.parse::<Token![=]>()?;
                    invokes_machine = Some(input.parse::<LitStr>()?.value());
                }
                "is_entry" => is_entry = parse_bool_flag(input)?,
                "is_terminal" => is_terminal = parse_bool_flag(input)?,
                "happy_paths" => happy_paths = parse_ident_list(input)?,
                "unhappy_paths" => unhappy_paths = parse_ident_list(input)?,
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unexpected key `{other}` in #[node(...)]"),
                    ));
                }
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(NodeAttr {
            overview: overview.ok_or_else(|| {
                syn::Error::new(
                    Span::call_site(),
                    "#[node(...)] is missing its required `overview`",
                )
            })?,
            is_entry,
            is_terminal,
            happy_paths,
            unhappy_paths,
            invokes_machine,
        })
    }
}

/// `is_entry` / `is_terminal` accept either a bare flag (`is_entry`) or an
/// explicit `is_entry = true`.
fn parse_bool_flag(input: ParseStream<'_>) -> syn::Result<bool> {
    if input.peek(Token![=]) {
        input.parse::<Token![=]>()?;
        Ok(input.parse::<LitBool>()?.value())
    } else {
        Ok(true)
    }
}

fn parse_ident_list(input: ParseStream<'_>) -> syn::Result<Vec<Ident>> {
    let content;
    parenthesized!(content in input);
    let mut idents = Vec::new();
    while !content.is_empty() {
        idents.push(content.parse()?);
        if content.peek(Token![,]) {
            content.parse::<Token![,]>()?;
        }
    }
    Ok(idents)
}

struct HandleExceptionsArgs {
    on_exception: Ident,
}

impl Parse for HandleExceptionsArgs {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let key: Ident = input.parse()?;
        if key != "on_exception" {
            return Err(syn::Error::new(
                key.span(),
                "expected `on_exception = <node name>` in #[handle_exceptions(...)]",
            ));
        }
        input.parse::<Token![=]>()?;
        Ok(Self {
            on_exception: input.parse()?,
        })
    }
}

/// Pull the node's exception-handling decoration off `attrs`, leaving
/// every other attribute untouched. Exactly one of `handle_exceptions`/
/// `no_exceptions` must be present.
fn take_exception_policy(
    node_name: &Ident,
    attrs: &mut Vec<syn::Attribute>,
) -> syn::Result<ExceptionPolicy> {
    let mut found = None;
    let mut kept = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if attr.path().is_ident("handle_exceptions") {
            if found.is_some() {
                return Err(syn::Error::new_spanned(
                    &attr,
                    "a node may declare only one of handle_exceptions/no_exceptions",
                ));
            }
            let args: HandleExceptionsArgs = attr.parse_args()?;
            found = Some(ExceptionPolicy::Handle(args.on_exception));
        } else if attr.path().is_ident("no_exceptions") {
            if found.is_some() {
                return Err(syn::Error::new_spanned(
                    &attr,
                    "a node may declare only one of handle_exceptions/no_exceptions",
                ));
            }
            found = Some(ExceptionPolicy::None);
        } else {
            kept.push(attr);
        }
    }

    *attrs = kept;
    found.ok_or_else(|| {
        syn::Error::new_spanned(
            node_name,
            format!(
                "node `{node_name}` declares neither #[handle_exceptions(...)] nor #[no_exceptions]"
            ),
        )
    })
}

/// Pull the `#[node(...)]` attribute off `attrs`. Returns `None` if the
/// method isn't decorated as a node at all (it's a plain helper method).
fn take_node_attr(attrs: &mut Vec<syn::Attribute>) -> syn::Result<Option<NodeAttr>> {
    let mut found = None;
    let mut kept = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if attr.path().is_ident("node") {
            if found.is_some() {
                return Err(syn::Error::new_spanned(&attr, "duplicate #[node(...)]"));
            }
            found = Some(attr.parse_args::<NodeAttr>()?);
        } else {
            kept.push(attr);
        }
    }

    *attrs = kept;
    Ok(found)
}

fn self_type_name(self_ty: &Type) -> syn::Result<Ident> {
    match self_ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.clone())
            .ok_or_else(|| syn::Error::new_spanned(path, "#[machine] requires a named Self type")),
        other => Err(syn::Error::new_spanned(
            other,
            "#[machine] requires a named Self type",
        )),
    }
}

/// Parse the whole `impl` block `#[machine(...)]` is attached to.
pub fn parse_machine_impl(
    attr: proc_macro2::TokenStream,
    item: proc_macro2::TokenStream,
) -> syn::Result<MachineDef> {
    let machine_attr: MachineAttr = syn::parse2(attr)?;
    let mut item_impl: ItemImpl = syn::parse2(item)?;

    let self_ty_name = self_type_name(&item_impl.self_ty)?;

    let mut nodes = Vec::new();
    let mut other_items = Vec::new();

    for item in item_impl.items.drain(..) {
        match item {
            ImplItem::Fn(mut method) => {
                let Some(node_attr) = take_node_attr(&mut method.attrs)? else {
                    other_items.push(ImplItem::Fn(method));
                    continue;
                };
                let exceptions = take_exception_policy(&method.sig.ident, &mut method.attrs)?;
                nodes.push(NodeDef {
                    ident: method.sig.ident.clone(),
                    attr: node_attr,
                    exceptions,
                    method,
                });
            }
            other => other_items.push(other),
        }
    }

    Ok(MachineDef {
        self_ty_name,
        attr: machine_attr,
        nodes,
        other_items,
    })
}
