//! Code generation for `#[machine]`.
//!
//! Generated code references the facade crate's re-exported `core` module
//! (`::backup_machines::core::...`) rather than `backup-machines-core`
//! directly, so a pipeline crate only needs to depend on `backup-machines`.

use proc_macro2::{Ident, TokenStream as TokenStream2};
use quote::quote;
use syn::Block;

use crate::types::{ExceptionPolicy, MachineDef, NodeDef};

fn core_path() -> TokenStream2 {
    quote!(::backup_machines::core)
}

impl MachineDef {
    pub fn expand(&self) -> syn::Result<TokenStream2> {
        self.validate()?;

        let core = core_path();
        let self_ty = &self.self_ty_name;
        let type_name_str = self_ty.to_string();
        let overview = &self.attr.overview;
        let todo = match &self.attr.todo {
            Some(t) => quote! { ::core::option::Option::Some(#t) },
            None => quote! { ::core::option::Option::None },
        };

        let methods: Vec<TokenStream2> = self.nodes.iter().map(rewrite_node_method).collect();
        let entries: Vec<TokenStream2> = self
            .nodes
            .iter()
            .map(|node| node_metadata_entry(self_ty, node))
            .collect();
        let other_items = &self.other_items;

        Ok(quote! {
            impl #self_ty {
                #( #methods )*
                #( #other_items )*

                /// This machine's own name, used to qualify every `Outcome`
                /// it produces.
                pub const TYPE_NAME: &'static str = #type_name_str;

                /// The validated, compile-time design contract for this
                /// machine.
                pub fn metadata() -> &'static #core::MachineMetadata<Self> {
                    static NODE_METADATA: ::std::sync::OnceLock<#core::MachineMetadata<#self_ty>> =
                        ::std::sync::OnceLock::new();
                    NODE_METADATA.get_or_init(|| #core::MachineMetadata {
                        overview: #overview,
                        todo: #todo,
                        nodes: &[ #( #entries ),* ],
                    })
                }
            }
        })
    }
}

fn rewrite_node_method(node: &NodeDef) -> TokenStream2 {
    let core = core_path();
    let mut method = node.method.clone();

    if let ExceptionPolicy::Handle(target) = &node.exceptions {
        let target_str = target.to_string();
        let original_block = &method.block;
        method.block = wrap_with_exception_barrier(original_block, &target_str, &core);
    }

    quote! { #method }
}

/// Turn the node's body into a one-shot closure and route any error it
/// returns through `Machine::exception` instead of letting it propagate.
/// The closure captures `self` by reference rather than declaring it as a
/// parameter, since `self` can't be re-bound as an ordinary identifier.
fn wrap_with_exception_barrier(
    body: &Block,
    exit_to: &str,
    core: &TokenStream2,
) -> Box<Block> {
    let block: Block = syn::parse_quote! {
        {
            let __outcome: #core::NodeOutcome = (|| -> #core::NodeOutcome #body)();
            match __outcome {
                ::core::result::Result::Ok(transition) => ::core::result::Result::Ok(transition),
                ::core::result::Result::Err(error) => ::core::result::Result::Ok(
                    <Self as #core::Machine>::exception(self, #exit_to, &error)
                ),
            }
        }
    };
    Box::new(block)
}

fn node_metadata_entry(self_ty: &Ident, node: &NodeDef) -> TokenStream2 {
    let core = core_path();
    let name = node.ident.to_string();
    let overview = &node.attr.overview;
    let is_entry = node.attr.is_entry;
    let is_terminal = node.attr.is_terminal;
    let happy_paths: Vec<String> = node.attr.happy_paths.iter().map(ToString::to_string).collect();
    let unhappy_paths: Vec<String> = node
        .attr
        .unhappy_paths
        .iter()
        .map(ToString::to_string)
        .collect();
    let invokes_machine = match &node.attr.invokes_machine {
        Some(m) => quote! { ::core::option::Option::Some(#m) },
        None => quote! { ::core::option::Option::None },
    };
    let (handles_exceptions, on_exception) = match &node.exceptions {
        ExceptionPolicy::None => (false, quote! { ::core::option::Option::None }),
        ExceptionPolicy::Handle(target) => {
            let target_str = target.to_string();
            (true, quote! { ::core::option::Option::Some(#target_str) })
        }
    };
    let ident = &node.ident;

    quote! {
        #core::NodeMetadata {
            name: #name,
            overview: #overview,
            is_entry: #is_entry,
            is_terminal: #is_terminal,
            happy_paths: &[ #( #happy_paths ),* ],
            unhappy_paths: &[ #( #unhappy_paths ),* ],
            invokes_machine: #invokes_machine,
            handles_exceptions: #handles_exceptions,
            on_exception: #on_exception,
            run: #self_ty::#ident,
        }
    }
}
