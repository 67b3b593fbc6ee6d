//! The `#[machine]` attribute macro.
//!
//! `#[machine(overview = "...")]` is attached to an `impl` block and
//! consumes it whole, including every node method's still-unexpanded
//! `#[node(...)]` / `#[handle_exceptions(...)]` / `#[no_exceptions]`
//! attribute. Those never exist as independently-registered proc-macro
//! attributes. The compiler only ever resolves `#[machine]` itself; this
//! crate parses and strips the rest before the resulting tokens go back to
//! the compiler.
//!
//! ```ignore
//! #[machine(overview = "Archives and encrypts a file.")]
//! impl ArchiveEncrypt {
//!     #[node(overview = "Entry point.", is_entry, happy_paths(copy_to_staging))]
//!     #[no_exceptions]
//!     fn ensure_staging(&mut self) -> NodeOutcome {
//!         // ...
//!         Ok(self.success("copy_to_staging"))
//!     }
//! }
//! ```

mod codegen;
mod parser;
mod types;
mod validation;

use proc_macro::TokenStream;

#[proc_macro_attribute]
pub fn machine(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr2 = proc_macro2::TokenStream::from(attr);
    let item2 = proc_macro2::TokenStream::from(item);

    let expanded = parser::parse_machine_impl(attr2, item2).and_then(|def| def.expand());

    match expanded {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
