//! Derive macros for fluentsql
//!
//! Provides `#[derive(FromRecord)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_record;

/// Derive `FromRecord` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use fluentsql::FromRecord;
///
/// #[derive(Default, FromRecord)]
/// struct User {
///     id: i64,
///     #[fluentsql(column = "user_name")]
///     name: String,
///     score: Option<f64>,
///     #[fluentsql(skip)]
///     cached: Vec<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[fluentsql(column = "name")]` - Bind the field to a different column
/// - `#[fluentsql(skip)]` - Never assign the field; it keeps its `Default`
#[proc_macro_derive(FromRecord, attributes(fluentsql))]
pub fn derive_from_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
