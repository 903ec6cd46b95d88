mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a new documentation function for the route, named after the original function with the suffix `_docs`.
///
/// The first line of the doc comment becomes the summary, the remaining lines the description.
/// `redirect = "..."` documents the `303 See Other` answer of form submissions.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates a `XForm` struct holding the user-editable fields of the model, plus a
/// `From<&X>` implementation that prefills the form from an existing row.
///
/// Fields with #[serde(skip_deserializing)] or #[serde(skip)] are left out, all
/// other fields are included verbatim (including attributes).
#[proc_macro_attribute]
pub fn model(_args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(input)
}
