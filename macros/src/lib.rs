mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a new documentation function for the route, named after the original function with the suffix `_docs`.
///
/// The first line of the doc comment becomes the operation summary and the
/// remaining lines its description.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates two new structs: `CreateX` and `UpdateX` for the model `X`.
///
/// Fields with `#[serde(skip_deserializing)]` or `#[serde(skip)]` are left out of both.
/// Every other field is copied with its `doc`, `serde`, `validate` and `schemars`
/// attributes; database-only attributes such as `#[sqlx(..)]` and `derive(FromRow)`
/// are dropped.
///
/// Fields accept a `#[model(..)]` attribute:
///
/// - `immutable`: the field is left out of the update input.
/// - `default` / `default = "path"`: the field may be omitted from the create input.
#[proc_macro_attribute]
pub fn model(_args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(input)
}
