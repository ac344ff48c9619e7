use proc_macro2::{TokenStream, TokenTree};
use quote::{format_ident, quote, ToTokens};
use syn::{punctuated::Punctuated, Attribute, Data, DeriveInput, Fields, Meta, Path, Token};

/// Attributes copied from the model onto the generated inputs.
const FORWARDED: &[&str] = &["doc", "serde", "validate", "schemars"];

/// Derives that only make sense on a stored row.
const ROW_ONLY_DERIVES: &[&str] = &["FromRow"];

#[derive(Default)]
enum FieldDefault {
	#[default]
	Required,
	Inherit,
	Path(syn::LitStr),
}

#[derive(Default)]
struct FieldOptions {
	immutable: bool,
	default: FieldDefault,
}

pub fn from_input(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let mut input = syn::parse_macro_input!(input as DeriveInput);

	match expand(&mut input) {
		Ok(tokens) => tokens.into(),
		Err(e) => e.into_compile_error().into(),
	}
}

fn expand(input: &mut DeriveInput) -> syn::Result<TokenStream> {
	let ident = input.ident.clone();
	let vis = input.vis.clone();
	let generics = input.generics.clone();
	let create_ident = format_ident!("Create{}", ident);
	let update_ident = format_ident!("Update{}", ident);
	let struct_attrs = struct_attrs(&input.attrs)?;

	let Data::Struct(data) = &mut input.data else {
		return Err(syn::Error::new(ident.span(), "#[model] only supports structs"));
	};

	let Fields::Named(fields) = &mut data.fields else {
		return Err(syn::Error::new(
			ident.span(),
			"#[model] requires a struct with named fields",
		));
	};

	let mut create_fields = Vec::new();
	let mut update_fields = Vec::new();

	for field in &mut fields.named {
		// `#[model(..)]` is not a real attribute, so it must not survive on the row struct
		let options = take_options(&mut field.attrs)?;

		if is_skipped(&field.attrs) {
			continue;
		}

		let ident = &field.ident;
		let ty = &field.ty;
		let vis = &field.vis;
		let attrs = field
			.attrs
			.iter()
			.filter(|attr| is_forwarded(attr))
			.collect::<Vec<_>>();

		let default = match &options.default {
			FieldDefault::Required => quote!(),
			FieldDefault::Inherit => quote!(#[serde(default)]),
			FieldDefault::Path(path) => quote!(#[serde(default = #path)]),
		};

		create_fields.push(quote! {
			#(#attrs)*
			#default
			#vis #ident: #ty,
		});

		if !options.immutable {
			update_fields.push(quote! {
				#(#attrs)*
				#vis #ident: Option<#ty>,
			});
		}
	}

	Ok(quote! {
		#input

		#(#struct_attrs)*
		#vis struct #create_ident #generics {
			#(
				#create_fields
			)*
		}

		#(#struct_attrs)*
		#vis struct #update_ident #generics {
			#(
				#update_fields
			)*
		}
	})
}

/// Returns the struct-level attributes of the inputs, with row-only derives removed.
fn struct_attrs(attrs: &[Attribute]) -> syn::Result<Vec<TokenStream>> {
	let mut output = Vec::new();

	for attr in attrs {
		if attr.path().is_ident("derive") {
			let paths = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?;
			let paths = paths
				.into_iter()
				.filter(|path| {
					path.segments
						.last()
						.map_or(true, |segment| !ROW_ONLY_DERIVES.iter().any(|name| segment.ident == name))
				})
				.collect::<Vec<_>>();

			if !paths.is_empty() {
				output.push(quote!(#[derive(#(#paths),*)]));
			}
		} else if is_forwarded(attr) {
			output.push(attr.to_token_stream());
		}
	}

	Ok(output)
}

fn is_forwarded(attr: &Attribute) -> bool {
	FORWARDED.iter().any(|name| attr.path().is_ident(name))
}

/// Skip fields with #[serde(skip_deserializing)] or #[serde(skip)]
fn is_skipped(attrs: &[Attribute]) -> bool {
	attrs.iter().any(|attr| {
		let Meta::List(ref list) = attr.meta else {
			return false;
		};

		if !list.path.is_ident("serde") {
			return false;
		}

		list.tokens.to_token_stream().into_iter().any(|token| {
			matches!(token, TokenTree::Ident(ref ident) if ident == "skip_deserializing" || ident == "skip")
		})
	})
}

fn take_options(attrs: &mut Vec<Attribute>) -> syn::Result<FieldOptions> {
	let mut options = FieldOptions::default();

	for attr in attrs.iter().filter(|attr| attr.path().is_ident("model")) {
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("immutable") {
				options.immutable = true;
				Ok(())
			} else if meta.path.is_ident("default") {
				options.default = if meta.input.peek(Token![=]) {
					FieldDefault::Path(meta.value()?.parse()?)
				} else {
					FieldDefault::Inherit
				};

				Ok(())
			} else {
				Err(meta.error("expected `immutable` or `default`"))
			}
		})?;
	}

	attrs.retain(|attr| !attr.path().is_ident("model"));

	Ok(options)
}
