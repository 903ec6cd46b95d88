use darling::{ast, FromMeta};
use proc_macro::TokenStream;
use quote::{format_ident, quote};

#[derive(FromMeta)]
struct RouteArgs {
	#[darling(multiple)]
	tag: Vec<syn::Expr>,
	#[darling(multiple)]
	response: Vec<ResponseArgs>,
	/// Documents a `303 See Other` answer with the given description.
	redirect: Option<String>,
}

#[derive(FromMeta)]
struct ResponseArgs {
	status: syn::LitInt,
	shape: Option<syn::Type>,
	description: Option<String>,
}

pub fn from_input(args: TokenStream, input: TokenStream) -> TokenStream {
	let args = match ast::NestedMeta::parse_meta_list(args.into()) {
		Ok(x) => x,
		Err(e) => return e.into_compile_error().into(),
	};

	let args = match RouteArgs::from_list(&args) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let function = syn::parse_macro_input!(input as syn::ItemFn);
	let Some((summary, description)) = doc_comment(&function.attrs) else {
		return syn::Error::new_spanned(&function.sig.ident, "route is missing a doc comment summary")
			.into_compile_error()
			.into();
	};

	let fn_name = format_ident!("{}_docs", function.sig.ident);
	let fn_vis = &function.vis;

	let tags = args.tag.iter();
	let responses = args.response.into_iter().map(|response| {
		let status = response.status;
		let shape = response.shape.map_or_else(|| quote!(()), |x| quote!(#x));

		match response.description {
			Some(description) => quote! {
				.response_with::<#status, #shape, _>(|res| res.description(#description))
			},
			None => quote! {
				.response::<#status, #shape>()
			},
		}
	});

	let redirect = args.redirect.map(|description| {
		quote! {
			.response_with::<303, (), _>(|res| res.description(#description))
		}
	});

	let description = description.map(|description| quote!(.description(#description)));

	quote! {
		#function

		#fn_vis fn #fn_name(op: aide::transform::TransformOperation) -> aide::transform::TransformOperation {
			op.summary(#summary)
				#description
				#(
					.tag(#tags)
				)*
				#(
					#responses
				)*
				#redirect
		}
	}
	.into()
}

/// Splits the doc comment into a summary (first line) and an optional description
/// (every following line, joined with spaces).
fn doc_comment(attrs: &[syn::Attribute]) -> Option<(String, Option<String>)> {
	let mut lines = attrs
		.iter()
		.filter_map(|attr| match &attr.meta {
			syn::Meta::NameValue(doc) if doc.path.is_ident("doc") => match &doc.value {
				syn::Expr::Lit(syn::ExprLit {
					lit: syn::Lit::Str(literal),
					..
				}) => Some(literal.value().trim().to_owned()),
				_ => None,
			},
			_ => None,
		})
		.filter(|line| !line.is_empty());

	let summary = lines.next()?;
	let description = lines.collect::<Vec<_>>().join(" ");

	Some((summary, (!description.is_empty()).then_some(description)))
}
