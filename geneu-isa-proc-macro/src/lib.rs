//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::collections::HashMap;

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{
	braced, bracketed,
	parse::{Parse, ParseStream},
	parse_macro_input,
	punctuated::Punctuated,
	Attribute, Ident, LitInt, LitStr, Path, Token, Visibility,
};

/// Instructions are four 32-bit words.
const INSTRUCTION_BITS: u32 = 128;

#[derive(Clone)]
struct FieldDecl {
	attrs: Vec<Attribute>,
	name: Ident,
	high: u32,
	low: u32,
	bits_span: Span,
}

struct FieldBlock {
	trait_path: Option<Path>,
	self_ty: Ident,
	fields: Vec<FieldDecl>,
}

struct LayoutDecl {
	attrs: Vec<Attribute>,
	vis: Visibility,
	name: Ident,
	blocks: Vec<FieldBlock>,
}

impl Parse for FieldDecl {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		let attrs = input.call(Attribute::parse_outer)?;
		let name: Ident = input.parse()?;

		let bits;
		let brackets = bracketed!(bits in input);

		let high: u32 = bits.parse::<LitInt>()?.base10_parse()?;
		let low = if bits.peek(Token![:]) {
			bits.parse::<Token![:]>()?;
			bits.parse::<LitInt>()?.base10_parse()?
		} else {
			high
		};

		if !bits.is_empty() {
			return Err(syn::Error::new(
				bits.span(),
				"Expected `[high:low]` or `[bit]`",
			));
		}

		Ok(Self {
			attrs,
			name,
			high,
			low,
			bits_span: brackets.span.join(),
		})
	}
}

impl Parse for FieldBlock {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		input.parse::<Token![impl]>()?;

		let path: Path = input.parse()?;
		let (trait_path, self_ty) = if input.peek(Token![for]) {
			input.parse::<Token![for]>()?;
			(Some(path), input.parse::<Ident>()?)
		} else {
			match path.get_ident() {
				Some(ident) => (None, ident.clone()),
				None => {
					return Err(syn::Error::new_spanned(
						&path,
						"Expected the name of the layout type",
					))
				},
			}
		};

		let content;
		braced!(content in input);
		let fields = Punctuated::<FieldDecl, Token![,]>::parse_terminated(&content)?;

		Ok(Self {
			trait_path,
			self_ty,
			fields: fields.into_iter().collect(),
		})
	}
}

impl Parse for LayoutDecl {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		let attrs = input.call(Attribute::parse_outer)?;
		let vis: Visibility = input.parse()?;
		input.parse::<Token![struct]>()?;
		let name: Ident = input.parse()?;
		input.parse::<Token![;]>()?;

		let mut blocks = Vec::new();
		while !input.is_empty() {
			blocks.push(input.parse()?);
		}

		Ok(Self {
			attrs,
			vis,
			name,
			blocks,
		})
	}
}

fn check_field(field: &FieldDecl) -> syn::Result<()> {
	if field.high < field.low {
		return Err(syn::Error::new(
			field.bits_span,
			"Expected the high bit to be greater than or equal to the low bit",
		));
	}

	if field.high >= INSTRUCTION_BITS {
		return Err(syn::Error::new(
			field.bits_span,
			format!(
				"Field \"{}\" lies outside of the {}-bit instruction",
				field.name, INSTRUCTION_BITS
			),
		));
	}

	if field.high / 32 != field.low / 32 {
		return Err(syn::Error::new(
			field.bits_span,
			format!(
				"Field \"{}\" crosses a 32-bit word boundary (bits {}..={})",
				field.name, field.low, field.high
			),
		));
	}

	Ok(())
}

fn const_name(field: &FieldDecl) -> Ident {
	format_ident!("{}", field.name.to_string().to_uppercase(), span = field.name.span())
}

fn field_value(field: &FieldDecl) -> TokenStream {
	let name = LitStr::new(&field.name.to_string(), field.name.span());
	let high = field.high;
	let low = field.low;
	quote!(crate::layout::Field::new(#name, #high, #low))
}

/// Declares an instruction layout: a unit type whose associated constants
/// are the named bit ranges of one hardware generation's encoding.
///
/// ```ignore
/// instruction_layout! {
/// 	pub struct Gen8;
///
/// 	impl Fields for Gen8 {
/// 		opcode [6:0],
/// 		access_mode [8],
/// 	}
///
/// 	impl Gen8 {
/// 		eot [127],
/// 	}
/// }
/// ```
///
/// Fields in an `impl Trait for Type` block become the trait's associated
/// constants; fields in an inherent block become public inherent constants.
/// Every field is also listed in the inherent `FIELDS` table.
#[proc_macro]
pub fn instruction_layout(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let layout = parse_macro_input!(item as LayoutDecl);
	let name = &layout.name;
	let mut seen: HashMap<String, Span> = HashMap::new();

	let mut trait_impls = quote!();
	let mut inherent_consts = quote!();
	let mut all_fields = Vec::new();

	for block in &layout.blocks {
		if block.self_ty != *name {
			return syn::Error::new(
				block.self_ty.span(),
				format!("Expected `{}`", name),
			)
			.to_compile_error()
			.into();
		}

		let mut consts = quote!();

		for field in &block.fields {
			if let Err(err) = check_field(field) {
				return err.to_compile_error().into();
			}

			let field_name = field.name.to_string();
			if let Some(previous) = seen.insert(field_name.clone(), field.name.span()) {
				let mut err = syn::Error::new(
					field.name.span(),
					format!("Duplicate field \"{}\"", field_name),
				);
				err.combine(syn::Error::new(previous, "first declared here"));
				return err.to_compile_error().into();
			}

			let attrs = &field.attrs;
			let ident = const_name(field);
			let value = field_value(field);

			match &block.trait_path {
				Some(path) => {
					consts = quote! {
						#consts
						#(#attrs)*
						const #ident: crate::layout::Field = #value;
					};
					all_fields.push(quote!(<#name as #path>::#ident));
				},
				None => {
					consts = quote! {
						#consts
						#(#attrs)*
						pub const #ident: crate::layout::Field = #value;
					};
					all_fields.push(quote!(#name::#ident));
				},
			}
		}

		match &block.trait_path {
			Some(path) => {
				trait_impls = quote! {
					#trait_impls
					impl #path for #name {
						#consts
					}
				};
			},
			None => {
				inherent_consts = quote! {
					#inherent_consts
					#consts
				};
			},
		}
	}

	let attrs = &layout.attrs;
	let vis = &layout.vis;

	quote! {
		#(#attrs)*
		#vis struct #name;

		#trait_impls

		impl #name {
			#inherent_consts

			/// Every field of this layout, in declaration order.
			pub const FIELDS: &'static [crate::layout::Field] = &[#(#all_fields),*];
		}
	}
	.into()
}
