//! Reflect derive implementation
//!
//! Generates a `Reflect` impl reporting the struct kind and a `Struct` impl
//! describing every field in declaration order.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    ext::IdentExt, parse::Result, parse_quote, Attribute, Data, DeriveInput, Error, Fields,
    GenericParam, Index, LitStr, Member, Type, Visibility,
};

/// Field information extracted from the struct definition
struct FieldSpec {
    /// Declaration index, shared by `fields()` and `field(index)`
    index: usize,
    member: Member,
    name: String,
    ty: Type,
    exported: bool,
    positional: bool,
    tags: Vec<(String, String)>,
}

/// Container-level `#[reflect(...)]` options
#[derive(Default)]
struct ContainerOptions {
    validatable: bool,
}

pub fn expand(mut input: DeriveInput) -> Result<TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => collect_fields(&data.fields)?,
        Data::Enum(data) => {
            return Err(Error::new_spanned(
                data.enum_token,
                "#[derive(Reflect)] can only be applied to structs",
            ))
        }
        Data::Union(data) => {
            return Err(Error::new_spanned(
                data.union_token,
                "#[derive(Reflect)] can only be applied to structs",
            ))
        }
    };
    let options = container_options(&input.attrs)?;

    add_bounds(&mut input);

    let ident = &input.ident;
    let type_name = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let as_validatable = if options.validatable {
        quote! {
            fn as_validatable(&self) -> ::core::option::Option<&dyn ::tagval::Validatable> {
                ::core::option::Option::Some(self)
            }
        }
    } else {
        TokenStream::new()
    };

    let infos = fields.iter().map(field_info);
    let arms = fields.iter().map(|field| {
        let index = field.index;
        let member = &field.member;
        quote! {
            #index => ::core::option::Option::Some(&self.#member as &dyn ::tagval::Reflect),
        }
    });

    Ok(quote! {
        impl #impl_generics ::tagval::Reflect for #ident #ty_generics #where_clause {
            fn kind(&self) -> ::tagval::Kind<'_> {
                ::tagval::Kind::Struct(self)
            }

            #as_validatable

            fn recursible() -> bool {
                true
            }
        }

        impl #impl_generics ::tagval::Struct for #ident #ty_generics #where_clause {
            fn shape_id(&self) -> ::core::any::TypeId {
                ::core::any::TypeId::of::<Self>()
            }

            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn fields(&self) -> ::std::vec::Vec<::tagval::FieldInfo> {
                ::std::vec![#(#infos),*]
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::tagval::Reflect> {
                match index {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

/// Every non-skipped field, in declaration order
fn collect_fields(fields: &Fields) -> Result<Vec<FieldSpec>> {
    let mut specs = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        if field_skipped(&field.attrs)? {
            continue;
        }

        let (member, name, positional) = match &field.ident {
            Some(ident) => (
                Member::Named(ident.clone()),
                ident.unraw().to_string(),
                false,
            ),
            None => (
                Member::Unnamed(Index {
                    index: index as u32,
                    span: Span::call_site(),
                }),
                index.to_string(),
                true,
            ),
        };

        specs.push(FieldSpec {
            index,
            member,
            name,
            ty: field.ty.clone(),
            exported: !matches!(field.vis, Visibility::Inherited),
            positional,
            tags: field_tags(&field.attrs)?,
        });
    }

    Ok(specs)
}

/// `key = "value"` pairs from every `#[tag(...)]` on a field
fn field_tags(attrs: &[Attribute]) -> Result<Vec<(String, String)>> {
    let mut tags = Vec::new();

    for attr in attrs.iter().filter(|a| a.path().is_ident("tag")) {
        attr.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .map(|ident| ident.unraw().to_string())
                .ok_or_else(|| meta.error("expected a plain tag key"))?;
            let value: LitStr = meta.value()?.parse()?;
            tags.push((key, value.value()));
            Ok(())
        })?;
    }

    Ok(tags)
}

fn field_skipped(attrs: &[Attribute]) -> Result<bool> {
    let mut skip = false;

    for attr in attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported field option, expected `skip`"))
            }
        })?;
    }

    Ok(skip)
}

fn container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("validatable") {
                options.validatable = true;
                Ok(())
            } else {
                Err(meta.error("unsupported container option, expected `validatable`"))
            }
        })?;
    }

    Ok(options)
}

/// Type parameters must be reflectable and `'static` for the shape id
fn add_bounds(input: &mut DeriveInput) {
    for param in &mut input.generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(::tagval::Reflect));
            ty.bounds.push(parse_quote!('static));
        }
    }
    input
        .generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(Self: 'static));
}

/// `FieldInfo` literal for one field
fn field_info(field: &FieldSpec) -> TokenStream {
    let FieldSpec {
        index,
        name,
        ty,
        exported,
        positional,
        tags,
        ..
    } = field;
    let tags = tags.iter().map(|(key, value)| quote! { (#key, #value) });

    quote! {
        ::tagval::FieldInfo {
            index: #index,
            name: #name,
            exported: #exported,
            positional: #positional,
            tags: &[#(#tags),*],
            recursible: <#ty as ::tagval::Reflect>::recursible(),
        }
    }
}
