use crate::pattern::placeholder_names;
use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use proc_macro2::TokenStream;
use proc_macro_error2::{abort, emit_error};
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Type};

/// What a field contributes to the resource URL
enum Role {
    Path,
    Query { name: String, optional: bool },
    Parent(Type),
}

/// Attributes collected from `#[resource(...)]` and `#[serde(...)]` on a field
#[derive(Default)]
struct FieldAttrs {
    parent: bool,
    optional: bool,
    rename: Option<String>,
    serde_default: bool,
    skip: bool,
}

/// Parse the struct-level `#[resource("/path")]` / `#[resource(path = "/path")]`
fn parse_path_attr(input: &DeriveInput) -> LitStr {
    for attr in &input.attrs {
        if !attr.path().is_ident("resource") {
            continue;
        }

        if let Ok(lit) = attr.parse_args::<LitStr>() {
            return lit;
        }

        let mut found: Option<LitStr> = None;
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("path") {
                found = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected a path pattern, e.g. #[resource(\"/items/{id}\")]"))
            }
        });
        match (result, found) {
            (Ok(()), Some(lit)) => return lit,
            (Err(e), _) => abort!(e.span(), "Failed to parse #[resource] attribute: {}", e),
            (Ok(()), None) => {}
        }
    }

    abort!(
        input.ident.span(),
        "#[derive(Resource)] requires a path pattern: #[resource(\"/path\")]"
    );
}

/// Consume the value of a `#[serde(...)]` entry we do not care about
fn skip_meta_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta_value(&nested))?;
    }
    Ok(())
}

fn parse_field_attrs(field: &syn::Field) -> FieldAttrs {
    let mut attrs = FieldAttrs::default();

    for attr in &field.attrs {
        if attr.path().is_ident("resource") {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("parent") {
                    attrs.parent = true;
                    Ok(())
                } else if meta.path.is_ident("optional") {
                    attrs.optional = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `parent` or `optional`"))
                }
            });
            if let Err(e) = result {
                emit_error!(e.span(), "Failed to parse #[resource] attribute: {}", e);
            }
        } else if attr.path().is_ident("serde") {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.rename = Some(lit.value());
                } else if meta.path.is_ident("default") {
                    attrs.serde_default = true;
                    skip_meta_value(&meta)?;
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    attrs.skip = true;
                } else {
                    skip_meta_value(&meta)?;
                }
                Ok(())
            });
            if let Err(e) = result {
                emit_error!(e.span(), "Failed to parse #[serde] attribute: {}", e);
            }
        }
    }

    attrs
}

/// Struct-level `#[serde(rename_all = "...")]`
fn parse_rename_all(input: &DeriveInput) -> Option<String> {
    let mut rename_all = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") && meta.input.peek(syn::Token![=]) {
                let lit: LitStr = meta.value()?.parse()?;
                rename_all = Some(lit.value());
                Ok(())
            } else {
                skip_meta_value(&meta)
            }
        });
        if let Err(e) = result {
            emit_error!(e.span(), "Failed to parse #[serde] attribute: {}", e);
        }
    }
    rename_all
}

/// Apply a serde `rename_all` rule to a snake_case field name
fn apply_rename_all(rule: &str, field: &str) -> Option<String> {
    let renamed = match rule {
        "lowercase" => field.to_lowercase(),
        "UPPERCASE" => field.to_uppercase(),
        "PascalCase" => field.to_upper_camel_case(),
        "camelCase" => field.to_lower_camel_case(),
        "snake_case" => field.to_snake_case(),
        "SCREAMING_SNAKE_CASE" => field.to_shouty_snake_case(),
        "kebab-case" => field.to_kebab_case(),
        "SCREAMING-KEBAB-CASE" => field.to_shouty_kebab_case(),
        _ => return None,
    };
    Some(renamed)
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    type_path.qself.is_none()
        && type_path.path.segments.last().is_some_and(|segment| {
            segment.ident == "Option"
                && matches!(
                    &segment.arguments,
                    PathArguments::AngleBracketed(args)
                        if matches!(args.args.first(), Some(GenericArgument::Type(_)))
                )
        })
}

fn field_roles(input: &DeriveInput, placeholders: &[String]) -> Vec<Role> {
    let rename_all = parse_rename_all(input);
    if let Some(rule) = &rename_all
        && apply_rename_all(rule, "").is_none()
    {
        emit_error!(input.ident.span(), "unsupported serde rename_all rule `{}`", rule);
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return Vec::new(),
            Fields::Unnamed(_) => abort!(
                input.ident.span(),
                "#[derive(Resource)] requires a struct with named fields or a unit struct"
            ),
        },
        _ => abort!(
            input.ident.span(),
            "#[derive(Resource)] can only be applied to structs"
        ),
    };

    let mut roles = Vec::new();
    let mut has_parent = false;

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_field_attrs(field);
        if attrs.skip {
            continue;
        }

        if attrs.parent {
            if has_parent {
                emit_error!(
                    ident.span(),
                    "a resource can have only one #[resource(parent)] field"
                );
                continue;
            }
            has_parent = true;
            roles.push(Role::Parent(field.ty.clone()));
            continue;
        }

        let name = attrs.rename.unwrap_or_else(|| {
            let field_name = ident.unraw().to_string();
            rename_all
                .as_deref()
                .and_then(|rule| apply_rename_all(rule, &field_name))
                .unwrap_or(field_name)
        });

        if placeholders.contains(&name) {
            if attrs.optional {
                emit_error!(
                    ident.span(),
                    "`{}` is a path parameter; mark the placeholder optional with `{{{}?}}` instead",
                    name,
                    name
                );
            }
            roles.push(Role::Path);
        } else {
            let optional = attrs.optional || attrs.serde_default || is_option(&field.ty);
            roles.push(Role::Query { name, optional });
        }
    }

    roles
}

pub fn expand_derive_resource(input: &DeriveInput) -> TokenStream {
    let path_lit = parse_path_attr(input);
    let path = path_lit.value();
    let placeholders = match placeholder_names(&path) {
        Ok(names) => names,
        Err(reason) => abort!(path_lit.span(), "invalid path pattern: {}", reason),
    };

    let calls = field_roles(input, &placeholders)
        .into_iter()
        .filter_map(|role| match role {
            Role::Path => None,
            Role::Query {
                name,
                optional: false,
            } => Some(quote! { .query(#name) }),
            Role::Query {
                name,
                optional: true,
            } => Some(quote! { .optional_query(#name) }),
            Role::Parent(ty) => Some(quote! {
                .parent(<#ty as ::modkit_resources::Resource>::descriptor()?)
            }),
        });

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics ::modkit_resources::Resource for #ident #ty_generics #where_clause {
            fn descriptor() -> ::core::result::Result<
                ::modkit_resources::ResourceDescriptor,
                ::modkit_resources::ResourceError,
            > {
                ::modkit_resources::ResourceDescriptor::builder(#path)
                    #(#calls)*
                    .build()
            }
        }
    }
}
