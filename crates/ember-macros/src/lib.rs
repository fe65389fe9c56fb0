// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This crate provides procedural macros for the Ember engine.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, LitStr};

/// A derive macro that implements the `ember_data::ecs::Component` trait.
///
/// The component's registered name defaults to the struct's identifier and
/// can be overridden with `#[component(name = "...")]`. The name is what
/// scene documents use as the JSON key for the component.
///
/// ```rust,ignore
/// #[derive(Component, Default)]
/// #[component(name = "Health")]
/// struct HealthPoints(u32);
/// ```
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut registered_name = name.to_string();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("component")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                registered_name = value.value();
                Ok(())
            } else {
                Err(meta.error("unsupported component attribute, expected `name`"))
            }
        });
        if let Err(e) = parsed {
            return e.to_compile_error().into();
        }
    }

    // `ember_data` resolves inside ember-data itself through
    // `extern crate self as ember_data`.
    let expanded = quote! {
        impl #impl_generics ::ember_data::ecs::Component for #name #ty_generics #where_clause {
            const NAME: &'static str = #registered_name;
        }
    };

    TokenStream::from(expanded)
}
