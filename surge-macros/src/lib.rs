use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Ident, ItemFn};

/// Proc macro to denote a load test Scenario
///
/// Turns an `async fn` without arguments returning `Result<T, E>` (the unit of work) into a
/// function of the same name returning a configurable `LoadTest`. The original body is kept in a
/// hidden `__surge_<name>` function.
///
/// # Example
/// ```ignore
/// use surge::prelude::*;
///
/// #[scenario]
/// async fn my_completion() -> Result<String, MyError> {
///     ...
/// }
///
/// let metrics = my_completion().requests(100).concurrency(10).await?;
/// ```
#[proc_macro_attribute]
pub fn scenario(attr: TokenStream, item: TokenStream) -> TokenStream {
    match syn::parse::<ItemFn>(item) {
        Ok(input) => scenario_internal(attr.into(), input).into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn scenario_internal(_attr: TokenStream2, input: ItemFn) -> TokenStream2 {
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;

    if sig.asyncness.is_none() {
        return syn::Error::new_spanned(&sig.fn_token, "#[scenario] requires an async fn")
            .to_compile_error();
    }

    if !sig.inputs.is_empty() {
        return syn::Error::new_spanned(&sig.inputs, "#[scenario] functions take no arguments")
            .to_compile_error();
    }

    let stmts = &block.stmts;

    let new_name = Ident::new(&format!("__surge_{}", sig.ident), Span::call_site());
    let mut new_sig = sig.clone();
    new_sig.ident = new_name.clone();

    let mut scen_sig = sig.clone();
    let scen_name = sig.ident.clone();
    scen_sig.asyncness = None;
    scen_sig.output = syn::parse_quote! {
        -> impl ::surge::load_test::ConfigurableLoadTest
    };

    quote! {
        #(#attrs)* #vis #scen_sig {
            ::surge::load_test::LoadTest::new(stringify!(#scen_name), #new_name)
        }

        #[doc(hidden)]
        #(#attrs)* #vis #new_sig {
            #(#stmts)*
        }
    }
}
