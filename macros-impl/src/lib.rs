//! Procedural macros re-exported by `commonware-macros`.

#![doc(
    html_logo_url = "https://commonware.xyz/imgs/rustdoc_logo.svg",
    html_favicon_url = "https://commonware.xyz/favicon.ico"
)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitStr};

/// Run a test function with a `tracing` subscriber installed that writes to the
/// test output at the given level (`DEBUG` if none is provided).
///
/// The expansion refers to `tracing` and `tracing-subscriber` through their
/// re-exports in `commonware-macros`, so only that crate needs to be a dependency.
///
/// # Example
/// ```rust
/// use commonware_macros::{test_traced, tracing::{debug, info}};
///
/// #[test_traced("INFO")]
/// fn test_info_level() {
///     info!("This is an info log");
///     debug!("This is a debug log (won't be shown)");
///     assert_eq!(2 + 2, 4);
/// }
/// ```
#[proc_macro_attribute]
pub fn test_traced(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    // Parse the level (if any)
    let level = if attr.is_empty() {
        "DEBUG".to_string()
    } else {
        parse_macro_input!(attr as LitStr).value().to_uppercase()
    };
    let level = match level.as_str() {
        "TRACE" | "DEBUG" | "INFO" | "WARN" | "ERROR" => {
            syn::Ident::new(&level, proc_macro2::Span::call_site())
        }
        _ => {
            return syn::Error::new(
                proc_macro2::Span::call_site(),
                "level must be one of TRACE, DEBUG, INFO, WARN, or ERROR",
            )
            .to_compile_error()
            .into();
        }
    };

    // Extract function components
    let attrs = input.attrs;
    let vis = input.vis;
    let sig = input.sig;
    let block = input.block;

    // Install a subscriber scoped to this test (other tests may run in parallel
    // on the same process, so a global default is not used)
    let expanded = quote! {
        #[test]
        #(#attrs)*
        #vis #sig {
            let subscriber = ::commonware_macros::tracing_subscriber::fmt()
                .with_test_writer()
                .with_max_level(::commonware_macros::tracing::Level::#level)
                .with_line_number(true)
                .finish();
            let dispatcher = ::commonware_macros::tracing::Dispatch::new(subscriber);
            ::commonware_macros::tracing::dispatcher::with_default(&dispatcher, || #block)
        }
    };
    TokenStream::from(expanded)
}
