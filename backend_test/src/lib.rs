use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one, launch a mock
/// backend for it, and inject dependencies.
///
/// Injectable dependencies are `crate::mock::MockBackend`,
/// `crate::api::ApiClient` (already pointed at the mock) and
/// `crate::credentials::MemoryStore` (the store that client reads from).
///
/// `#[backend_test(token)]` stores `crate::EXAMPLE_TOKEN` before the test
/// starts; without it the store is empty.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Work out what to inject and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Log in if requested.
    let maybe_login = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "token" => quote! {
            store.set(crate::credentials::AUTH_TOKEN_KEY, crate::EXAMPLE_TOKEN);
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `token` or nothing")
                .into_compile_error()
                .into();
        }
        None => TokenStream2::new(),
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> (
                crate::mock::MockBackend,
                crate::credentials::MemoryStore,
                crate::api::ApiClient,
            ) {
                crate::init_test_logging();
                let backend = crate::mock::MockBackend::launch().await;
                let store = crate::credentials::MemoryStore::default();

                #maybe_login

                let client = crate::api::ApiClient::new(backend.config(), store.clone());
                (backend, store, client)
            }

            /// The test itself.
            #item_fn

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("backend-test-worker")
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();

            // The mock backend shuts down when dropped, even if the test panics.
            runtime.block_on(async {
                #[allow(unused_variables)]
                let (backend, store, client) = setup().await;
                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, map each parameter to the value to
/// inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut seen = Vec::new();
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(_) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    if let Some(type_ident) = type_path.path.get_ident() {
                        let injected = if type_ident == "MockBackend" {
                            Some(quote! { backend })
                        } else if type_ident == "ApiClient" {
                            Some(quote! { client })
                        } else if type_ident == "MemoryStore" {
                            Some(quote! { store })
                        } else {
                            None
                        };

                        if let Some(injected) = injected {
                            let type_name = type_ident.to_string();
                            if seen.contains(&type_name) {
                                return Err(syn::Error::new(
                                    input.span(),
                                    format!("Test cannot accept more than one `{type_name}`"),
                                ));
                            }
                            seen.push(type_name);
                            args.push(injected);
                            continue;
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `backend: MockBackend`, `client: ApiClient` or `store: MemoryStore`",
        ));
    }

    Ok(args)
}
