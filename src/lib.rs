//! # apisdk - fluent request builders over a pluggable request adapter
//!
//! `apisdk` exposes a service's resource paths as a tree of immutable,
//! cheaply-cloned builders. Selecting a path segment is pure data; only a
//! terminal verb (`get`, `post`, `patch`, `delete`) sends a request, through a
//! shared [`RequestAdapter`] that authenticates it, performs one round trip
//! and decodes the response.
//!
//! ## Quick Start
//!
//! ```no_run
//! use apisdk::{AnonymousAuthenticationProvider, ApiClient, HttpRequestAdapter};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), apisdk::Error> {
//!     let adapter = HttpRequestAdapter::builder()
//!         .auth(AnonymousAuthenticationProvider)
//!         .base_url("https://api.example.com")?
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!     let client = ApiClient::new(adapter);
//!
//!     // GET https://api.example.com/foo/x/bar/y
//!     let bar = client.foo("x").bar("y").get().await?;
//!     println!("Bar: {:?}", bar);
//!
//!     // Constructing a builder performs no I/O.
//!     let _baz = client.baz("x");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! Pick a provider when building the adapter:
//!
//! ```no_run
//! use apisdk::auth::{AllowedHostsValidator, BaseBearerTokenAuthenticationProvider, StaticAccessTokenProvider};
//! use apisdk::HttpRequestAdapter;
//!
//! # fn example() -> Result<(), apisdk::Error> {
//! let auth = BaseBearerTokenAuthenticationProvider::new(StaticAccessTokenProvider::new(
//!     "my-token",
//!     AllowedHostsValidator::new(["api.example.com"])?,
//! ));
//!
//! let adapter = HttpRequestAdapter::builder()
//!     .auth(auth)
//!     .base_url("https://api.example.com")?
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Transport failures, API failures and parse failures are distinct variants
//! of [`Error`]:
//!
//! ```no_run
//! use apisdk::{ApiClient, Error};
//!
//! # async fn example(client: ApiClient) {
//! match client.foo("x").bar("y").get().await {
//!     Ok(bar) => println!("Success: {:?}", bar),
//!     Err(Error::Api { status, raw_response, .. }) => {
//!         eprintln!("HTTP error {}: {}", status, raw_response);
//!     }
//!     Err(Error::DeserializationFailed { raw_response, serde_error, .. }) => {
//!         eprintln!("Unexpected body {}: {}", raw_response, serde_error);
//!     }
//!     Err(e) if e.is_transport() => eprintln!("Service unreachable: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # }
//! ```
//!
//! ## Features
//!
//! - **Immutable fluent builders** - every accessor returns a new value, safe to share across tasks
//! - **Pluggable authentication** - anonymous, API key, bearer token with cached refresh
//! - **Pluggable transport** - `reqwest` by default, any [`HttpTransport`] in tests or middleware
//! - **Rich error handling** - raw bodies and status codes preserved on failure
//! - **Structured logging** - `tracing` events for every request and response

pub mod adapter;
pub mod auth;
pub mod builder;
pub mod client;
pub mod config;
mod error;
pub mod models;
pub mod request;
mod response;
mod transport;

pub use adapter::{HttpRequestAdapter, HttpRequestAdapterBuilder, RequestAdapter};
pub use auth::{AnonymousAuthenticationProvider, AuthenticationProvider};
pub use builder::PathBuilder;
pub use client::ApiClient;
pub use error::{Error, Result};
pub use response::{RawResponse, Response};
pub use transport::HttpTransport;
