//! Basic example walking the fluent call surface.
//!
//! This example shows how to:
//! - Build a request adapter with an authentication provider
//! - Select resources through chained accessors (no I/O)
//! - Issue a terminal GET and inspect the outcome
//!
//! Run with: `cargo run --example basic_call -- https://your-service.example.com`

use apisdk::client::DEFAULT_BASE_URL;
use apisdk::models::ModelArtifactsQuery;
use apisdk::{AnonymousAuthenticationProvider, ApiClient, Error, HttpRequestAdapter, PathBuilder};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("apisdk=debug,basic_call=info")
        .init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let adapter = HttpRequestAdapter::builder()
        .auth(AnonymousAuthenticationProvider)
        .base_url(&base_url)?
        .timeout(Duration::from_secs(10))
        .build()?;
    let client = ApiClient::new(adapter);

    println!("=== Path building ===");
    let baz = client.baz("x");
    println!("baz(\"x\") targets {}", baz.url()?);
    let bar = client.foo("x").bar("y");
    println!("foo(\"x\").bar(\"y\") targets {}", bar.url()?);
    println!();

    println!("=== GET foo/x/bar/y ===");
    match bar.get().await {
        Ok(Some(bar)) => println!("Bar: {:?}", bar),
        Ok(None) => println!("No content"),
        Err(e) if e.is_transport() => println!("Service unreachable: {}", e),
        Err(e) => println!("Request failed: {}", e),
    }
    println!();

    println!("=== List model artifacts ===");
    let query = ModelArtifactsQuery {
        page_size: Some(5),
        ..Default::default()
    };
    match client
        .api()
        .model_registry()
        .v1alpha3()
        .model_artifacts()
        .get(&query)
        .await
    {
        Ok(Some(page)) => {
            for artifact in &page.items {
                println!("- {:?} ({:?})", artifact.name, artifact.state);
            }
        }
        Ok(None) => println!("No content"),
        Err(e) => println!("Request failed: {}", e),
    }

    Ok(())
}
