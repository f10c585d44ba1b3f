use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use cardiac_resolver::{EndpointResolver, HyperTransport};
use serde_json::json;
use tracing::debug;

use super::Target;

pub async fn run(target: &Target, format: &str) -> anyhow::Result<()> {
    let (context, settings) = target.load()?;
    let transport = HyperTransport::new().context("failed to initialize HTTP transport")?;
    let resolver = EndpointResolver::new(context, settings, Arc::new(transport));

    let started = Instant::now();
    let endpoint = resolver.resolve().await;
    let elapsed = started.elapsed();
    debug!(?elapsed, "discovery finished");

    match format {
        "json" => {
            let report = json!({
                "host": resolver.context().hostname,
                "url": endpoint.url(),
                "source": endpoint.source().to_string(),
                "elapsed_ms": elapsed.as_millis() as u64,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("{endpoint}");
            println!("  source:  {}", endpoint.source());
            println!("  elapsed: {elapsed:?}");
        }
    }

    Ok(())
}
