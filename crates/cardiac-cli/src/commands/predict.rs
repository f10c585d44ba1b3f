use std::io::Read;

use anyhow::Context;
use cardiac_client::PredictionClient;
use serde_json::Value;

use super::Target;

pub async fn run(target: &Target, payload: &str) -> anyhow::Result<()> {
    let (context, settings) = target.load()?;
    let payload = read_payload(payload)?;

    let client = PredictionClient::connect(context, settings)
        .context("failed to initialize HTTP transport")?;
    let response = client.predict(&payload).await?;

    if let Some(endpoint) = client.current_endpoint() {
        eprintln!("✓ {} ({})", endpoint, endpoint.source());
    }
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn read_payload(source: &str) -> anyhow::Result<Value> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {source}"))?
    };
    serde_json::from_str(&raw).context("payload is not valid JSON")
}
