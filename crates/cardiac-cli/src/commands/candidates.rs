use cardiac_core::{generate_candidates, health_url, is_loopback};
use cardiac_resolver::offline_choice;
use serde_json::json;

use super::Target;

pub fn run(target: &Target, format: &str) -> anyhow::Result<()> {
    let (context, settings) = target.load()?;
    let candidates = generate_candidates(&context.hostname, &settings.conventions);
    let choice = offline_choice(&context, &settings);
    let probe_urls: Vec<String> = candidates
        .iter()
        .map(|c| {
            health_url(
                c.as_str(),
                &settings.conventions.predict_path,
                &settings.health_path,
            )
        })
        .collect();

    match format {
        "json" => {
            let list: Vec<_> = candidates
                .iter()
                .zip(&probe_urls)
                .map(|(c, probe)| json!({ "url": c.as_str(), "health_url": probe }))
                .collect();
            let report = json!({
                "host": context.hostname,
                "loopback": is_loopback(&context.hostname),
                "override": context.explicit_override(),
                "candidates": list,
                "offline_choice": { "url": choice.url(), "source": choice.source().to_string() },
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("Host: {}", context.hostname);
            if let Some(url) = context.explicit_override() {
                println!("Override: {url} (no probing)");
            } else if is_loopback(&context.hostname) {
                println!("Loopback host: {} (no probing)", settings.local_url);
            }
            println!("Candidates (probe order):");
            for (i, (candidate, probe)) in candidates.iter().zip(&probe_urls).enumerate() {
                println!("  {}. {candidate}  [health: {probe}]", i + 1);
            }
            println!("Offline choice: {} ({})", choice, choice.source());
        }
    }

    Ok(())
}
