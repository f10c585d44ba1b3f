pub mod candidates;
pub mod predict;
pub mod resolve;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use cardiac_core::{API_URL_ENV, CardiacConfig, ExecutionContext, ResolverSettings};

/// Which client the command acts as.
#[derive(Args, Debug)]
pub struct Target {
    /// Host name the client is served from (e.g. my-app.onrender.com)
    #[arg(long)]
    pub host: String,
    /// Explicit backend URL; overrides CARDIAC_API_URL and the config file
    #[arg(long)]
    pub api_url: Option<String>,
    /// Path to a cardiac.toml config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Target {
    /// Build the execution context and settings this target describes.
    pub fn load(&self) -> anyhow::Result<(ExecutionContext, ResolverSettings)> {
        let config = match &self.config {
            Some(path) => CardiacConfig::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => CardiacConfig::default(),
        };
        let settings = config.settings().context("invalid config")?;
        let env_override = std::env::var(API_URL_ENV).ok();
        let context = build_context(
            &self.host,
            self.api_url.as_deref(),
            env_override.as_deref(),
            config.api_url(),
        );
        Ok((context, settings))
    }
}

/// Pick the override by precedence: flag, then environment, then config.
fn build_context(
    host: &str,
    flag: Option<&str>,
    env: Option<&str>,
    config: Option<&str>,
) -> ExecutionContext {
    let context = ExecutionContext::new(host);
    let chosen = [flag, env, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty());
    match chosen {
        Some(url) => context.with_override(url),
        None => context,
    }
}
