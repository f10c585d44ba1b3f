use clap::{Parser, Subcommand};

mod commands;

use commands::Target;

#[derive(Parser)]
#[command(
    name = "cardiac",
    about = "Cardiac AI — inspect and exercise prediction backend discovery",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the candidate backends for a host, in probe order, without
    /// touching the network.
    Candidates {
        #[command(flatten)]
        target: Target,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Run endpoint discovery for a host and print the chosen backend.
    Resolve {
        #[command(flatten)]
        target: Target,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Resolve the backend and send a prediction request.
    Predict {
        #[command(flatten)]
        target: Target,
        /// JSON payload file, or `-` for stdin
        #[arg(short, long)]
        payload: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cardiac_resolver=info".parse()?)
                .add_directive("cardiac_client=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Candidates { target, format } => commands::candidates::run(&target, &format),
        Commands::Resolve { target, format } => commands::resolve::run(&target, &format).await,
        Commands::Predict { target, payload } => commands::predict::run(&target, &payload).await,
    }
}
