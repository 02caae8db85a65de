use anyhow::Result;
use clap::Parser;
use question_dedup::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("question_dedup=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
