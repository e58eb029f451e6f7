use clap::Parser;
use engine::{Engine, FileBlobStore};

mod cli;
mod commands;
mod error;
mod export;
mod format;
mod prompt;
mod rates;
mod settings;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> error::Result<()> {
    let settings = settings::load(&cli)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "freightcalc={level},engine={level}",
            level = settings.log_level
        ))
        .init();

    tracing::debug!(data_dir = %settings.data_dir.display(), "opening data directory");
    let store = FileBlobStore::new(&settings.data_dir)?;
    let mut engine = Engine::builder().store(store).build()?;

    commands::run(cli.command, &mut engine, &settings).await
}
