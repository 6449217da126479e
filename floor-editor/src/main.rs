use clap::Parser;
use floor_editor::cli::{Cli, Runner};
use floor_editor::setup_environment;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Environment (dotenv, logging)
    let config = setup_environment(cli.env_file.as_deref())?;
    tracing::debug!(layout = %cli.layout.display(), "floor starting");

    // 2. Run the command
    let mut runner = Runner::new(cli.layout, config);
    if let Err(e) = runner.run(cli.command).await {
        tracing::error!("Command failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}
