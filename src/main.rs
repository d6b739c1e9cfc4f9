mod api;
mod cli;
mod config;
mod error;
mod export;
mod import;
mod model;
mod store;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use api::client::MotionClient;
use cli::Command;
use store::TemplateStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so prompts on stdout stay readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match cli::parse_args(&args)? {
        Command::Help => {
            cli::print_help();
            return Ok(());
        }
        Command::Version => {
            println!("motion-templates {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Run => {}
    }

    let config = config::load_config()?;
    // No key, no client: this fails before any request can go out.
    let client = MotionClient::from_env(config.api_url())?;
    let store = TemplateStore::new(config.templates_dir());

    cli::run(&client, &store).await
}
