use clap::Parser;
use vidcat_auth::cli::{self, Cli, Command};
use vidcat_auth::config::AppConfig;
use vidcat_auth::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    match cli.command {
        Command::GenerateSecret => println!("{}", cli::generate_secret()),
        Command::Inspect { token } => {
            let payload = cli::inspect(&config, &token)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Command::Migrate => cli::migrate(&config).await?,
    }

    Ok(())
}
