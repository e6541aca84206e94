use clap::Parser;

use photo_booth::Config;

mod cli;

use cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let args = Cli::parse();

    match args.command {
        Commands::Filters => cli::print_filters(),
        Commands::Css { filters } => cli::print_css(&filters),
        Commands::Bake {
            input,
            filters,
            output,
        } => cli::bake_file(&input, &filters, output, &Config::load()?)?,
        Commands::Capture { input, filters } => {
            cli::capture(&input, &filters, &Config::load()?).await?
        }
        Commands::List => cli::list(&Config::load()?)?,
        Commands::Delete { index } => cli::delete(index, &Config::load()?)?,
        Commands::Export { index, output } => cli::export(index, output, &Config::load()?)?,
    }

    Ok(())
}
