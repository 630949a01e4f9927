use anyhow::Result;
use bumba::{
    cli::{
        handle_analyze, handle_config, handle_hook, handle_hooks, handle_route, App, Cli, Commands,
    },
    cli::config::load_config,
    config::AppConfig,
    console::Console,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config` subcommands must work even when the file is missing or broken
    let config = load_config(cli.config.as_deref());
    let configured = config
        .as_ref()
        .map(AppConfig::get_verbosity)
        .unwrap_or_default();
    let console = Console::new(cli.get_effective_verbosity(configured));

    match cli.command {
        Commands::Config { action } => {
            handle_config(action, cli.config.as_deref(), &console)?;
        }
        Commands::Route {
            command,
            args,
            context,
        } => {
            let app = App::from_config(&config?, console)?;
            handle_route(&app, &command, &args, context.as_deref()).await?;
        }
        Commands::Analyze {
            command,
            args,
            context,
        } => {
            let app = App::from_config(&config?, console)?;
            handle_analyze(&app, &command, &args, context.as_deref())?;
        }
        Commands::Hook { name, context } => {
            let app = App::from_config(&config?, console)?;
            handle_hook(&app, &name, context.as_deref()).await?;
        }
        Commands::Hooks => {
            let app = App::from_config(&config?, console)?;
            handle_hooks(&app).await?;
        }
    }

    Ok(())
}
