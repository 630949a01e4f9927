use crate::console::VerbosityLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod config;
pub mod route;

pub use config::handle_config;
pub use route::{handle_analyze, handle_hook, handle_hooks, handle_route, App};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Increase verbosity (-v verbose, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode - only show errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose", global = true)]
    pub quiet: bool,

    /// Read configuration from this file instead of ~/.config/bumba/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a task and run its hooks
    Route {
        command: String,
        /// Everything after the command, hyphenated words included
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        /// Session context as a JSON object
        #[arg(long)]
        context: Option<String>,
    },
    /// Classify a task without running hooks
    Analyze {
        command: String,
        /// Everything after the command, hyphenated words included
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        #[arg(long)]
        context: Option<String>,
    },
    /// Run a single registered hook
    Hook {
        name: String,
        /// Hook context as a JSON object
        #[arg(long)]
        context: Option<String>,
    },
    /// List registered hooks
    Hooks,
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file location
    Path,
    /// Write the default configuration if none exists
    Init {
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn get_verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else {
            match self.verbose {
                0 => VerbosityLevel::Normal,
                1 => VerbosityLevel::Verbose,
                _ => VerbosityLevel::Debug,
            }
        }
    }

    pub fn get_effective_verbosity(&self, config_verbosity: VerbosityLevel) -> VerbosityLevel {
        if self.quiet || self.verbose > 0 {
            self.get_verbosity()
        } else {
            config_verbosity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_route_with_context() {
        let cli = Cli::parse_from([
            "bumba",
            "route",
            "--context",
            "{\"sessionId\":\"s1\"}",
            "implement",
            "checkout",
            "flow",
        ]);

        match cli.command {
            Commands::Route {
                command,
                args,
                context,
            } => {
                assert_eq!(command, "implement");
                assert_eq!(args, vec!["checkout", "flow"]);
                assert_eq!(context.as_deref(), Some("{\"sessionId\":\"s1\"}"));
            }
            _ => panic!("expected route"),
        }
    }

    #[test]
    fn test_every_subcommand_has_help() {
        use clap::CommandFactory;

        let cli = Cli::command();
        let config = cli.find_subcommand("config").unwrap();
        for sub in cli.get_subcommands().chain(config.get_subcommands()) {
            assert!(sub.get_about().is_some(), "{} has no help text", sub.get_name());
        }
    }

    #[test]
    fn test_route_accepts_hyphenated_args() {
        let cli = Cli::parse_from(["bumba", "route", "rm", "-rf", "/"]);
        match cli.command {
            Commands::Route { command, args, .. } => {
                assert_eq!(command, "rm");
                assert_eq!(args, vec!["-rf", "/"]);
            }
            _ => panic!("expected route"),
        }
    }

    #[test]
    fn test_cli_verbosity_overrides_config() {
        let cli = Cli::parse_from(["bumba", "-vv", "hooks"]);
        assert_eq!(
            cli.get_effective_verbosity(VerbosityLevel::Quiet),
            VerbosityLevel::Debug
        );

        let cli = Cli::parse_from(["bumba", "hooks"]);
        assert_eq!(
            cli.get_effective_verbosity(VerbosityLevel::Verbose),
            VerbosityLevel::Verbose
        );
    }

    #[test]
    fn test_config_init_force_flag() {
        let cli = Cli::parse_from(["bumba", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }
}
