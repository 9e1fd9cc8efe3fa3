//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands that never touch the vocabulary (config, completions, help) run
//! without opening the store; everything else gets the resolved store.

use std::path::PathBuf;

use vocab_store::VocabularyStore;

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::config::Config;
use crate::commands::{self, CommandContext, Result};

/// Trait for commands that run without the store.
pub trait LocalCommand {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Trait for commands that work on the store.
#[allow(async_fn_in_trait)]
pub trait StoreCommand {
    /// Execute the command against `store`.
    async fn execute(&self, ctx: &CommandContext, store: &VocabularyStore) -> Result<()>;
}

/// Commands that don't need the store.
pub enum LocalDispatch<'a> {
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> LocalDispatch<'a> {
    /// Try to create a local dispatch from the CLI command.
    /// Returns None if the command needs the store.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl LocalCommand for LocalDispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => Ok(commands::completions::execute(shell)?),
            Self::Help => {
                if !ctx.quiet {
                    println!("vocab - vocabulary collector");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = commands::config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}

/// Commands that need the store.
pub enum StoreDispatch<'a> {
    Query {
        text: String,
    },
    Add {
        content: &'a str,
        description: &'a Option<String>,
        tags: &'a [String],
    },
    List {
        limit: Option<usize>,
        unreviewed: bool,
    },
    Review {
        keys: &'a [String],
    },
    Edit {
        key: &'a str,
        content: &'a Option<String>,
        description: &'a Option<String>,
        tags: &'a [String],
        add_tag: &'a Option<String>,
        remove_tag: &'a Option<String>,
    },
    Delete {
        keys: &'a [String],
        force: bool,
    },
    Session,
    Export {
        output: &'a Option<PathBuf>,
    },
}

impl<'a> StoreDispatch<'a> {
    /// Create a store dispatch from the CLI command.
    /// Returns None if the command doesn't need the store.
    pub fn from_cli(cli: &'a Cli, config: &Config) -> Option<Self> {
        match &cli.command {
            Some(Commands::Query { text }) => Some(Self::Query {
                text: text
                    .clone()
                    .or_else(|| config.query.default.clone())
                    .unwrap_or_default(),
            }),
            Some(Commands::Add {
                content,
                description,
                tag,
            }) => Some(Self::Add {
                content,
                description,
                tags: tag,
            }),
            Some(Commands::List { limit, unreviewed }) => Some(Self::List {
                limit: *limit,
                unreviewed: *unreviewed,
            }),
            Some(Commands::Review { keys }) => Some(Self::Review { keys }),
            Some(Commands::Edit {
                key,
                content,
                description,
                tag,
                add_tag,
                remove_tag,
            }) => Some(Self::Edit {
                key,
                content,
                description,
                tags: tag,
                add_tag,
                remove_tag,
            }),
            Some(Commands::Delete { keys, force }) => Some(Self::Delete {
                keys,
                force: *force,
            }),
            Some(Commands::Session) => Some(Self::Session),
            Some(Commands::Export { output }) => Some(Self::Export { output }),
            Some(Commands::Config { .. }) | Some(Commands::Completions { .. }) | None => None,
        }
    }
}

impl StoreCommand for StoreDispatch<'_> {
    async fn execute(&self, ctx: &CommandContext, store: &VocabularyStore) -> Result<()> {
        match self {
            Self::Query { text } => {
                let opts = commands::query::QueryOptions { text: text.clone() };
                commands::query::execute(ctx, &opts, store).await
            }
            Self::Add {
                content,
                description,
                tags,
            } => {
                let opts = commands::add::AddOptions {
                    content: content.to_string(),
                    description: (*description).clone(),
                    tags: tags.to_vec(),
                };
                commands::add::execute(ctx, &opts, store).await
            }
            Self::List { limit, unreviewed } => {
                let opts = commands::list::ListOptions {
                    limit: *limit,
                    unreviewed: *unreviewed,
                };
                commands::list::execute(ctx, &opts, store).await
            }
            Self::Review { keys } => {
                let opts = commands::review::ReviewOptions {
                    keys: keys.to_vec(),
                };
                commands::review::execute(ctx, &opts, store).await
            }
            Self::Edit {
                key,
                content,
                description,
                tags,
                add_tag,
                remove_tag,
            } => {
                let opts = commands::edit::EditOptions {
                    key: key.to_string(),
                    content: (*content).clone(),
                    description: (*description).clone(),
                    tags: tags.to_vec(),
                    add_tag: (*add_tag).clone(),
                    remove_tag: (*remove_tag).clone(),
                };
                commands::edit::execute(ctx, &opts, store).await
            }
            Self::Delete { keys, force } => {
                let opts = commands::delete::DeleteOptions {
                    keys: keys.to_vec(),
                    force: *force,
                };
                commands::delete::execute(ctx, &opts, store).await
            }
            Self::Session => commands::session::execute(ctx, store).await,
            Self::Export { output } => {
                let opts = commands::export::ExportOptions {
                    output: (*output).clone(),
                };
                commands::export::execute(ctx, &opts, store).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_local_commands() {
        let cli = Cli::parse_from(["vocab", "config", "path"]);
        assert!(matches!(
            LocalDispatch::try_from_cli(&cli),
            Some(LocalDispatch::Config(Some(ConfigCommands::Path)))
        ));

        let cli = Cli::parse_from(["vocab"]);
        assert!(matches!(LocalDispatch::try_from_cli(&cli), Some(LocalDispatch::Help)));

        let cli = Cli::parse_from(["vocab", "list"]);
        assert!(LocalDispatch::try_from_cli(&cli).is_none());
    }

    #[test]
    fn test_query_text_falls_back_to_config_default() {
        let mut config = Config::default();
        config.query.default = Some("not reviewed | shuffle".to_string());

        let cli = Cli::parse_from(["vocab", "query"]);
        match StoreDispatch::from_cli(&cli, &config) {
            Some(StoreDispatch::Query { text }) => assert_eq!(text, "not reviewed | shuffle"),
            _ => panic!("expected query dispatch"),
        }

        let cli = Cli::parse_from(["vocab", "query", "#verb"]);
        match StoreDispatch::from_cli(&cli, &config) {
            Some(StoreDispatch::Query { text }) => assert_eq!(text, "#verb"),
            _ => panic!("expected query dispatch"),
        }

        let cli = Cli::parse_from(["vocab", "query"]);
        match StoreDispatch::from_cli(&cli, &Config::default()) {
            Some(StoreDispatch::Query { text }) => assert_eq!(text, ""),
            _ => panic!("expected query dispatch"),
        }
    }

    #[test]
    fn test_store_commands() {
        let config = Config::default();
        let cli = Cli::parse_from(["vocab", "session"]);
        assert!(matches!(
            StoreDispatch::from_cli(&cli, &config),
            Some(StoreDispatch::Session)
        ));

        let cli = Cli::parse_from(["vocab", "completions", "bash"]);
        assert!(StoreDispatch::from_cli(&cli, &config).is_none());
    }
}
