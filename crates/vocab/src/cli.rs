//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the vocab CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// vocab - collect words and review them with a small query language
#[derive(Parser, Debug)]
#[command(name = "vocab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Vocabulary file (default: from config, or the XDG data directory)
    #[arg(long, global = true, env = "VOCAB_STORE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a query (insert, filter, session, dump)
    #[command(alias = "q")]
    Query {
        /// Query text (default: `query.default` from config, or every word)
        text: Option<String>,
    },

    /// Add a word
    #[command(alias = "a")]
    Add {
        /// Word content; parenthesized parts are optional, e.g. "run(ning)"
        content: String,

        /// Description or translation
        #[arg(short, long)]
        description: Option<String>,

        /// Add tag (repeatable)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tag: Vec<String>,
    },

    /// List words
    #[command(alias = "l")]
    List {
        /// Limit results
        #[arg(long)]
        limit: Option<usize>,

        /// Show only words not yet reviewed in this session
        #[arg(long)]
        unreviewed: bool,
    },

    /// Mark word(s) reviewed
    #[command(alias = "r")]
    Review {
        /// Word key(s): full key, unique prefix, or short key
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Edit a word
    #[command(alias = "e")]
    Edit {
        /// Word key
        key: String,

        /// Replace content
        #[arg(short, long)]
        content: Option<String>,

        /// Replace description
        #[arg(short, long)]
        description: Option<String>,

        /// Set tags (replaces existing)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tag: Vec<String>,

        /// Add tag
        #[arg(long, conflicts_with = "tag")]
        add_tag: Option<String>,

        /// Remove tag
        #[arg(long, conflicts_with = "tag")]
        remove_tag: Option<String>,
    },

    /// Delete word(s)
    #[command(alias = "rm")]
    Delete {
        /// Word key(s)
        #[arg(required = true)]
        keys: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Start a new review session
    Session,

    /// Export the whole collection as JSON
    Export {
        /// Output file (default: <timestamp>.json, "-" for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// View and edit configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["vocab", "--verbose", "list"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert!(!cli.json);

        let cli = Cli::parse_from(["vocab", "--quiet", "--json", "list"]);
        assert!(!cli.verbose);
        assert!(cli.quiet);
        assert!(cli.json);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["vocab", "-v", "-q", "list"]).is_err());
    }

    #[test]
    fn test_store_flag() {
        let cli = Cli::parse_from(["vocab", "--store", "/tmp/words.json", "list"]);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/words.json")));
    }

    #[test]
    fn test_query_alias_and_optional_text() {
        let cli = Cli::parse_from(["vocab", "q", "#verb | limit(5)"]);
        match cli.command {
            Some(Commands::Query { text }) => assert_eq!(text.as_deref(), Some("#verb | limit(5)")),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::parse_from(["vocab", "query"]);
        assert!(matches!(cli.command, Some(Commands::Query { text: None })));
    }

    #[test]
    fn test_add_with_tags() {
        let cli = Cli::parse_from([
            "vocab", "add", "run(ning)", "-d", "to move fast", "-t", "verb", "--tag", "sport",
        ]);
        match cli.command {
            Some(Commands::Add {
                content,
                description,
                tag,
            }) => {
                assert_eq!(content, "run(ning)");
                assert_eq!(description.as_deref(), Some("to move fast"));
                assert_eq!(tag, vec!["verb", "sport"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_review_requires_key() {
        assert!(Cli::try_parse_from(["vocab", "review"]).is_err());

        let cli = Cli::parse_from(["vocab", "r", "abc", "def"]);
        match cli.command {
            Some(Commands::Review { keys }) => assert_eq!(keys, vec!["abc", "def"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_edit_tag_conflicts() {
        assert!(
            Cli::try_parse_from(["vocab", "edit", "abc", "--tag", "a", "--add-tag", "b"]).is_err()
        );
        let cli = Cli::parse_from(["vocab", "edit", "abc", "--add-tag", "b", "--remove-tag", "c"]);
        assert!(matches!(cli.command, Some(Commands::Edit { .. })));
    }

    #[test]
    fn test_delete_alias_and_force() {
        let cli = Cli::parse_from(["vocab", "rm", "abc", "-f"]);
        match cli.command {
            Some(Commands::Delete { keys, force }) => {
                assert_eq!(keys, vec!["abc"]);
                assert!(force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_set() {
        let cli = Cli::parse_from(["vocab", "config", "set", "output.color", "false"]);
        if let Some(Commands::Config {
            command: Some(ConfigCommands::Set { key, value }),
        }) = cli.command
        {
            assert_eq!(key, "output.color");
            assert_eq!(value, "false");
        } else {
            panic!("expected config set");
        }
    }

    #[test]
    fn test_completions_shell() {
        let cli = Cli::parse_from(["vocab", "completions", "zsh"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Completions { shell: Shell::Zsh })
        ));
    }
}
