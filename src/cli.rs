use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "darts event import and player lookup")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Import every completed tournament matching a keyword
    Sync {
        /// Search keyword, 1 to 100 characters
        keyword: String,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find a player's matches in tournaments matching a keyword
    Lookup {
        keyword: String,
        /// Part of the player's display name, case-insensitive
        nickname: String,
        /// Maximum number of matches to return
        #[arg(short, long, default_value_t = 30)]
        cap: usize,
        /// Print the rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create the database schema if it does not exist
    InitDb,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_defaults_cap() {
        let cli = Cli::parse_from(["darts_sync", "lookup", "agawa", "Mirek"]);
        assert_eq!(
            cli.command,
            Command::Lookup {
                keyword: "agawa".to_string(),
                nickname: "Mirek".to_string(),
                cap: 30,
                json: false,
            }
        );
    }

    #[test]
    fn test_kebab_case_subcommand() {
        let cli = Cli::parse_from(["darts_sync", "init-db"]);
        assert_eq!(cli.command, Command::InitDb);
    }
}
