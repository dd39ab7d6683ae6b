use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "foosball elo rating backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 8080)
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
    /// Drop and re-create the database schema
    Reset,
}
