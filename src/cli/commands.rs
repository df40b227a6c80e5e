use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "blogql")]
#[command(
    author,
    version,
    about = "A small GraphQL API server for users, drafts and published posts"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (searches upward for blogql.toml by default)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the JSON data file (overrides config)
    #[arg(long, global = true, env = "BLOGQL_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write JSON logs to this file, rotated daily
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default blogql.toml in the current directory
    Init,

    /// Start the GraphQL HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "BLOGQL_PORT")]
        port: Option<u16>,

        /// Bearer token required for mutations
        #[arg(long, env = "BLOGQL_AUTH_TOKEN", hide_env_values = true)]
        auth_token: Option<String>,

        /// Do not serve GraphiQL on GET requests
        #[arg(long)]
        no_playground: bool,
    },

    /// Execute a GraphQL query
    Query {
        /// GraphQL query string
        query: String,

        /// Variables as JSON
        #[arg(long)]
        variables: Option<String>,
    },

    /// Execute a GraphQL mutation (automatically wraps in 'mutation { }')
    Mutate {
        /// Mutation body (without 'mutation' keyword)
        mutation: String,

        /// Variables as JSON
        #[arg(long)]
        variables: Option<String>,
    },

    /// Print the schema SDL, or write it to a file
    Schema {
        /// File to write instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_overrides_parse() {
        let cli = Cli::parse_from(["blogql", "serve", "--port", "8080", "--no-playground"]);
        match cli.command {
            Commands::Serve {
                port,
                no_playground,
                host,
                ..
            } => {
                assert_eq!(port, Some(8080));
                assert!(no_playground);
                assert_eq!(host, None);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["blogql", "query", "{ feed { id } }", "--data-file", "x.json"]);
        assert_eq!(cli.data_file, Some(PathBuf::from("x.json")));
        assert!(matches!(cli.command, Commands::Query { .. }));
    }
}
