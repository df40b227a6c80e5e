use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use blogql::cli::handlers::{self, CommandContext, ServeOverrides};
use blogql::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    blogql::logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Init => handlers::handle_init(),
        Commands::Schema { output } => handlers::handle_schema(output),
        Commands::Serve {
            host,
            port,
            auth_token,
            no_playground,
        } => {
            let ctx = load_context(cli.config.as_deref(), cli.data_file.clone())?;
            handlers::handle_serve(
                ctx,
                ServeOverrides {
                    host,
                    port,
                    auth_token,
                    no_playground,
                },
            )
        }
        Commands::Query { query, variables } => {
            let ctx = load_context(cli.config.as_deref(), cli.data_file.clone())?;
            handlers::handle_query(ctx, query, variables)
        }
        Commands::Mutate {
            mutation,
            variables,
        } => {
            let ctx = load_context(cli.config.as_deref(), cli.data_file.clone())?;
            handlers::handle_mutate(ctx, mutation, variables)
        }
    }
}

fn load_context(config: Option<&Path>, data_file: Option<PathBuf>) -> Result<CommandContext> {
    Ok(CommandContext::load(config)?.with_data_file(data_file))
}
