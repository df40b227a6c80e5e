use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::graphql::{AuthPolicy, build_schema, write_sdl};

pub fn handle_schema(output: Option<PathBuf>) -> Result<()> {
    let schema = build_schema(AuthPolicy::open());

    match output {
        Some(path) => {
            write_sdl(&schema, &path)
                .with_context(|| format!("Failed to write schema to {}", path.display()))?;
            println!("{} {}", "Wrote".green(), path.display());
        }
        None => print!("{}", schema.sdl()),
    }
    Ok(())
}
