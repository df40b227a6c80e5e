use anyhow::{Context, Result};

/// Parse `--variables` JSON, defaulting to no variables
pub fn parse_variables(variables: Option<String>) -> Result<async_graphql::Variables> {
    match variables {
        Some(v) => serde_json::from_str(&v).context("Invalid --variables JSON"),
        None => Ok(async_graphql::Variables::default()),
    }
}
