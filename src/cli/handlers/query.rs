use std::sync::Arc;

use anyhow::Result;

use super::CommandContext;
use super::utils::parse_variables;
use crate::graphql::{AuthPolicy, RequestContext, build_schema, execute};

pub fn handle_query(ctx: CommandContext, query: String, variables: Option<String>) -> Result<()> {
    run_document(ctx, query, variables)
}

/// Executes a document against the configured store and prints the response.
///
/// The configured auth token is presented on the caller's behalf: the CLI
/// already has direct access to the data file.
pub(super) fn run_document(
    ctx: CommandContext,
    document: String,
    variables: Option<String>,
) -> Result<()> {
    let vars = parse_variables(variables)?;
    let store = Arc::new(ctx.open_store()?);
    let schema = build_schema(AuthPolicy::from_settings(&ctx.config.auth));
    let request_ctx = RequestContext::new(store.clone()).with_token(ctx.config.auth.token.clone());

    let request = async_graphql::Request::new(document).variables(vars);
    let response = tokio::runtime::Runtime::new()?.block_on(async {
        let response = execute(&schema, request_ctx, request).await;
        store.close().await.map(|_| response)
    })?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
