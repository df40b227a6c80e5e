use std::sync::Arc;

use async_graphql::extensions::{
    Extension, ExtensionContext, ExtensionFactory, NextParseQuery, NextRequest, NextValidation,
};
use async_graphql::parser::types::ExecutableDocument;
use async_graphql::{
    ErrorExtensionValues, ErrorExtensions, Response, ServerError, ServerResult, ValidationResult,
    Value, Variables,
};

use crate::error::{BlogError, INTERNAL_SERVER_ERROR};

/// Code for documents that fail to parse.
pub const GRAPHQL_PARSE_FAILED: &str = "GRAPHQL_PARSE_FAILED";

/// Code for documents that parse but do not validate against the schema.
pub const GRAPHQL_VALIDATION_FAILED: &str = "GRAPHQL_VALIDATION_FAILED";

impl ErrorExtensions for BlogError {
    fn extend(&self) -> async_graphql::Error {
        let err = async_graphql::Error::new(self.to_string());
        match self.code() {
            Some(code) => err.extend_with(|_, e| e.set("code", code.to_string())),
            None => err,
        }
    }
}

/// Reduces every response error to `{ message, locations, path, extensions: { code } }`.
///
/// Errors without a string `code` get [`INTERNAL_SERVER_ERROR`] and are
/// logged here, once per error.
pub struct ErrorFormatter;

impl ExtensionFactory for ErrorFormatter {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(ErrorFormatterExtension)
    }
}

struct ErrorFormatterExtension;

#[async_trait::async_trait]
impl Extension for ErrorFormatterExtension {
    async fn request(&self, ctx: &ExtensionContext<'_>, next: NextRequest<'_>) -> Response {
        let mut response = next.run(ctx).await;
        response.errors = response.errors.into_iter().map(format_error).collect();
        response
    }

    async fn parse_query(
        &self,
        ctx: &ExtensionContext<'_>,
        query: &str,
        variables: &Variables,
        next: NextParseQuery<'_>,
    ) -> ServerResult<ExecutableDocument> {
        next.run(ctx, query, variables)
            .await
            .map_err(|err| with_default_code(err, GRAPHQL_PARSE_FAILED))
    }

    async fn validation(
        &self,
        ctx: &ExtensionContext<'_>,
        next: NextValidation<'_>,
    ) -> Result<ValidationResult, Vec<ServerError>> {
        next.run(ctx).await.map_err(|errors| {
            errors
                .into_iter()
                .map(|err| with_default_code(err, GRAPHQL_VALIDATION_FAILED))
                .collect()
        })
    }
}

fn error_code(err: &ServerError) -> Option<&str> {
    match err.extensions.as_ref()?.get("code")? {
        Value::String(code) => Some(code.as_str()),
        _ => None,
    }
}

fn with_default_code(mut err: ServerError, code: &str) -> ServerError {
    if error_code(&err).is_none() {
        err.extensions
            .get_or_insert_with(ErrorExtensionValues::default)
            .set("code", code.to_string());
    }
    err
}

/// Applies the client-facing error shape to one error.
pub fn format_error(mut err: ServerError) -> ServerError {
    let code = error_code(&err)
        .unwrap_or(INTERNAL_SERVER_ERROR)
        .to_string();

    if code == INTERNAL_SERVER_ERROR {
        tracing::error!(
            message = %err.message,
            path = ?err.path,
            locations = ?err.locations,
            "INTERNAL_SERVER_ERROR"
        );
    }

    let mut extensions = ErrorExtensionValues::default();
    extensions.set("code", code);
    err.extensions = Some(extensions);
    err
}
