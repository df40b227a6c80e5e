use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use super::CommandContext;
use crate::config::ServerSettings;
use crate::graphql::{AuthPolicy, build_schema, write_sdl};
use crate::server::{AppState, router, serve, shutdown_signal};

/// Command-line values that take precedence over `[server]` and `[auth]`.
#[derive(Debug, Default)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub auth_token: Option<String>,
    pub no_playground: bool,
}

impl ServeOverrides {
    fn apply(self, ctx: &mut CommandContext) {
        let server: &mut ServerSettings = &mut ctx.config.server;
        if let Some(host) = self.host {
            server.host = host;
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if self.no_playground {
            server.playground = false;
        }
        if self.auth_token.is_some() {
            ctx.config.auth.token = self.auth_token;
        }
    }
}

pub fn handle_serve(mut ctx: CommandContext, overrides: ServeOverrides) -> Result<()> {
    overrides.apply(&mut ctx);
    ctx.config.validate()?;

    let auth = AuthPolicy::from_settings(&ctx.config.auth);
    let schema = build_schema(auth.clone());
    if let Some(path) = ctx.config.schema_output(&ctx.root) {
        write_sdl(&schema, &path)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Wrote schema SDL");
    }

    let store = Arc::new(ctx.open_store()?);
    let settings = ctx.config.server.clone();
    let app = router(AppState::new(schema, store.clone()), &settings);

    println!(
        "{} GraphQL server on http://{}:{}{}",
        "Starting".green(),
        settings.host,
        settings.port,
        settings.path
    );
    if settings.playground {
        println!("GraphiQL: http://{}:{}{}", settings.host, settings.port, settings.path);
    }
    if auth.is_open() {
        tracing::warn!("No auth token configured; mutations are open to every caller");
    }

    tokio::runtime::Runtime::new()?.block_on(async {
        let listener = tokio::net::TcpListener::bind((settings.host.as_str(), settings.port))
            .await
            .with_context(|| format!("Failed to bind {}:{}", settings.host, settings.port))?;
        serve(listener, app, shutdown_signal()).await?;
        store.close().await?;
        tracing::info!("GraphQL server shut down");
        Ok::<_, anyhow::Error>(())
    })
}
