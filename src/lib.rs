//! # blogql - a small GraphQL API server for a blog
//!
//! blogql serves users, drafts and published posts over GraphQL. Records
//! live in an in-process store that can snapshot itself to a JSON file.
//!
//! ## Features
//!
//! - **GraphQL API**: `post`, `feed`, `filterPosts`, `signupUser`,
//!   `deleteOnePost`, `createDraft` and `publish`
//! - **Uniform errors**: every error carries `extensions.code`
//! - **Optional auth**: mutations can require a bearer token
//! - **CLI**: run the server, execute documents, export the schema
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a default blogql.toml
//! blogql init
//!
//! # Start the server on http://127.0.0.1:4000/
//! blogql serve
//!
//! # Sign up a user and create a draft
//! blogql mutate 'signupUser(data: { email: "alice@prisma.io" }) { id }'
//! blogql mutate 'createDraft(title: "Hello", authorEmail: "alice@prisma.io") { id }'
//!
//! # Export the schema SDL
//! blogql schema --output schema.graphql
//! ```
//!
//! ## Modules
//!
//! - [`cli`]: Command-line interface definitions and handlers
//! - [`config`]: Configuration loading and management
//! - [`error`]: Error types and result aliases
//! - [`graphql`]: GraphQL schema, resolvers and error formatting
//! - [`model`]: Data models (User, Post)
//! - [`server`]: HTTP transport
//! - [`store`]: The shared data client
//! - [`validation`]: Column length limits

/// Command-line interface definitions using clap.
pub mod cli;

/// Configuration loading and management.
///
/// Handles `blogql.toml` configuration files and project discovery.
pub mod config;

/// Error types and result aliases.
///
/// Defines `BlogError` enum and `Result<T>` type alias.
pub mod error;

/// GraphQL schema and resolvers.
///
/// Provides async-graphql schema for querying and mutating posts.
pub mod graphql;

/// Data models for users and posts.
pub mod model;

pub mod logging;
pub mod server;

/// The data client shared by every request.
///
/// Keeps users and posts in memory and snapshots them to a JSON file.
pub mod store;

/// Input validation utilities.
///
/// Enforces the column length limits applied to every stored record.
pub mod validation;
