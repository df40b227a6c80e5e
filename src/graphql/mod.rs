//! GraphQL schema and resolvers for blogql.
//!
//! Every exposed field is declared by hand on the types in this module; the
//! schema is built once at startup and shared by all requests.
//!
//! ## Usage
//!
//! ```bash
//! # Start the GraphQL server
//! blogql serve --port 4000
//!
//! # Execute a query from CLI
//! blogql query '{ feed { id title author { email } } }'
//!
//! # Execute a mutation from CLI
//! blogql mutate 'createDraft(title: "Hi", authorEmail: "alice@prisma.io") { id }'
//! ```
//!
//! ## Schema
//!
//! - **Queries**: `post`, `feed`, `filterPosts`
//! - **Mutations**: `signupUser`, `deleteOnePost`, `createDraft`, `publish`

mod context;
mod errors;
mod schema;
mod types;

pub use context::{AuthPolicy, RequestContext};
pub use errors::{ErrorFormatter, GRAPHQL_PARSE_FAILED, GRAPHQL_VALIDATION_FAILED, format_error};
pub use schema::{BlogSchema, MutationRoot, QueryRoot, build_schema, execute, write_sdl};
pub use types::*;
