//! The data client shared by every request.
//!
//! Users and posts live in memory behind a single `RwLock`. When a data file
//! is configured, every committed write is followed by an atomic JSON snapshot
//! of both tables, so a restart picks up where the last process left off.
//!
//! Other processes (a running server and a `blogql mutate`, say) may share
//! the data file. Reads reload the tables when the file has been replaced,
//! and writes reload, apply and save while holding `<file>.lock`.
//!
//! ## Snapshot format
//!
//! ```json
//! {
//!   "users": [{ "id": "...", "name": "Alice", "email": "alice@prisma.io" }],
//!   "posts": [{ "id": "...", "created_at": "...", "updated_at": "...",
//!               "title": "Hello", "published": true, "author_id": "..." }]
//! }
//! ```
//!
//! ## Components
//!
//! - [`Store`]: typed find/create/update/delete calls on users and posts

mod client;
mod snapshot;

pub use client::Store;
