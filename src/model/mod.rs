//! Data models for blogql.
//!
//! This module defines the two record kinds owned by the store:
//!
//! - [`User`]: an author, identified by id and a unique email
//! - [`Post`]: a draft or published post, optionally linked to its author

mod post;
mod user;

pub use post::{NewPost, Post, PostFilter};
pub use user::{NewUser, User};
