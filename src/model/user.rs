use serde::{Deserialize, Serialize};

use super::post::NewPost;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub email: String,
}

impl User {
    pub fn new(id: String, email: String) -> Self {
        Self {
            id,
            name: None,
            email,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }
}

/// Data for creating a user, with posts to create alongside it.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub posts: Vec<NewPost>,
}

impl NewUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_posts(mut self, posts: Vec<NewPost>) -> Self {
        self.posts = posts;
        self
    }
}
