use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default)]
    pub published: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

impl Post {
    pub fn new(id: String, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
            title,
            content: None,
            published: false,
            author_id: None,
        }
    }

    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    pub fn with_author(mut self, author_id: Option<String>) -> Self {
        self.author_id = author_id;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Data for creating a post. The author is supplied separately by the caller.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: Option<String>,
    pub published: bool,
}

impl NewPost {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }
}

/// Conditions for `find_posts`; every condition that is set must hold.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub published: Option<bool>,
    pub author_id: Option<String>,
    /// Matches when the title or the content contains the needle (case-sensitive).
    pub text_contains: Option<String>,
}

impl PostFilter {
    pub fn published() -> Self {
        Self {
            published: Some(true),
            ..Self::default()
        }
    }

    pub fn by_author(author_id: impl Into<String>) -> Self {
        Self {
            author_id: Some(author_id.into()),
            ..Self::default()
        }
    }

    pub fn text_contains(needle: Option<String>) -> Self {
        Self {
            text_contains: needle,
            ..Self::default()
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        if let Some(published) = self.published
            && post.published != published
        {
            return false;
        }
        if let Some(ref author_id) = self.author_id
            && post.author_id.as_deref() != Some(author_id.as_str())
        {
            return false;
        }
        if let Some(ref needle) = self.text_contains {
            let in_title = post.title.contains(needle.as_str());
            let in_content = post
                .content
                .as_deref()
                .is_some_and(|c| c.contains(needle.as_str()));
            if !in_title && !in_content {
                return false;
            }
        }
        true
    }
}
