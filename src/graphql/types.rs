use async_graphql::{ComplexObject, Context, ErrorExtensions, ID, InputObject, SimpleObject};
use chrono::{DateTime, Utc};

use super::schema::request_context;
use crate::model::{NewPost, NewUser, Post as ModelPost, PostFilter, User as ModelUser};

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct User {
    pub id: ID,
    pub name: Option<String>,
    pub email: String,
}

impl From<ModelUser> for User {
    fn from(u: ModelUser) -> Self {
        Self {
            id: ID(u.id),
            name: u.name,
            email: u.email,
        }
    }
}

#[ComplexObject]
impl User {
    /// Posts written by this user
    async fn posts(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Post>> {
        let store = &request_context(ctx)?.store;
        let posts = store
            .find_posts(&PostFilter::by_author(self.id.as_str()))
            .await
            .map_err(|e| e.extend())?;
        Ok(posts.into_iter().map(|p| p.into()).collect())
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Post {
    pub id: ID,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub content: Option<String>,
    pub published: bool,
    #[graphql(skip)]
    pub author_id: Option<String>,
}

impl From<ModelPost> for Post {
    fn from(p: ModelPost) -> Self {
        Self {
            id: ID(p.id),
            created_at: p.created_at,
            updated_at: p.updated_at,
            title: p.title,
            content: p.content,
            published: p.published,
            author_id: p.author_id,
        }
    }
}

#[ComplexObject]
impl Post {
    async fn author(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<User>> {
        let Some(ref author_id) = self.author_id else {
            return Ok(None);
        };
        let store = &request_context(ctx)?.store;
        let user = store.find_user(author_id).await.map_err(|e| e.extend())?;
        Ok(user.map(|u| u.into()))
    }
}

#[derive(InputObject)]
pub struct PostWhereUniqueInput {
    pub id: ID,
}

#[derive(InputObject)]
pub struct UserCreateInput {
    pub email: String,
    pub name: Option<String>,
    pub posts: Option<PostCreateManyWithoutAuthorInput>,
}

impl From<UserCreateInput> for NewUser {
    fn from(input: UserCreateInput) -> Self {
        let posts = input
            .posts
            .and_then(|p| p.create)
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.into())
            .collect();
        let user = NewUser::new(input.email).with_posts(posts);
        match input.name {
            Some(name) => user.with_name(name),
            None => user,
        }
    }
}

#[derive(InputObject)]
pub struct PostCreateManyWithoutAuthorInput {
    pub create: Option<Vec<PostCreateWithoutAuthorInput>>,
}

#[derive(InputObject)]
pub struct PostCreateWithoutAuthorInput {
    pub title: String,
    pub content: Option<String>,
    pub published: Option<bool>,
}

impl From<PostCreateWithoutAuthorInput> for NewPost {
    fn from(input: PostCreateWithoutAuthorInput) -> Self {
        NewPost::new(input.title)
            .with_content(input.content)
            .with_published(input.published.unwrap_or(false))
    }
}
