use std::path::Path;

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, ID, Object, Request, Response, Schema,
};

use super::context::{AuthPolicy, RequestContext};
use super::errors::ErrorFormatter;
use super::types::*;
use crate::model::{NewPost, PostFilter};

pub type BlogSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(auth: AuthPolicy) -> BlogSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(auth)
        .extension(ErrorFormatter)
        .finish()
}

/// Writes the schema SDL to `path`, creating parent directories.
pub fn write_sdl(schema: &BlogSchema, path: &Path) -> crate::error::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, schema.sdl())?;
    Ok(())
}

/// Runs one request with its per-request context attached.
pub async fn execute(schema: &BlogSchema, ctx: RequestContext, request: Request) -> Response {
    schema.execute(request.data(ctx)).await
}

pub(crate) fn request_context<'a>(
    ctx: &Context<'a>,
) -> async_graphql::Result<&'a RequestContext> {
    ctx.data::<RequestContext>()
}

/// Rejects the call unless the request may run mutations.
fn authorize(ctx: &Context<'_>) -> async_graphql::Result<()> {
    let Some(policy) = ctx.data_opt::<AuthPolicy>() else {
        return Ok(());
    };
    let token = request_context(ctx)?.token.as_deref();
    policy.authorize(token).map_err(|e| e.extend())
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Get a single post by ID
    async fn post(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "where")] filter: PostWhereUniqueInput,
    ) -> async_graphql::Result<Option<Post>> {
        let store = &request_context(ctx)?.store;
        let post = store.find_post(&filter.id).await.map_err(|e| e.extend())?;
        Ok(post.map(|p| p.into()))
    }

    /// All published posts
    async fn feed(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Post>> {
        let store = &request_context(ctx)?.store;
        let posts = store
            .find_posts(&PostFilter::published())
            .await
            .map_err(|e| e.extend())?;
        Ok(posts.into_iter().map(|p| p.into()).collect())
    }

    /// Posts whose title or content contains the search string
    async fn filter_posts(
        &self,
        ctx: &Context<'_>,
        search_string: Option<String>,
    ) -> async_graphql::Result<Vec<Post>> {
        let store = &request_context(ctx)?.store;
        let posts = store
            .find_posts(&PostFilter::text_contains(search_string))
            .await
            .map_err(|e| e.extend())?;
        Ok(posts.into_iter().map(|p| p.into()).collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a new user
    async fn signup_user(
        &self,
        ctx: &Context<'_>,
        data: UserCreateInput,
    ) -> async_graphql::Result<User> {
        authorize(ctx)?;
        let store = &request_context(ctx)?.store;
        let user = store.create_user(data.into()).await.map_err(|e| e.extend())?;
        Ok(user.into())
    }

    /// Delete a post permanently
    async fn delete_one_post(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "where")] filter: PostWhereUniqueInput,
    ) -> async_graphql::Result<Option<Post>> {
        authorize(ctx)?;
        let store = &request_context(ctx)?.store;
        let post = store.delete_post(&filter.id).await.map_err(|e| e.extend())?;
        Ok(Some(post.into()))
    }

    /// Create an unpublished post for the user with the given email
    async fn create_draft(
        &self,
        ctx: &Context<'_>,
        title: String,
        content: Option<String>,
        author_email: String,
    ) -> async_graphql::Result<Post> {
        authorize(ctx)?;
        let store = &request_context(ctx)?.store;
        let draft = NewPost::new(title).with_content(content);
        let post = store
            .create_post(draft, Some(author_email.as_str()))
            .await
            .map_err(|e| e.extend())?;
        Ok(post.into())
    }

    /// Publish a post; null when no post has the given ID
    async fn publish(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<Post>> {
        authorize(ctx)?;
        let store = &request_context(ctx)?.store;
        match store.update_post(&id, true).await {
            Ok(post) => Ok(Some(post.into())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.extend()),
        }
    }
}
