use std::path::PathBuf;

use tokio::sync::RwLock;

use super::snapshot::{FileStamp, Snapshot, Tables};
use crate::{
    error::{BlogError, Result},
    model::{NewPost, NewUser, Post, PostFilter, User},
    validation,
};

/// Length of generated record ids.
const ID_LENGTH: usize = 25;

/// The tables as last seen, and the data file version they came from.
#[derive(Default)]
struct State {
    tables: Tables,
    stamp: Option<FileStamp>,
}

pub struct Store {
    state: RwLock<State>,
    snapshot: Option<Snapshot>,
}

impl Store {
    /// A store that keeps everything in memory and forgets it on exit.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(State::default()),
            snapshot: None,
        }
    }

    /// Opens the store, loading the data file when one is given.
    ///
    /// Several processes may open the same file: reads pick up their
    /// commits, and writes are serialized through the file lock.
    pub fn open(data_file: Option<PathBuf>) -> Result<Self> {
        let Some(path) = data_file else {
            tracing::info!("Opening in-memory store");
            return Ok(Self::in_memory());
        };

        let snapshot = Snapshot::new(path);
        let (tables, stamp) = snapshot.load()?;
        tracing::info!(
            path = %snapshot.path().display(),
            users = tables.users.len(),
            posts = tables.posts.len(),
            "Opened store"
        );

        Ok(Self {
            state: RwLock::new(State { tables, stamp }),
            snapshot: Some(snapshot),
        })
    }

    /// Releases the store. Every write is already on disk when it returns,
    /// so nothing is rewritten here.
    pub async fn close(&self) -> Result<()> {
        if let Some(ref snapshot) = self.snapshot {
            tracing::info!(path = %snapshot.path().display(), "Store closed");
        }
        Ok(())
    }

    pub async fn find_user(&self, id: &str) -> Result<Option<User>> {
        tracing::debug!(id = %id, "Finding user");
        self.refresh().await?;
        let state = self.state.read().await;
        Ok(state.tables.users.iter().find(|u| u.id == id).cloned())
    }

    pub async fn find_post(&self, id: &str) -> Result<Option<Post>> {
        tracing::debug!(id = %id, "Finding post");
        self.refresh().await?;
        let state = self.state.read().await;
        Ok(state.tables.posts.iter().find(|p| p.id == id).cloned())
    }

    pub async fn find_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        tracing::debug!(?filter, "Finding posts");
        self.refresh().await?;
        let state = self.state.read().await;
        Ok(state
            .tables
            .posts
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    /// Creates a user together with any nested posts, all or nothing.
    pub async fn create_user(&self, data: NewUser) -> Result<User> {
        tracing::info!(email = %data.email, posts = data.posts.len(), "Creating user");

        validation::validate_email(&data.email)?;
        validation::validate_name(data.name.as_deref())?;
        for post in &data.posts {
            validate_new_post(post)?;
        }

        self.write(|tables| {
            if tables.users.iter().any(|u| u.email == data.email) {
                return Err(BlogError::UniqueViolation {
                    model: "User",
                    field: "email",
                    value: data.email.clone(),
                });
            }

            let user = User::new(generate_id(tables), data.email).with_name(data.name);
            tables.users.push(user.clone());

            for new_post in data.posts {
                let post = build_post(generate_id(tables), new_post, Some(user.id.clone()));
                tables.posts.push(post);
            }

            Ok(user)
        })
        .await
    }

    /// Creates a post, connecting its author by email when one is given.
    pub async fn create_post(&self, data: NewPost, author_email: Option<&str>) -> Result<Post> {
        tracing::info!(title = %data.title, author = ?author_email, "Creating post");

        validate_new_post(&data)?;

        self.write(|tables| {
            let author_id = match author_email {
                Some(email) => match tables.users.iter().find(|u| u.email == email) {
                    Some(user) => Some(user.id.clone()),
                    None => {
                        return Err(BlogError::RelationNotFound {
                            relation: "author",
                            model: "User",
                            field: "email",
                            value: email.to_string(),
                        });
                    }
                },
                None => None,
            };

            let post = build_post(generate_id(tables), data, author_id);
            tables.posts.push(post.clone());
            Ok(post)
        })
        .await
    }

    /// Sets the published flag of a post and bumps its `updated_at`.
    pub async fn update_post(&self, id: &str, published: bool) -> Result<Post> {
        tracing::info!(id = %id, published, "Updating post");

        self.write(|tables| {
            let post = tables
                .posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| post_not_found(id))?;

            post.published = published;
            post.touch();

            Ok(post.clone())
        })
        .await
    }

    /// Deletes a post and returns it as it was.
    pub async fn delete_post(&self, id: &str) -> Result<Post> {
        tracing::info!(id = %id, "Deleting post");

        self.write(|tables| {
            let pos = tables
                .posts
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| post_not_found(id))?;
            Ok(tables.posts.remove(pos))
        })
        .await
    }

    /// Reloads the tables if another process replaced the data file.
    async fn refresh(&self) -> Result<()> {
        let Some(snapshot) = self.snapshot.clone() else {
            return Ok(());
        };

        let known = self.state.read().await.stamp;
        let on_disk = snapshot.clone();
        if blocking(move || on_disk.stamp()).await? == known {
            return Ok(());
        }

        let mut state = self.state.write().await;
        let (tables, stamp) = blocking(move || snapshot.load()).await?;
        tracing::debug!(
            users = tables.users.len(),
            posts = tables.posts.len(),
            "Reloaded store after external change"
        );
        *state = State { tables, stamp };
        Ok(())
    }

    /// Applies `op` to a copy of the latest committed tables and commits it
    /// only if both the operation and the snapshot write succeed.
    ///
    /// With a data file the whole reload-apply-save cycle runs under the
    /// file lock, so concurrent processes never overwrite each other.
    async fn write<T>(&self, op: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut state = self.state.write().await;

        let Some(snapshot) = self.snapshot.clone() else {
            let mut next = state.tables.clone();
            let out = op(&mut next)?;
            state.tables = next;
            return Ok(out);
        };

        let known = state.stamp;
        let locked = snapshot.clone();
        let (lock, fresh) = blocking(move || {
            let lock = locked.lock()?;
            let fresh = if locked.stamp()? != known {
                Some(locked.load()?)
            } else {
                None
            };
            Ok((lock, fresh))
        })
        .await?;

        if let Some((tables, stamp)) = fresh {
            tracing::debug!("Reloaded store before write");
            *state = State { tables, stamp };
        }

        let mut next = state.tables.clone();
        let out = op(&mut next)?;

        let (tables, stamp) = blocking(move || {
            let stamp = snapshot.save(&next)?;
            drop(lock);
            Ok((next, stamp))
        })
        .await?;
        *state = State { tables, stamp };
        Ok(out)
    }
}

/// Runs file I/O off the async worker threads.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BlogError::Storage(format!("Store I/O task failed: {}", e)))?
}

fn validate_new_post(post: &NewPost) -> Result<()> {
    validation::validate_title(&post.title)?;
    validation::validate_content(post.content.as_deref())
}

fn build_post(id: String, data: NewPost, author_id: Option<String>) -> Post {
    Post::new(id, data.title)
        .with_content(data.content)
        .with_published(data.published)
        .with_author(author_id)
}

fn post_not_found(id: &str) -> BlogError {
    BlogError::NotFound {
        model: "Post",
        field: "id",
        value: id.to_string(),
    }
}

/// Generates an id unused by either table.
fn generate_id(tables: &Tables) -> String {
    const ALPHABET: [char; 36] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
        'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    ];
    loop {
        let id = nanoid::format(nanoid::rngs::default, &ALPHABET, ID_LENGTH);
        let taken =
            tables.users.iter().any(|u| u.id == id) || tables.posts.iter().any(|p| p.id == id);
        if !taken {
            return id;
        }
    }
}
