use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_graphql::{Request, Variables};
use blogql::graphql::{AuthPolicy, BlogSchema, RequestContext, build_schema, execute};
use blogql::store::Store;
use serde_json::{Value, json};
use tracing_subscriber::layer::SubscriberExt;

struct Harness {
    schema: BlogSchema,
    store: Arc<Store>,
}

impl Harness {
    fn new() -> Self {
        Self::with_policy(AuthPolicy::open())
    }

    fn with_policy(policy: AuthPolicy) -> Self {
        Self {
            schema: build_schema(policy),
            store: Arc::new(Store::in_memory()),
        }
    }

    async fn run(&self, query: &str) -> Value {
        self.run_with(query, json!({}), None).await
    }

    async fn run_with(&self, query: &str, variables: Value, token: Option<&str>) -> Value {
        let request = Request::new(query).variables(Variables::from_json(variables));
        let ctx = RequestContext::new(self.store.clone()).with_token(token.map(String::from));
        let response = execute(&self.schema, ctx, request).await;
        serde_json::to_value(&response).unwrap()
    }

    async fn signup(&self, email: &str) -> String {
        let res = self
            .run_with(
                "mutation($email: String!) { signupUser(data: { email: $email }) { id } }",
                json!({ "email": email }),
                None,
            )
            .await;
        assert_no_errors(&res);
        res["data"]["signupUser"]["id"].as_str().unwrap().to_string()
    }

    async fn draft(&self, title: &str, content: Option<&str>, author_email: &str) -> String {
        let res = self
            .run_with(
                "mutation($title: String!, $content: String, $email: String!) {
                    createDraft(title: $title, content: $content, authorEmail: $email) { id }
                }",
                json!({ "title": title, "content": content, "email": author_email }),
                None,
            )
            .await;
        assert_no_errors(&res);
        res["data"]["createDraft"]["id"].as_str().unwrap().to_string()
    }

    async fn publish(&self, id: &str) -> Value {
        self.run_with(
            "mutation($id: ID!) { publish(id: $id) { id published } }",
            json!({ "id": id }),
            None,
        )
        .await
    }
}

fn assert_no_errors(res: &Value) {
    assert!(res.get("errors").is_none(), "unexpected errors: {}", res);
}

fn first_error_code(res: &Value) -> &str {
    res["errors"][0]["extensions"]["code"].as_str().unwrap()
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_feed_contains_only_published_posts() {
    let h = Harness::new();
    h.signup("alice@prisma.io").await;
    let published = h.draft("Published", None, "alice@prisma.io").await;
    let unpublished = h.draft("Unpublished", None, "alice@prisma.io").await;
    assert_no_errors(&h.publish(&published).await);

    let res = h.run("{ feed { id published } }").await;
    assert_no_errors(&res);

    let feed = ids(&res["data"]["feed"]);
    assert!(feed.contains(&published));
    assert!(!feed.contains(&unpublished));
    assert!(
        res["data"]["feed"]
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["published"] == true)
    );
}

#[tokio::test]
async fn test_filter_posts_matches_title_or_content() {
    let h = Harness::new();
    h.signup("alice@prisma.io").await;
    let in_title = h.draft("hello world", None, "alice@prisma.io").await;
    let in_content = h
        .draft("Greeting", Some("well hello there"), "alice@prisma.io")
        .await;
    let neither = h.draft("Farewell", Some("goodbye"), "alice@prisma.io").await;

    let res = h
        .run(r#"{ filterPosts(searchString: "hello") { id } }"#)
        .await;
    assert_no_errors(&res);

    let found = ids(&res["data"]["filterPosts"]);
    assert_eq!(found, vec![in_title, in_content]);
    assert!(!found.contains(&neither));
}

#[tokio::test]
async fn test_filter_posts_without_search_string_returns_everything() {
    let h = Harness::new();
    h.signup("alice@prisma.io").await;
    h.draft("One", None, "alice@prisma.io").await;
    h.draft("Two", None, "alice@prisma.io").await;

    let res = h.run("{ filterPosts { id } }").await;
    assert_eq!(res["data"]["filterPosts"].as_array().unwrap().len(), 2);

    let res = h.run("{ filterPosts(searchString: null) { id } }").await;
    assert_eq!(res["data"]["filterPosts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_post_by_id_and_missing_post() {
    let h = Harness::new();
    h.signup("alice@prisma.io").await;
    let id = h.draft("Findable", Some("body"), "alice@prisma.io").await;

    let res = h
        .run_with(
            "query($id: ID!) { post(where: { id: $id }) { id title content published createdAt updatedAt } }",
            json!({ "id": id }),
            None,
        )
        .await;
    assert_no_errors(&res);
    assert_eq!(res["data"]["post"]["title"], "Findable");
    assert_eq!(res["data"]["post"]["content"], "body");
    assert!(res["data"]["post"]["createdAt"].is_string());

    let res = h.run(r#"{ post(where: { id: "missing" }) { id } }"#).await;
    assert_no_errors(&res);
    assert_eq!(res["data"]["post"], Value::Null);
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_create_draft_connects_author() {
    let h = Harness::new();
    let alice = h.signup("a@x.com").await;

    let res = h
        .run(
            r#"mutation {
                createDraft(title: "T", authorEmail: "a@x.com") {
                    title content published author { id email posts { title } }
                }
            }"#,
        )
        .await;
    assert_no_errors(&res);

    let post = &res["data"]["createDraft"];
    assert_eq!(post["title"], "T");
    assert_eq!(post["content"], Value::Null);
    assert_eq!(post["published"], false);
    assert_eq!(post["author"]["id"], alice.as_str());
    assert_eq!(post["author"]["email"], "a@x.com");
    assert_eq!(post["author"]["posts"][0]["title"], "T");
}

#[tokio::test]
async fn test_create_draft_with_unknown_author_is_classified() {
    let h = Harness::new();

    let res = h
        .run(r#"mutation { createDraft(title: "T", authorEmail: "nobody@x.com") { id } }"#)
        .await;

    assert_eq!(first_error_code(&res), "RELATION_NOT_FOUND");
    assert_eq!(res["errors"][0]["path"], json!(["createDraft"]));

    let res = h.run("{ filterPosts { id } }").await;
    assert_eq!(res["data"]["filterPosts"], json!([]));
}

#[tokio::test]
async fn test_create_draft_accepts_empty_and_blank_titles() {
    let h = Harness::new();
    h.signup("a@x.com").await;

    for title in ["", "   "] {
        let res = h
            .run_with(
                r#"mutation($title: String!) {
                    createDraft(title: $title, authorEmail: "a@x.com") { title published }
                }"#,
                json!({ "title": title }),
                None,
            )
            .await;
        assert_no_errors(&res);
        assert_eq!(res["data"]["createDraft"]["title"], title);
    }
}

#[tokio::test]
async fn test_signup_user_accepts_any_email_string() {
    let h = Harness::new();

    let res = h
        .run(r#"mutation { signupUser(data: { email: "alice" }) { email } }"#)
        .await;

    assert_no_errors(&res);
    assert_eq!(res["data"]["signupUser"]["email"], "alice");
}

#[tokio::test]
async fn test_over_long_title_is_bad_user_input() {
    let h = Harness::new();
    h.signup("a@x.com").await;

    let res = h
        .run_with(
            r#"mutation($title: String!) { createDraft(title: $title, authorEmail: "a@x.com") { id } }"#,
            json!({ "title": "a".repeat(blogql::validation::MAX_TITLE_LENGTH + 1) }),
            None,
        )
        .await;

    assert_eq!(first_error_code(&res), "BAD_USER_INPUT");
}

#[tokio::test]
async fn test_publish_missing_post_returns_null() {
    let h = Harness::new();

    let res = h.publish("missing").await;

    assert_no_errors(&res);
    assert_eq!(res["data"]["publish"], Value::Null);
}

#[tokio::test]
async fn test_publish_sets_flag_and_bumps_updated_at() {
    let h = Harness::new();
    h.signup("a@x.com").await;
    let id = h.draft("Soon", None, "a@x.com").await;

    let before = h
        .run_with(
            "query($id: ID!) { post(where: { id: $id }) { createdAt updatedAt } }",
            json!({ "id": id }),
            None,
        )
        .await;

    let res = h
        .run_with(
            "mutation($id: ID!) { publish(id: $id) { published createdAt updatedAt } }",
            json!({ "id": id }),
            None,
        )
        .await;
    assert_no_errors(&res);

    let published = &res["data"]["publish"];
    assert_eq!(published["published"], true);
    assert_eq!(published["createdAt"], before["data"]["post"]["createdAt"]);

    let parse = |v: &Value| {
        chrono::DateTime::parse_from_rfc3339(v.as_str().unwrap()).unwrap()
    };
    assert!(parse(&published["updatedAt"]) >= parse(&before["data"]["post"]["updatedAt"]));
}

#[tokio::test]
async fn test_delete_one_post_removes_post() {
    let h = Harness::new();
    h.signup("a@x.com").await;
    let id = h.draft("Doomed", None, "a@x.com").await;

    let res = h
        .run_with(
            "mutation($id: ID!) { deleteOnePost(where: { id: $id }) { id title } }",
            json!({ "id": id }),
            None,
        )
        .await;
    assert_no_errors(&res);
    assert_eq!(res["data"]["deleteOnePost"]["title"], "Doomed");

    let res = h
        .run_with(
            "query($id: ID!) { post(where: { id: $id }) { id } }",
            json!({ "id": id }),
            None,
        )
        .await;
    assert_no_errors(&res);
    assert_eq!(res["data"]["post"], Value::Null);
}

#[tokio::test]
async fn test_delete_one_post_missing_is_not_found() {
    let h = Harness::new();

    let res = h
        .run(r#"mutation { deleteOnePost(where: { id: "missing" }) { id } }"#)
        .await;

    assert_eq!(first_error_code(&res), "NOT_FOUND");
    assert_eq!(res["data"]["deleteOnePost"], Value::Null);
}

#[tokio::test]
async fn test_signup_user_with_nested_posts() {
    let h = Harness::new();

    let res = h
        .run(
            r#"mutation {
                signupUser(data: {
                    email: "bob@prisma.io",
                    name: "Bob",
                    posts: { create: [
                        { title: "Live", published: true },
                        { title: "Hidden", content: "wip" }
                    ] }
                }) { name email posts { title published author { email } } }
            }"#,
        )
        .await;
    assert_no_errors(&res);

    let user = &res["data"]["signupUser"];
    assert_eq!(user["name"], "Bob");
    assert_eq!(user["posts"].as_array().unwrap().len(), 2);
    assert_eq!(user["posts"][0]["published"], true);
    assert_eq!(user["posts"][1]["published"], false);
    assert_eq!(user["posts"][1]["author"]["email"], "bob@prisma.io");

    let res = h.run("{ feed { title } }").await;
    assert_eq!(res["data"]["feed"], json!([{ "title": "Live" }]));
}

#[tokio::test]
async fn test_signup_user_duplicate_email_is_conflict() {
    let h = Harness::new();
    h.signup("alice@prisma.io").await;

    let res = h
        .run(r#"mutation { signupUser(data: { email: "alice@prisma.io" }) { id } }"#)
        .await;

    assert_eq!(first_error_code(&res), "CONFLICT");
}

// =============================================================================
// Error formatting
// =============================================================================

#[tokio::test]
async fn test_error_envelope_has_fixed_shape() {
    let h = Harness::new();

    let res = h
        .run(r#"mutation { deleteOnePost(where: { id: "missing" }) { id } }"#)
        .await;

    let err = res["errors"][0].as_object().unwrap();
    let mut keys: Vec<&str> = err.keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["extensions", "locations", "message", "path"]);
    assert_eq!(err["extensions"], json!({ "code": "NOT_FOUND" }));
    assert_eq!(err["locations"][0]["line"], 1);
}

#[tokio::test]
async fn test_uncoded_resolver_error_is_internal() {
    let h = Harness::new();

    // No RequestContext attached, so the resolver cannot reach the store
    let response = h.schema.execute(Request::new("{ feed { id } }")).await;
    let res = serde_json::to_value(&response).unwrap();

    assert_eq!(first_error_code(&res), "INTERNAL_SERVER_ERROR");
    assert_eq!(res["errors"][0]["path"], json!(["feed"]));
}

#[tokio::test]
async fn test_parse_and_validation_failures_have_codes() {
    let h = Harness::new();

    let res = h.run("{ feed { id ").await;
    assert_eq!(first_error_code(&res), "GRAPHQL_PARSE_FAILED");

    let res = h.run("{ feed { nonexistent } }").await;
    assert_eq!(first_error_code(&res), "GRAPHQL_VALIDATION_FAILED");

    let res = h.run("mutation { createDraft(title: \"T\") { id } }").await;
    assert_eq!(first_error_code(&res), "GRAPHQL_VALIDATION_FAILED");
}

struct ErrorEventCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorEventCounter {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_error_events(query: &'static str, with_context: bool) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorEventCounter(count.clone()));

    tracing::subscriber::with_default(subscriber, || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let h = Harness::new();
            if with_context {
                let _ = h.run(query).await;
            } else {
                let _ = h.schema.execute(Request::new(query)).await;
            }
        });
    });

    count.load(Ordering::SeqCst)
}

#[test]
fn test_internal_errors_are_logged_exactly_once() {
    assert_eq!(count_error_events("{ feed { id } }", false), 1);
}

#[test]
fn test_classified_errors_are_not_logged_as_internal() {
    let query = r#"mutation { deleteOnePost(where: { id: "missing" }) { id } }"#;
    assert_eq!(count_error_events(query, true), 0);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_mutations_require_token_when_configured() {
    let h = Harness::with_policy(AuthPolicy::bearer("secret"));
    let signup = r#"mutation { signupUser(data: { email: "a@x.com" }) { email } }"#;

    let res = h.run_with(signup, json!({}), None).await;
    assert_eq!(first_error_code(&res), "UNAUTHENTICATED");

    let res = h.run_with(signup, json!({}), Some("wrong")).await;
    assert_eq!(first_error_code(&res), "UNAUTHENTICATED");

    let res = h.run_with(signup, json!({}), Some("secret")).await;
    assert_no_errors(&res);
    assert_eq!(res["data"]["signupUser"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_queries_are_never_gated() {
    let h = Harness::with_policy(AuthPolicy::bearer("secret"));

    let res = h.run("{ feed { id } }").await;

    assert_no_errors(&res);
    assert_eq!(res["data"]["feed"], json!([]));
}
