use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use community_api::{
    AppState,
    dto::SignupRequest,
    interaction::{Bookmarks, HashtagFollows, InteractionError, Likes},
    models::{NewToggle, Table, Target, TargetType},
    notify::{NoticeKind, NoticeLog},
    payments::StripeGateway,
    remote::{HttpStore, MemoryStore, RemoteError, RemoteStore, ToggleFilter},
    routes::router,
    session::Session,
};

async fn spawn_server() -> String {
    spawn_server_with_store().await.0
}

/// The server's base URL and the store behind it, for seeding rows.
async fn spawn_server_with_store() -> (String, Arc<MemoryStore>) {
    let gateway = StripeGateway::new(reqwest::Client::new(), "http://127.0.0.1:9", None);
    let state = AppState::with_gateway("e2e-secret".into(), Arc::new(gateway), 30);
    let store = state.store.clone();
    let app = router(state, Duration::from_secs(5));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), store)
}

async fn seed(store: &MemoryStore, user_id: Uuid, id: &str) {
    store
        .insert(
            Table::Likes,
            NewToggle {
                user_id,
                target: Target::new(TargetType::Topic, id),
            },
        )
        .await
        .unwrap();
}

struct Client {
    session: Arc<Session>,
    remote: Arc<HttpStore>,
    notices: Arc<NoticeLog>,
}

async fn signed_in_client(base: &str, email: &str) -> Client {
    let session = Arc::new(Session::new());
    let remote = Arc::new(HttpStore::new(base, session.clone()));
    let auth = remote
        .signup(&SignupRequest {
            email: email.to_string(),
            username: "member".to_string(),
            password: "correct horse".to_string(),
        })
        .await
        .unwrap();
    session.sign_in(auth.user.id, Some(auth.token));

    Client {
        session,
        remote,
        notices: Arc::new(NoticeLog::new()),
    }
}

#[tokio::test]
async fn likes_round_trip_through_the_service() {
    let base = spawn_server().await;
    let alice = signed_in_client(&base, "alice@example.com").await;
    let bob = signed_in_client(&base, "bob@example.com").await;

    let alice_likes = Likes::new(
        alice.remote.clone(),
        alice.session.clone(),
        alice.notices.clone(),
    );
    let bob_likes = Likes::new(bob.remote.clone(), bob.session.clone(), bob.notices.clone());

    assert!(bob_likes.toggle_like(TargetType::Topic, "t1").await.unwrap());

    alice_likes
        .fetch_like_counts(TargetType::Topic, &["t1", "t2"])
        .await
        .unwrap();
    assert_eq!(alice_likes.like_count(TargetType::Topic, "t1"), 1);
    assert_eq!(alice_likes.like_count(TargetType::Topic, "t2"), 0);

    assert!(alice_likes.toggle_like(TargetType::Topic, "t1").await.unwrap());
    assert_eq!(alice_likes.like_count(TargetType::Topic, "t1"), 2);

    // A fresh store for the same user sees the persisted like.
    let reloaded = Likes::new(
        alice.remote.clone(),
        alice.session.clone(),
        alice.notices.clone(),
    );
    reloaded.fetch_likes().await.unwrap();
    assert!(reloaded.is_liked(TargetType::Topic, "t1"));
    assert!(!reloaded.is_liked(TargetType::Topic, "t2"));

    assert!(!alice_likes.toggle_like(TargetType::Topic, "t1").await.unwrap());
    let remaining = alice
        .remote
        .count(
            Table::Likes,
            &ToggleFilter::new()
                .target_type(TargetType::Topic)
                .target_id("t1"),
        )
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn bookmarks_stay_private_and_notify() {
    let base = spawn_server().await;
    let alice = signed_in_client(&base, "carol@example.com").await;
    let bob = signed_in_client(&base, "dave@example.com").await;

    let bookmarks = Bookmarks::new(
        alice.remote.clone(),
        alice.session.clone(),
        alice.notices.clone(),
    );
    assert!(bookmarks.toggle_bookmark("topic-9").await.unwrap());
    assert_eq!(bookmarks.bookmarked_topics(), vec!["topic-9".to_string()]);
    let notice = alice.notices.last().unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.message, "Added to bookmarks");

    let bob_view = Bookmarks::new(bob.remote.clone(), bob.session.clone(), bob.notices.clone());
    bob_view.fetch_bookmarks().await.unwrap();
    assert!(bob_view.bookmarked_topics().is_empty());
}

#[tokio::test]
async fn hashtag_follow_records_activity() {
    let base = spawn_server().await;
    let alice = signed_in_client(&base, "erin@example.com").await;

    let follows = HashtagFollows::new(
        alice.remote.clone(),
        alice.session.clone(),
        alice.notices.clone(),
    );
    assert!(follows.toggle_follow("#RustLang").await.unwrap());
    assert!(follows.is_following("rustlang"));
    assert_eq!(follows.followed_hashtags(), vec!["rustlang".to_string()]);

    let token = alice.session.info().unwrap().token.unwrap();
    let feed: Vec<serde_json::Value> = reqwest::Client::new()
        .get(format!("{base}/activities"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["kind"], "follow_hashtag");
    assert_eq!(feed[0]["target_id"], "rustlang");
}

#[tokio::test]
async fn signed_out_toggle_never_reaches_the_service() {
    let base = spawn_server().await;
    let alice = signed_in_client(&base, "frank@example.com").await;
    alice.session.sign_out();

    let likes = Likes::new(
        alice.remote.clone(),
        alice.session.clone(),
        alice.notices.clone(),
    );
    let err = likes.toggle_like(TargetType::Topic, "t1").await.unwrap_err();
    assert!(matches!(err, InteractionError::NotAuthenticated));
    assert_eq!(alice.notices.last().unwrap().kind, NoticeKind::Info);

    let anonymous = alice
        .remote
        .select(Table::Bookmarks, &ToggleFilter::new())
        .await
        .unwrap_err();
    assert!(matches!(anonymous, RemoteError::Unauthorized));
}

#[tokio::test]
async fn checkout_without_credentials_reports_an_error_body() {
    let base = spawn_server().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/checkout"))
        .json(&serde_json::json!({
            "priceId": "price_1",
            "successUrl": "https://example.com/ok",
            "cancelUrl": "https://example.com/cancel"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn counts_and_membership_are_not_capped() {
    let (base, store) = spawn_server_with_store().await;
    let alice = signed_in_client(&base, "grace@example.com").await;
    let alice_id = alice.session.info().unwrap().user_id;

    for _ in 0..1500 {
        seed(&store, Uuid::new_v4(), "hot").await;
    }
    for i in 0..1200 {
        seed(&store, alice_id, &format!("mine-{i}")).await;
    }

    let likes = Likes::new(
        alice.remote.clone(),
        alice.session.clone(),
        alice.notices.clone(),
    );
    likes
        .fetch_like_counts(TargetType::Topic, &["hot"])
        .await
        .unwrap();
    assert_eq!(likes.like_count(TargetType::Topic, "hot"), 1500);

    likes.fetch_likes().await.unwrap();
    assert_eq!(likes.store().len(), 1200);
    assert!(likes.is_liked(TargetType::Topic, "mine-1199"));
}

#[tokio::test]
async fn ids_with_commas_are_counted() {
    let (base, store) = spawn_server_with_store().await;
    let alice = signed_in_client(&base, "heidi@example.com").await;
    for _ in 0..3 {
        seed(&store, Uuid::new_v4(), "a,b").await;
    }

    let likes = Likes::new(
        alice.remote.clone(),
        alice.session.clone(),
        alice.notices.clone(),
    );
    likes
        .fetch_like_counts(TargetType::Topic, &["a,b", "a"])
        .await
        .unwrap();
    assert_eq!(likes.like_count(TargetType::Topic, "a,b"), 3);
    assert_eq!(likes.like_count(TargetType::Topic, "a"), 0);

    let rows = alice
        .remote
        .select(
            Table::Likes,
            &ToggleFilter::new()
                .target_type(TargetType::Topic)
                .target_ids(["a,b", "a"]),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
}
