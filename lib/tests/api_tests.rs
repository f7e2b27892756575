//! Handler-level tests driving the pre-made routes through tower.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::Extension;
use http_body_util::BodyExt;
use tower::ServiceExt;

use uuid::Uuid;

use contentai::email::Mailer;
use contentai::generate::{IdeaDraft, IdeaGenerator};
use contentai::idea::{self, Difficulty, Idea};
use contentai::profile::{Platform, Profile, Status, Subscription};
use contentai::{Config, Database, Result};

fn draft() -> IdeaDraft {
    IdeaDraft {
        title: "Test idea".to_string(),
        hook: "Hook".to_string(),
        talking_points: vec!["point".to_string()],
        platform: "Instagram".to_string(),
        format: "Reel".to_string(),
        hashtags: vec!["#test".to_string()],
        cta: "Do the thing".to_string(),
        difficulty: Difficulty::QuickAndEasy,
        trend_connection: None,
    }
}

struct FakeGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl IdeaGenerator for FakeGenerator {
    async fn generate(&self, _profile: &Profile) -> Result<IdeaDraft> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(draft())
    }
}

struct RecordingMailer {
    sent: Mutex<Vec<String>>,
    welcomed: Mutex<Vec<String>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_daily_idea(&self, to: &str, _name: &str, _idea: &Idea) -> Result<()> {
        self.sent.lock().unwrap().push(to.to_string());
        Ok(())
    }

    async fn send_welcome(&self, to: &str, _name: &str) -> Result<()> {
        self.welcomed.lock().unwrap().push(to.to_string());
        Ok(())
    }
}

struct Harness {
    app: axum::Router,
    db: Database,
    generator: Arc<FakeGenerator>,
    mailer: Arc<RecordingMailer>,
}

fn harness(config: Config) -> Harness {
    let db = Database::temporary().unwrap();
    let generator = Arc::new(FakeGenerator {
        calls: AtomicUsize::new(0),
    });
    let mailer = Arc::new(RecordingMailer {
        sent: Mutex::new(vec![]),
        welcomed: Mutex::new(vec![]),
    });

    let router = contentai::axum::router(contentai::axum::Router::new(), &config);
    let app = router
        .layer(Extension(generator.clone() as Arc<dyn IdeaGenerator>))
        .layer(Extension(mailer.clone() as Arc<dyn Mailer>))
        .layer(Extension(Arc::new(config)))
        .layer(Extension(Arc::new(db.clone())))
        .with_state(cookie::Key::generate());

    Harness {
        app,
        db,
        generator,
        mailer,
    }
}

fn creator(email: &str) -> Profile {
    Profile {
        email: email.to_string(),
        niche: "indie games".to_string(),
        platforms: vec![Platform::YouTube],
        subscription: Subscription {
            status: Status::Trialing,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn cron_config() -> Config {
    let mut config = Config::default();
    config.digest.secret = "s3cret".to_string();
    config.digest.pace_ms = 0;
    config
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn cron_rejects_missing_token() {
    let h = harness(cron_config());
    h.db.set(&creator("a@example.com")).unwrap();

    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/api/cron/daily")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Unauthorized");

    // Nothing was looked at, nothing was written.
    assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.db.get_collection::<Idea>().unwrap().len(), 0);
}

#[tokio::test]
async fn cron_rejects_wrong_token() {
    let h = harness(cron_config());
    h.db.set(&creator("a@example.com")).unwrap();

    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/api/cron/daily")
                .header(AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cron_sends_daily_ideas() {
    let h = harness(cron_config());
    h.db.set(&creator("a@example.com")).unwrap();
    h.db.set(&creator("b@example.com")).unwrap();

    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/api/cron/daily")
                .header(AUTHORIZATION, "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Daily ideas sent");
    assert_eq!(body["total"], 2);
    assert_eq!(body["sent"], 2);
    assert_eq!(body["failed"], 0);

    let ideas = h.db.get_collection::<Idea>().unwrap();
    assert_eq!(ideas.len(), 2);
    assert!(ideas.iter().all(|i| i.emailed));
}

#[tokio::test]
async fn cron_reports_empty_subscriber_set() {
    let h = harness(cron_config());

    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/api/cron/daily")
                .header(AUTHORIZATION, "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "No active subscribers");
    assert_eq!(body["sent"], 0);
}

#[tokio::test]
async fn waitlist_accepts_and_deduplicates() {
    let h = harness(Config::default());

    let join = |app: axum::Router, email: &str| {
        let body = serde_json::json!({ "email": email }).to_string();
        let request = Request::builder()
            .method("POST")
            .uri("/api/waitlist")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        async move { app.oneshot(request).await.unwrap() }
    };

    let response = join(h.app.clone(), "Creator@Example.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "Added to waitlist");

    // Same address, different casing: already on the list.
    let response = join(h.app.clone(), "creator@example.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "Already on waitlist");

    assert_eq!(
        h.db.get_collection::<contentai::waitlist::Entry>()
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn waitlist_rejects_invalid_email() {
    let h = harness(Config::default());

    let request = Request::builder()
        .method("POST")
        .uri("/api/waitlist")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"email":"not-an-email"}"#))
        .unwrap();
    let response = h.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn autologin_config(email: &str) -> Config {
    let mut config = Config::default();
    config.dev.enabled = true;
    config.dev.autologin = Some(email.to_string());
    config
}

#[tokio::test]
async fn generate_stores_idea_for_caller() {
    let h = harness(autologin_config("a@example.com"));
    let profile = creator("a@example.com");
    let id = profile.id;
    h.db.set(&profile).unwrap();

    let response = h
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/generate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["title"], "Test idea");
    assert_eq!(body["emailed"], false);

    let profile = h.db.get::<Profile>(id).unwrap();
    assert_eq!(profile.ideas_generated, 1);
}

#[tokio::test]
async fn generate_requires_active_subscription() {
    let h = harness(autologin_config("a@example.com"));
    let mut profile = creator("a@example.com");
    profile.subscription.status = Status::Canceled;
    h.db.set(&profile).unwrap();

    let response = h
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/generate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(h.db.get_collection::<Idea>().unwrap().len(), 0);
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn profile_wizard_persists_and_welcomes_once() {
    let h = harness(autologin_config("a@example.com"));
    let mut profile = creator("a@example.com");
    profile.niche.clear();
    let id = profile.id;
    h.db.set(&profile).unwrap();

    let form = serde_json::json!({
        "display_name": "Alex",
        "niche": "indie games",
        "platforms": ["youtube", "twitter"],
        "tone": "dry humor",
        "goal": "sell my game",
        "audience": "pc gamers",
        "recent_topics": "devlogs",
    });
    let response = h
        .app
        .clone()
        .oneshot(json_request("PUT", "/api/profile", form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = h.db.get::<Profile>(id).unwrap();
    assert_eq!(stored.display_name, "Alex");
    assert_eq!(stored.niche, "indie games");
    assert_eq!(stored.platforms, vec![Platform::YouTube, Platform::Twitter]);
    assert_eq!(stored.tone, "dry humor");
    assert_eq!(stored.goal, "sell my game");
    assert_eq!(stored.audience, "pc gamers");
    assert_eq!(stored.recent_topics, "devlogs");

    // Completing the wizard for the first time welcomes the creator.
    assert_eq!(
        *h.mailer.welcomed.lock().unwrap(),
        vec!["a@example.com".to_string()]
    );

    // A later edit is not a first setup, so no second welcome.
    let form = serde_json::json!({
        "display_name": "Alex",
        "niche": "indie games",
        "platforms": ["youtube"],
        "tone": "earnest",
        "goal": "sell my game",
        "audience": "pc gamers",
        "recent_topics": "devlogs",
    });
    let response = h
        .app
        .clone()
        .oneshot(json_request("PUT", "/api/profile", form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = h.db.get::<Profile>(id).unwrap();
    assert_eq!(stored.tone, "earnest");
    assert_eq!(h.mailer.welcomed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn idea_status_updates_for_owner() {
    let h = harness(autologin_config("a@example.com"));
    let profile = creator("a@example.com");
    let idea = Idea::from_draft(profile.id, draft(), false);
    let idea_id = idea.id;
    h.db.set(&profile).unwrap();
    h.db.set(&idea).unwrap();

    let response = h
        .app
        .oneshot(json_request(
            "POST",
            &format!("/api/ideas/{}/status", idea_id),
            serde_json::json!({ "status": "used" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored = h.db.get::<Idea>(idea_id).unwrap();
    assert_eq!(stored.status, idea::Status::Used);
}

#[tokio::test]
async fn idea_status_forbidden_for_non_owner() {
    let h = harness(autologin_config("a@example.com"));
    h.db.set(&creator("a@example.com")).unwrap();

    // Idea belonging to some other creator.
    let idea = Idea::from_draft(Uuid::new_v4(), draft(), false);
    let idea_id = idea.id;
    h.db.set(&idea).unwrap();

    let response = h
        .app
        .oneshot(json_request(
            "POST",
            &format!("/api/ideas/{}/status", idea_id),
            serde_json::json!({ "status": "used" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let stored = h.db.get::<Idea>(idea_id).unwrap();
    assert_eq!(stored.status, idea::Status::New);
}

#[tokio::test]
async fn idea_status_unknown_idea_is_not_found() {
    let h = harness(autologin_config("a@example.com"));
    h.db.set(&creator("a@example.com")).unwrap();

    let response = h
        .app
        .oneshot(json_request(
            "POST",
            &format!("/api/ideas/{}/status", Uuid::new_v4()),
            serde_json::json!({ "status": "saved" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn generate_requires_profile_setup() {
    let h = harness(autologin_config("a@example.com"));
    let mut profile = creator("a@example.com");
    profile.niche.clear();
    h.db.set(&profile).unwrap();

    let response = h
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/generate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
