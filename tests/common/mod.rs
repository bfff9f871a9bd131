#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use storefeed::{
    config::SyncConfig, feed::types::KeyFormat, firebase::client::DatabaseTarget,
    firebase::credentials::ServiceAccount,
};
use url::Url;

pub const SERVICE_ACCOUNT_JSON: &str = include_str!("../fixtures/service_account.json");
pub const ACCESS_TOKEN: &str = "test-access-token";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Shared state behind the fake feed, token endpoint and database.
pub struct FakeUpstream {
    feed_status: Mutex<u16>,
    feed_body: Mutex<String>,
    feed_delay: Mutex<Option<Duration>>,
    token_status: Mutex<u16>,
    pub feed_calls: AtomicUsize,
    pub token_calls: AtomicUsize,
    writes: Mutex<Vec<RecordedWrite>>,
}

impl FakeUpstream {
    pub fn serving(envelope: Value) -> web::Data<Self> {
        web::Data::new(Self {
            feed_status: Mutex::new(200),
            feed_body: Mutex::new(envelope.to_string()),
            feed_delay: Mutex::new(None),
            token_status: Mutex::new(200),
            feed_calls: AtomicUsize::new(0),
            token_calls: AtomicUsize::new(0),
            writes: Mutex::new(Vec::new()),
        })
    }

    pub fn set_feed_response(&self, status: u16, body: &str) {
        *self.feed_status.lock().unwrap() = status;
        *self.feed_body.lock().unwrap() = body.to_string();
    }

    pub fn set_feed_delay(&self, delay: Duration) {
        *self.feed_delay.lock().unwrap() = Some(delay);
    }

    pub fn reject_tokens(&self) {
        *self.token_status.lock().unwrap() = 400;
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn feed_calls(&self) -> usize {
        self.feed_calls.load(Ordering::SeqCst)
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }
}

async fn feed(state: web::Data<FakeUpstream>) -> HttpResponse {
    state.feed_calls.fetch_add(1, Ordering::SeqCst);
    let delay = *state.feed_delay.lock().unwrap();
    if let Some(delay) = delay {
        actix_rt::time::sleep(delay).await;
    }
    let status = *state.feed_status.lock().unwrap();
    let body = state.feed_body.lock().unwrap().clone();
    HttpResponse::build(StatusCode::from_u16(status).unwrap())
        .content_type("application/json")
        .body(body)
}

async fn token(state: web::Data<FakeUpstream>, form: web::Form<Vec<(String, String)>>) -> HttpResponse {
    state.token_calls.fetch_add(1, Ordering::SeqCst);
    let grant_ok = form.iter().any(|(k, v)| {
        k == "grant_type" && v == "urn:ietf:params:oauth:grant-type:jwt-bearer"
    });
    let has_assertion = form.iter().any(|(k, v)| k == "assertion" && !v.is_empty());

    if *state.token_status.lock().unwrap() != 200 || !grant_ok || !has_assertion {
        return HttpResponse::BadRequest().json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        }));
    }
    HttpResponse::Ok().json(json!({
        "access_token": ACCESS_TOKEN,
        "expires_in": 3599,
        "token_type": "Bearer"
    }))
}

async fn patch(
    state: web::Data<FakeUpstream>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    let path = req.uri().path().to_string();
    if path.contains("reject") {
        return HttpResponse::Unauthorized().json(json!({"error": "Permission denied"}));
    }
    let authorization = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let body = body.into_inner();
    state.writes.lock().unwrap().push(RecordedWrite {
        path,
        authorization,
        body: body.clone(),
    });
    HttpResponse::Ok().json(body)
}

/// Starts the fake upstream on an ephemeral port and returns its base URL.
pub fn spawn_upstream(state: web::Data<FakeUpstream>) -> String {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/feed", web::get().to(feed))
            .route("/token", web::post().to(token))
            .route("/{tail:.*}", web::patch().to(patch))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind fake upstream");

    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    format!("http://{addr}")
}

pub fn service_account(base: &str) -> ServiceAccount {
    let mut value: Value = serde_json::from_str(SERVICE_ACCOUNT_JSON).unwrap();
    value["token_uri"] = json!(format!("{base}/token"));
    ServiceAccount::from_json(&value.to_string()).expect("fixture should parse")
}

pub fn sync_config(base: &str) -> SyncConfig {
    SyncConfig {
        feed_url: Url::parse(&format!("{base}/feed?paginate=1000&page=1&style=4")).unwrap(),
        target: DatabaseTarget::new(Url::parse(base).unwrap(), "/toko_data"),
        key_format: KeyFormat::Uid,
        fetch_timeout: Duration::from_secs(5),
        dry_run: false,
    }
}
