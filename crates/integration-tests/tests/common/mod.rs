//! Shared harness: the real router over the in-memory plugins.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use ophir_api::AppState;
use ophir_auth_simple::SimpleAuthProvider;
use ophir_core::models::{Credential, Role};
use ophir_core::traits::{Clock, MediaStore};
use ophir_store_memory::{MemoryContactRepo, MemoryCredentialStore, MemoryMediaStore, MemoryPropertyRepo};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@ophirestate.com";
pub const ADMIN_PASSWORD: &str = "admin-pw";
pub const DEV_EMAIL: &str = "dev@ophirestate.com";
pub const DEV_PASSWORD: &str = "dev-pw";
/// Stored as-is, but its `:` cannot travel inside a session token.
pub const COLON_EMAIL: &str = "ops:paris@ophirestate.com";
pub const COLON_PASSWORD: &str = "colon-pw";

/// 2025-03-01T10:00:00Z
pub const START_MILLIS: i64 = 1_740_823_200_000;

/// Clock the tests move by hand.
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn advance(&self, millis: i64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub contacts: Arc<MemoryContactRepo>,
    pub properties: Arc<MemoryPropertyRepo>,
    pub media: Arc<MemoryMediaStore>,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_media(Arc::new(MemoryMediaStore::new("/media")))
    }

    /// Same wiring with a custom object store, e.g. a mock that fails.
    pub fn with_media_store(media: Arc<dyn MediaStore>) -> (Router, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock(AtomicI64::new(START_MILLIS)));
        let state = state(clock.clone(), Arc::new(MemoryContactRepo::new()), Arc::new(MemoryPropertyRepo::new()), media);
        (ophir_api::router(state, &[]), clock)
    }

    fn with_media(media: Arc<MemoryMediaStore>) -> Self {
        let clock = Arc::new(ManualClock(AtomicI64::new(START_MILLIS)));
        let contacts = Arc::new(MemoryContactRepo::new());
        let properties = Arc::new(MemoryPropertyRepo::new());
        let state = state(clock.clone(), contacts.clone(), properties.clone(), media.clone());
        Self {
            router: ophir_api::router(state, &[]),
            clock,
            contacts,
            properties,
            media,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Reply {
        send(&self.router, request).await
    }

    /// Logs in and returns the `Cookie` header value for later requests.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let reply = self.send(json_request("POST", "/api/auth/login", None, &format!(
            r#"{{"email":"{email}","password":"{password}"}}"#
        )))
        .await;
        assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
        cookie_from(&reply.headers)
    }
}

fn state(
    clock: Arc<ManualClock>,
    contacts: Arc<MemoryContactRepo>,
    properties: Arc<MemoryPropertyRepo>,
    media: Arc<dyn MediaStore>,
) -> AppState {
    let credentials = MemoryCredentialStore::new([
        Credential {
            email: ADMIN_EMAIL.into(),
            password: ADMIN_PASSWORD.into(),
            role: Role::Admin,
        },
        Credential {
            email: DEV_EMAIL.into(),
            password: DEV_PASSWORD.into(),
            role: Role::Dev,
        },
        Credential {
            email: COLON_EMAIL.into(),
            password: COLON_PASSWORD.into(),
            role: Role::Dev,
        },
    ]);

    AppState {
        contacts,
        properties,
        credentials: Arc::new(credentials),
        media,
        auth: Arc::new(SimpleAuthProvider::new()),
        clock,
        secure_cookies: false,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply { status, headers, body }
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `admin_session=<token>` out of a `Set-Cookie` header.
pub fn cookie_from(headers: &HeaderMap) -> String {
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .expect("response sets a cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}
