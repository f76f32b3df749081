#![allow(dead_code)]

use axum::body::Body;
use axum::response::Response;
use cookie::Cookie;
use http::header::SET_COOKIE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use ttl_session::{Config, SessionStore};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TestUser {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TestSession {
    pub user: TestUser,
    pub preferences: TestPreferences,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TestPreferences {
    pub theme: String,
    pub language: String,
}

pub fn create_test_session() -> TestSession {
    TestSession {
        user: TestUser {
            id: 1,
            name: "Test User".to_string(),
        },
        preferences: TestPreferences {
            theme: "dark".to_string(),
            language: "en".to_string(),
        },
    }
}

pub fn memory_store(session_length: Duration, extend_sessions: bool) -> SessionStore {
    SessionStore::open(
        Config::build()
            .in_memory(true)
            .session_length(session_length)
            .extend_sessions(extend_sessions),
    )
    .unwrap()
}

pub fn disk_store(dir: &Path, session_length: Duration, extend_sessions: bool) -> SessionStore {
    SessionStore::open(
        Config::build()
            .directory(dir)
            .session_length(session_length)
            .extend_sessions(extend_sessions),
    )
    .unwrap()
}

/// Parses every `Set-Cookie` header of `response`.
pub fn set_cookies(response: &Response<Body>) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| Cookie::parse(value.to_str().unwrap().to_string()).unwrap())
        .collect()
}

pub async fn body_string(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
