use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_cookies::{CookieManagerLayer, Cookies};
use tracing_subscriber::EnvFilter;
use ttl_session::{Config, SessionContext, SessionLayer, SessionStore};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct User {
    id: i64,
    name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ttl_session=debug")),
        )
        .init();

    // Create session store
    let config = Config::build()
        .directory("./session_data")
        .session_length(Duration::from_secs(15 * 60))
        .cookie_secure(false) // plain http on localhost
        .context_name("user");
    let store = SessionStore::open(config).unwrap();

    // Set up router with session management
    let app = Router::new()
        .route("/", get(whoami))
        .route("/login", get(login))
        .route("/logout", get(logout))
        .with_state(store.clone())
        .layer(SessionLayer::<User>::new(store.clone()))
        .layer(CookieManagerLayer::new());

    // Run the server
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .unwrap();

    store.close().await.unwrap();
}

async fn whoami(context: SessionContext) -> String {
    match context.get::<User>("user") {
        Some(user) => format!("Hello {} (#{})", user.name, user.id),
        None => "Hello stranger, visit /login".to_string(),
    }
}

async fn login(State(store): State<SessionStore>, cookies: Cookies) -> Result<String, StatusCode> {
    let user = User {
        id: 1,
        name: "Jane Doe".to_string(),
    };

    store
        .create_with_cookie(&cookies, &user)
        .await
        .map_err(|err| {
            tracing::error!(err = %err, "login failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(format!("Logged in as {}", user.name))
}

async fn logout(State(store): State<SessionStore>, cookies: Cookies) -> Result<&'static str, StatusCode> {
    match store.delete_with_cookie(&cookies).await {
        Ok(()) => Ok("Logged out"),
        Err(err) if err.is_not_found() => Ok("Not logged in"),
        Err(err) => {
            tracing::error!(err = %err, "logout failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
