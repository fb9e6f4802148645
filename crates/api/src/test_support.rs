//! In-process test harness: the full router over the in-memory store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

use recipe_core::{Name, Price};

use crate::config::{ApiConfig, SentryConfig};
use crate::db::memory::MemoryStore;
use crate::db::{IngredientRepository, RecipeRepository, TagRepository};
use crate::middleware::session_layer;
use crate::models::{Ingredient, NewRecipe, Recipe, Tag, User};
use crate::routes::app;
use crate::services::users::UserService;
use crate::state::AppState;

/// Password given to every user created through [`TestApp::user`].
pub const TEST_PASSWORD: &str = "testpass";

pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://localhost/recipe_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 8000,
        base_url: Url::parse("http://localhost:8000").unwrap(),
        session_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"),
        sentry: SentryConfig::default(),
    }
}

/// Build a JSON request, optionally authenticated with a bearer token.
pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = test_config();
        let sessions = session_layer(tower_sessions::MemoryStore::default(), &config);
        let state = AppState::new(config, store.clone());

        Self {
            router: app(state, sessions),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send a request and decode the JSON body (`Null` when empty).
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.send(json_request(method, uri, token, body)).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Create a user with [`TEST_PASSWORD`] and return it with its token.
    pub async fn user(&self, email: &str) -> (User, String) {
        let users = UserService::new(self.store.as_ref());
        let user = users.create_user(email, TEST_PASSWORD).await.unwrap();
        let token = users.issue_token(&user).await.unwrap();
        (user, token.key)
    }

    pub async fn tag(&self, user: &User, name: &str) -> Tag {
        self.store
            .create_tag(user.id, &Name::parse(name).unwrap())
            .await
            .unwrap()
    }

    pub async fn ingredient(&self, user: &User, name: &str) -> Ingredient {
        self.store
            .create_ingredient(user.id, &Name::parse(name).unwrap())
            .await
            .unwrap()
    }

    /// Create a recipe taking 10 minutes and costing 5.00.
    pub async fn recipe(&self, user: &User, title: &str) -> Recipe {
        let recipe = NewRecipe {
            title: Name::parse(title).unwrap(),
            time_minutes: 10,
            price: Price::new(Decimal::new(500, 2)).unwrap(),
            link: String::new(),
            tags: Vec::new(),
            ingredients: Vec::new(),
        };
        self.store.create_recipe(user.id, &recipe).await.unwrap()
    }
}
