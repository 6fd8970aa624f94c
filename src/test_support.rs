//! Test helpers: token minting and an in-process fake storefront API

use axum::extract::{Path, Query, Request, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::models::{ROLE_ADMIN, ROLE_USER};
use crate::services::session::{LoginInput, SessionManager};
use crate::services::token::decode_claims;
use crate::storage::MemoryStore;

/// Shape of a token minted by [`make_token`]
#[derive(Debug, Clone)]
pub struct TokenSpec {
    pub sub: String,
    pub id: Option<i64>,
    pub email: String,
    pub roles: Vec<String>,
    /// Emit a single `role` string instead of a `roles` list
    pub single_role: bool,
    /// Leave the role claim out entirely
    pub omit_roles: bool,
    /// Emit both a `roles` list and a `role` string (the last role)
    pub both_role_claims: bool,
    pub expires_in: Duration,
}

impl TokenSpec {
    pub fn admin(name: &str, id: i64) -> Self {
        Self {
            roles: vec![ROLE_ADMIN.to_string()],
            ..Self::user(name, id)
        }
    }

    pub fn user(name: &str, id: i64) -> Self {
        Self {
            sub: name.to_string(),
            id: Some(id),
            email: format!("{}@example.com", name),
            roles: vec![ROLE_USER.to_string()],
            single_role: false,
            omit_roles: false,
            both_role_claims: false,
            expires_in: Duration::hours(1),
        }
    }
}

/// Mint an HS256 token for `spec`
pub fn make_token(spec: &TokenSpec) -> String {
    let mut claims = json!({
        "sub": spec.sub,
        "exp": (Utc::now() + spec.expires_in).timestamp(),
    });
    if let Some(id) = spec.id {
        claims["id"] = json!(id);
    }
    if !spec.email.is_empty() {
        claims["email"] = json!(spec.email);
    }
    if !spec.omit_roles {
        if spec.both_role_claims {
            claims["roles"] = json!(spec.roles);
            claims["role"] = json!(spec.roles.last().cloned().unwrap_or_default());
        } else if spec.single_role {
            claims["role"] = json!(spec.roles.first().cloned().unwrap_or_default());
        } else {
            claims["roles"] = json!(spec.roles);
        }
    }
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

#[derive(Default)]
struct FakeState {
    hits: Mutex<HashMap<String, usize>>,
    categories: Mutex<Vec<Value>>,
    next_id: AtomicI64,
}

impl FakeState {
    fn seeded() -> Self {
        let state = Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        };
        *state.categories.lock().unwrap() = vec![
            category_json(1, "Sofas", "sofas"),
            category_json(2, "beds", "beds"),
            category_json(3, "Armchairs", "armchairs"),
        ];
        state
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn category(&self, id: i64) -> Option<Value> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c["id"] == json!(id))
            .cloned()
    }
}

/// Fake storefront API served on an ephemeral localhost port
pub struct FakeApi {
    base_url: String,
    state: Arc<FakeState>,
    server: tokio::task::JoinHandle<()>,
}

impl FakeApi {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::seeded());
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }

    pub fn config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout_seconds: 5,
        }
    }

    /// Unauthenticated client for this server
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config()).unwrap()
    }

    /// Session manager signed in as `username` (password "secret")
    pub async fn signed_in(&self, username: &str) -> Arc<SessionManager> {
        let sessions = Arc::new(SessionManager::new(
            self.client(),
            Arc::new(MemoryStore::new()),
        ));
        sessions
            .login(LoginInput::new(username, "secret"))
            .await
            .unwrap();
        sessions
    }

    /// Number of requests that reached `path`
    pub fn hits(&self, path: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: Arc<FakeState>) -> Router {
    Router::new()
        .route("/auth/signin", post(signin))
        .route("/auth/signup", post(signup))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/categories", get(list_categories))
        .route("/categories/{slug}/products", get(products_by_category))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/news/latest", get(latest_news))
        .route("/promotions", get(list_promotions))
        .route("/admin/categories", post(create_category))
        .route("/admin/categories/{id}", axum::routing::delete(delete_category))
        .route("/admin/categories/{id}/image", put(update_category_image))
        .route("/admin/news/all", get(admin_news))
        .route("/admin/news", post(create_news))
        .route("/admin/news/translate", post(translate_news))
        .route("/admin/news/{id}", put(update_news).delete(delete_news))
        .route("/admin/promotions", get(admin_promotions).post(create_promotion))
        .route(
            "/admin/promotions/{id}",
            put(update_promotion).delete(delete_promotion),
        )
        .route("/echo-auth", get(echo_auth))
        .route("/broken", get(broken))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits))
        .with_state(state)
}

async fn count_hits(State(state): State<Arc<FakeState>>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    *state.hits.lock().unwrap().entry(path).or_default() += 1;
    next.run(request).await
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn require_admin(headers: &HeaderMap) -> Result<(), Response> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let Some(token) = token else {
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "Full authentication is required to access this resource",
        ));
    };
    match decode_claims(token) {
        Ok(claims) if !claims.is_expired() && claims.roles.iter().any(|r| r == ROLE_ADMIN) => {
            Ok(())
        }
        _ => Err(reject(StatusCode::FORBIDDEN, "Access Denied")),
    }
}

fn page_of(items: Vec<Value>, query: &HashMap<String, String>) -> Value {
    let page = query
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(0);
    let size = query
        .get("size")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10)
        .max(1);
    let total = items.len();
    let content: Vec<Value> = items.into_iter().skip(page * size).take(size).collect();
    json!({
        "content": content,
        "totalPages": total.div_ceil(size),
        "totalElements": total,
        "number": page,
        "size": size,
    })
}

fn category_json(id: i64, name: &str, slug: &str) -> Value {
    json!({ "id": id, "name": name, "slug": slug, "imageUrl": null })
}

fn all_products(state: &FakeState) -> Vec<Value> {
    let categories = state.categories.lock().unwrap().clone();
    (1..=12)
        .map(|id: i64| {
            let category = categories
                .get((id as usize - 1) % categories.len().max(1))
                .cloned()
                .unwrap_or(Value::Null);
            json!({
                "id": id,
                "name": format!("Product {}", id),
                "description": "Solid oak",
                "price": 100.0 * id as f64,
                "imageUrl": format!("/img/{}.jpg", id),
                "category": category,
            })
        })
        .collect()
}

fn news_json(id: i64, title_de: &str) -> Value {
    json!({
        "id": id,
        "titleDe": title_de,
        "contentDe": format!("{} Inhalt", title_de),
        "titleEn": format!("{} (en)", title_de),
        "contentEn": null,
        "imageUrl": "",
        "createdAt": "2026-01-15T10:00:00",
    })
}

fn promotion_json(id: i64, name_de: &str) -> Value {
    json!({
        "id": id,
        "nameDe": name_de,
        "descriptionDe": "Nur diese Woche",
        "price": 499.0,
        "size": "200x90",
        "imageUrl": "",
        "startDate": "2026-01-01",
        "endDate": "2026-12-31",
        "createdAt": "2026-01-01T00:00:00",
    })
}

fn with_id(mut body: Value, id: i64) -> Value {
    body["id"] = json!(id);
    body
}

async fn signin(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if password != "secret" {
        return reject(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    match username {
        "greta" => {
            let token = make_token(&TokenSpec::admin("greta", 1));
            Json(json!({
                "id": 1,
                "username": "greta",
                "email": "greta@example.com",
                "roles": [ROLE_ADMIN],
                "token": token,
            }))
            .into_response()
        }
        "paul" => {
            let token = make_token(&TokenSpec::user("paul", 2));
            Json(json!({
                "id": 2,
                "username": "paul",
                "email": "paul@example.com",
                "role": ROLE_USER,
                "token": token,
            }))
            .into_response()
        }
        "dual" => {
            let spec = TokenSpec {
                roles: vec![ROLE_USER.to_string(), ROLE_ADMIN.to_string()],
                both_role_claims: true,
                ..TokenSpec::user("dual", 4)
            };
            Json(json!({
                "id": 4,
                "username": "dual",
                "email": "dual@example.com",
                "role": ROLE_ADMIN,
                "roles": [ROLE_USER, ROLE_ADMIN],
                "token": make_token(&spec),
            }))
            .into_response()
        }
        "blank" => Json(json!({
            "id": 5,
            "username": "blank",
            "roles": [ROLE_USER],
            "token": "",
        }))
        .into_response(),
        "garbled" => Json(json!({
            "id": 6,
            "username": "garbled",
            "roles": [ROLE_USER],
            "token": "aaa.bbb.ccc",
        }))
        .into_response(),
        "tokenless" => Json(json!({
            "id": 9,
            "username": "tokenless",
            "roles": [ROLE_USER],
        }))
        .into_response(),
        _ => reject(StatusCode::UNAUTHORIZED, "Bad credentials"),
    }
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["username"] == json!("greta") {
        return reject(StatusCode::BAD_REQUEST, "Error: Username is already taken!");
    }
    Json(json!({ "message": "User registered successfully!" })).into_response()
}

async fn forgot_password(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    format!("Password reset link sent to {}", email).into_response()
}

async fn reset_password(Query(query): Query<HashMap<String, String>>) -> Response {
    match query.get("token").map(String::as_str) {
        Some("good token") => {
            Json(json!({ "message": "Password has been reset successfully." })).into_response()
        }
        _ => reject(StatusCode::BAD_REQUEST, "Invalid or expired password reset token."),
    }
}

async fn list_categories(State(state): State<Arc<FakeState>>) -> Json<Value> {
    Json(Value::Array(state.categories.lock().unwrap().clone()))
}

async fn products_by_category(
    State(state): State<Arc<FakeState>>,
    Path(slug): Path<String>,
) -> Response {
    let known = state
        .categories
        .lock()
        .unwrap()
        .iter()
        .any(|c| c["slug"] == json!(slug));
    if !known {
        return reject(StatusCode::NOT_FOUND, "Category not found");
    }
    let products: Vec<Value> = all_products(&state)
        .into_iter()
        .filter(|p| p["category"]["slug"] == json!(slug))
        .collect();
    Json(Value::Array(products)).into_response()
}

async fn list_products(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let products = all_products(&state);
    if query.contains_key("page") {
        Json(page_of(products, &query))
    } else {
        Json(Value::Array(products))
    }
}

fn product_from_input(state: &FakeState, id: i64, input: &Value) -> Result<Value, Response> {
    let category_id = input["categoryId"].as_i64().unwrap_or_default();
    let Some(category) = state.category(category_id) else {
        return Err(reject(StatusCode::BAD_REQUEST, "Category not found"));
    };
    Ok(json!({
        "id": id,
        "name": input["name"],
        "description": input["description"],
        "price": input["price"],
        "imageUrl": input["imageUrl"],
        "category": category,
    }))
}

async fn create_product(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    match product_from_input(&state, state.next_id(), &input) {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(rejection) => rejection,
    }
}

async fn update_product(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<Value>,
) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    if !(1..=12).contains(&id) {
        return reject(StatusCode::NOT_FOUND, "Product not found");
    }
    match product_from_input(&state, id, &input) {
        Ok(product) => Json(product).into_response(),
        Err(rejection) => rejection,
    }
}

async fn delete_product(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    if !(1..=12).contains(&id) {
        return reject(StatusCode::NOT_FOUND, "Product not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn latest_news() -> Json<Value> {
    Json(json!([news_json(1, "Neue Kollektion"), news_json(2, "Sommerfest")]))
}

async fn list_promotions(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let promotions = (1..=3)
        .map(|id| promotion_json(id, &format!("Aktion {}", id)))
        .collect();
    Json(page_of(promotions, &query))
}

async fn create_category(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    let name = input["name"].as_str().unwrap_or_default();
    let slug = input["slug"].as_str().unwrap_or_default();
    let mut categories = state.categories.lock().unwrap();
    if categories.iter().any(|c| c["slug"] == json!(slug)) {
        return reject(StatusCode::CONFLICT, "Category slug already exists");
    }
    let category = category_json(state.next_id(), name, slug);
    categories.push(category.clone());
    (StatusCode::CREATED, Json(category)).into_response()
}

async fn delete_category(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    let mut categories = state.categories.lock().unwrap();
    let before = categories.len();
    categories.retain(|c| c["id"] != json!(id));
    if categories.len() == before {
        return reject(StatusCode::NOT_FOUND, "Category not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn update_category_image(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<Value>,
) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    let mut categories = state.categories.lock().unwrap();
    match categories.iter_mut().find(|c| c["id"] == json!(id)) {
        Some(category) => {
            category["imageUrl"] = input["imageUrl"].clone();
            Json(category.clone()).into_response()
        }
        None => reject(StatusCode::NOT_FOUND, "Category not found"),
    }
}

async fn admin_news(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    let articles = (1..=15)
        .map(|id| news_json(id, &format!("Meldung {}", id)))
        .collect();
    Json(page_of(articles, &query)).into_response()
}

async fn create_news(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    let article = with_id(input, state.next_id());
    (StatusCode::CREATED, Json(article)).into_response()
}

async fn update_news(headers: HeaderMap, Path(id): Path<i64>, Json(input): Json<Value>) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    Json(with_id(input, id)).into_response()
}

async fn delete_news(headers: HeaderMap, Path(_id): Path<i64>) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn translate_news(headers: HeaderMap, Json(input): Json<Value>) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    let title = input["titleDe"].as_str().unwrap_or_default();
    let content = input["contentDe"].as_str().unwrap_or_default();
    Json(json!({
        "titleEn": format!("[EN] {}", title),
        "contentEn": format!("[EN] {}", content),
        "titleFr": format!("[FR] {}", title),
        "contentFr": format!("[FR] {}", content),
        "titleRu": format!("[RU] {}", title),
        "contentRu": format!("[RU] {}", content),
        "titleUk": format!("[UK] {}", title),
        "contentUk": format!("[UK] {}", content),
    }))
    .into_response()
}

async fn admin_promotions(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    let promotions = (1..=4)
        .map(|id| promotion_json(id, &format!("Aktion {}", id)))
        .collect();
    Json(page_of(promotions, &query)).into_response()
}

async fn create_promotion(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    let promotion = with_id(input, state.next_id());
    (StatusCode::CREATED, Json(promotion)).into_response()
}

async fn update_promotion(
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<Value>,
) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    Json(with_id(input, id)).into_response()
}

async fn delete_promotion(headers: HeaderMap, Path(_id): Path<i64>) -> Response {
    if let Err(rejection) = require_admin(&headers) {
        return rejection;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn echo_auth(headers: HeaderMap) -> Json<String> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Json(value.to_string())
}

async fn broken() -> &'static str {
    "{not json"
}
