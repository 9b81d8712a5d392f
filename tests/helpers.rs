/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use flickr::rest::{AccessGrant, ClientConfig, Credential, Endpoints};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub const API_KEY: &str = "mock-api-key";
pub const API_SECRET: &str = "mock-api-secret";
pub const REQUEST_TOKEN: &str = "req-token";
pub const REQUEST_SECRET: &str = "req-secret";
pub const ACCESS_TOKEN: &str = "access-token";
pub const ACCESS_SECRET: &str = "access-secret";
pub const VERIFIER: &str = "verifier-1";
pub const USER_ID: &str = "12345@N01";
pub const PHOTO_COUNT: usize = 5;

/// A recorded call against the REST endpoint
#[derive(Debug, Clone)]
pub struct Call {
    pub http_method: String,
    pub params: HashMap<String, String>,
}

/// State shared by the mock handlers
#[derive(Debug)]
pub struct MockState {
    pub origin: String,
    pub fail_identity: AtomicBool,
    pub calls: Mutex<Vec<Call>>,
    pub nonces: Mutex<HashSet<String>>,
    pub favorites: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<String>>,
}

impl MockState {
    pub fn calls_to(&self, method: &str) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.params.get("method").map(String::as_str) == Some(method))
            .cloned()
            .collect()
    }
}

/// In-process stand in for the Flickr endpoints. Checks every signature with the
/// crate's own signer and the secrets it handed out.
pub struct MockFlickr {
    pub origin: String,
    pub state: Arc<MockState>,
}

impl MockFlickr {
    pub async fn start() -> Self {
        init_logging();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(MockState {
            origin: origin.clone(),
            fail_identity: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            nonces: Mutex::new(HashSet::new()),
            favorites: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/services/rest", get(rest_get).post(rest_post))
            .route("/services/oauth/request_token", get(request_token))
            .route("/services/oauth/access_token", get(access_token))
            .route("/services/upload/", post(upload))
            .with_state(state.clone());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Self { origin, state }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(API_KEY, API_SECRET).endpoints(Endpoints::rooted_at(&self.origin).unwrap())
    }

    pub fn fail_identity(&self, fail: bool) {
        self.state.fail_identity.store(fail, Ordering::SeqCst);
    }
}

/// Routes the crate's logs to the test output, `RUST_LOG=flickr=debug` to see them
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The grant the mock accepts for authorized calls
pub fn access_grant() -> AccessGrant {
    AccessGrant {
        credential: Credential::new(ACCESS_TOKEN, ACCESS_SECRET),
        user_id: USER_ID.to_string(),
        username: Some("jane".to_string()),
    }
}

fn signature_ok(
    state: &MockState,
    http_method: &str,
    path: &str,
    params: &HashMap<String, String>,
    token_secret: Option<&str>,
) -> bool {
    let Some(signature) = params.get("oauth_signature") else {
        return false;
    };
    let url = Url::parse(&format!("{}{}", state.origin, path)).unwrap();
    let expected = flickr::rest::signer::sign(
        http_method,
        &url,
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        API_SECRET,
        token_secret,
    )
    .unwrap();
    &expected == signature
}

fn fresh_nonce(state: &MockState, params: &HashMap<String, String>) -> bool {
    match params.get("oauth_nonce") {
        Some(nonce) => state.nonces.lock().unwrap().insert(nonce.clone()),
        None => false,
    }
}

fn json_response(status: StatusCode, body: Value) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body.to_string()).into_response()
}

fn ok(mut payload: Value) -> Response {
    payload["stat"] = json!("ok");
    json_response(StatusCode::OK, payload)
}

fn fail(code: i64, message: &str) -> Response {
    json_response(
        StatusCode::OK,
        json!({"stat": "fail", "code": code, "message": message}),
    )
}

fn user_json() -> Value {
    json!({"id": USER_ID, "nsid": USER_ID, "username": {"_content": "jane"}})
}

fn photos_json(ids: &[String], page: usize, per_page: usize) -> Value {
    let pages = ids.len().div_ceil(per_page);
    let items: Vec<Value> = ids
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .map(|id| {
            json!({"id": id, "owner": USER_ID, "secret": "abc", "server": "65535",
                   "farm": 66, "title": format!("photo {}", id), "ispublic": 1, "isfriend": 0, "isfamily": 0})
        })
        .collect();
    json!({"photos": {
        "page": page,
        "pages": pages.to_string(),
        "perpage": per_page,
        "total": ids.len().to_string(),
        "photo": items
    }})
}

async fn rest_get(State(state): State<Arc<MockState>>, Query(params): Query<HashMap<String, String>>) -> Response {
    rest(&state, "GET", params)
}

async fn rest_post(State(state): State<Arc<MockState>>, Form(params): Form<HashMap<String, String>>) -> Response {
    rest(&state, "POST", params)
}

fn rest(state: &MockState, http_method: &str, params: HashMap<String, String>) -> Response {
    let token_secret = match params.get("oauth_token").map(String::as_str) {
        None => None,
        Some(ACCESS_TOKEN) => Some(ACCESS_SECRET),
        Some(_) => return fail(98, "Invalid auth token"),
    };
    if !signature_ok(state, http_method, "/services/rest", &params, token_secret) {
        return fail(96, "Invalid signature");
    }
    if !fresh_nonce(state, &params) {
        return fail(96, "Nonce already used");
    }
    if params.get("format").map(String::as_str) != Some("json")
        || params.get("nojsoncallback").map(String::as_str) != Some("1")
    {
        return fail(111, "Format not found");
    }
    state.calls.lock().unwrap().push(Call {
        http_method: http_method.to_string(),
        params: params.clone(),
    });

    let param = |k: &str| params.get(k).cloned().unwrap_or_default();
    let authorized = token_secret.is_some();
    let method = param("method");
    match method.as_str() {
        "flickr.test.echo" => {
            let echoed: serde_json::Map<String, Value> = params
                .iter()
                .filter(|(k, _)| !k.starts_with("oauth_"))
                .map(|(k, v)| (k.clone(), json!(v)))
                .collect();
            ok(Value::Object(echoed))
        }
        "flickr.test.login" if !authorized || state.fail_identity.load(Ordering::SeqCst) => {
            fail(99, "Insufficient permissions. Method requires read privileges; none granted.")
        }
        "flickr.test.login" => ok(json!({"user": {"id": USER_ID, "username": {"_content": "jane"}}})),
        "flickr.test.broken" => (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").into_response(),
        "flickr.test.nostat" => json_response(StatusCode::OK, json!({"photo": {"id": "1"}})),
        "flickr.people.findByUsername" if param("username") == "jane" => ok(json!({"user": user_json()})),
        "flickr.people.findByUsername" => fail(1, "User not found"),
        "flickr.people.findByEmail" if param("find_email") == "jane@example.com" => {
            ok(json!({"user": user_json()}))
        }
        "flickr.people.findByEmail" if param("find_email") == "down@example.com" => {
            fail(105, "Service currently unavailable")
        }
        "flickr.people.findByEmail" => fail(1, "User not found"),
        "flickr.people.getInfo" if param("user_id") == USER_ID => ok(json!({"person": {
            "id": USER_ID,
            "nsid": USER_ID,
            "ispro": 1,
            "username": {"_content": "jane"},
            "realname": {"_content": "Jane Doe"},
            "location": {"_content": ""},
            "photosurl": {"_content": "https://www.flickr.com/photos/jane/"},
        }})),
        "flickr.people.getInfo" => fail(1, "User not found"),
        "flickr.people.getPhotos" | "flickr.people.getPublicPhotos" => {
            let ids: Vec<String> = (1..=PHOTO_COUNT).map(|i| format!("p{}", i)).collect();
            let page = param("page").parse().unwrap_or(1);
            let per_page = param("per_page").parse().unwrap_or(100);
            ok(photos_json(&ids, page, per_page))
        }
        "flickr.favorites.add" | "flickr.favorites.remove" if http_method != "POST" => {
            fail(112, "Method requires POST")
        }
        "flickr.favorites.add" | "flickr.favorites.remove" if !authorized => {
            fail(99, "Insufficient permissions")
        }
        "flickr.favorites.add" => {
            state.favorites.lock().unwrap().push(param("photo_id"));
            ok(json!({}))
        }
        "flickr.favorites.remove" => {
            let photo_id = param("photo_id");
            let mut favorites = state.favorites.lock().unwrap();
            if !favorites.contains(&photo_id) {
                return fail(1, "Photo not in favorites");
            }
            favorites.retain(|f| f != &photo_id);
            ok(json!({}))
        }
        "flickr.favorites.getList" | "flickr.favorites.getPublicList" => {
            let ids = state.favorites.lock().unwrap().clone();
            if ids.is_empty() {
                return ok(json!({"photos": {"page": 1, "pages": 0, "perpage": 100, "total": 0, "photo": []}}));
            }
            ok(photos_json(&ids, 1, 100))
        }
        other => fail(112, &format!("Method \"{}\" not found", other)),
    }
}

async fn request_token(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !signature_ok(&state, "GET", "/services/oauth/request_token", &params, None)
        || params.contains_key("oauth_token")
        || !params.contains_key("oauth_callback")
    {
        return (StatusCode::UNAUTHORIZED, "oauth_problem=signature_invalid").into_response();
    }
    (
        StatusCode::OK,
        format!(
            "oauth_callback_confirmed=true&oauth_token={}&oauth_token_secret={}",
            REQUEST_TOKEN, REQUEST_SECRET
        ),
    )
        .into_response()
}

async fn access_token(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !signature_ok(&state, "GET", "/services/oauth/access_token", &params, Some(REQUEST_SECRET)) {
        return (StatusCode::UNAUTHORIZED, "oauth_problem=signature_invalid").into_response();
    }
    if params.get("oauth_token").map(String::as_str) != Some(REQUEST_TOKEN)
        || params.get("oauth_verifier").map(String::as_str) != Some(VERIFIER)
    {
        return (StatusCode::UNAUTHORIZED, "oauth_problem=token_rejected").into_response();
    }
    (
        StatusCode::OK,
        format!(
            "fullname=Jane%20Doe&oauth_token={}&oauth_token_secret={}&user_nsid=12345%40N01&username=jane",
            ACCESS_TOKEN, ACCESS_SECRET
        ),
    )
        .into_response()
}

async fn upload(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let text = String::from_utf8_lossy(&body).to_string();
    if !content_type.starts_with("multipart/form-data") || !text.contains(ACCESS_TOKEN) {
        return (StatusCode::BAD_REQUEST, "expected a signed multipart upload").into_response();
    }
    let unsupported = text.contains("filename=\"notes.txt\"");
    state.uploads.lock().unwrap().push(text);
    // The upload service reports failures with a 200 and stat="fail"
    let body = if unsupported {
        "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<rsp stat=\"fail\">\n<err code=\"5\" msg=\"Filetype was not recognised\" />\n</rsp>"
    } else {
        "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<rsp stat=\"ok\">\n<photoid>1234</photoid>\n</rsp>"
    };
    (StatusCode::OK, body).into_response()
}

#[derive(Deserialize, Debug)]
struct FlickrOauth1Token {
    token: String,
    secret: String,
}

fn get_flickr_tokens(path: PathBuf) -> anyhow::Result<FlickrOauth1Token> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Live credentials for the ignored tests, from `FLICKR_API_KEY`, `FLICKR_API_SECRET`
/// and the token cache file named by `FLICKR_AUTH_CACHE`
pub fn get_live_config() -> anyhow::Result<(ClientConfig, AccessGrant)> {
    let api_key = std::env::var("FLICKR_API_KEY")?;
    let api_secret = std::env::var("FLICKR_API_SECRET")?;
    let token_cache = std::env::var("FLICKR_AUTH_CACHE")?;
    let user_id = std::env::var("FLICKR_USER_ID")?;
    let tokens = get_flickr_tokens(token_cache.into())?;

    Ok((
        ClientConfig::new(&api_key, &api_secret),
        AccessGrant {
            credential: Credential::new(&tokens.token, &tokens.secret),
            user_id,
            username: None,
        },
    ))
}
