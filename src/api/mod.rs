use crate::models::{LinkItem, News, Profile, Session};
use crate::storage::{clear_session, load_session, save_session};
use crate::util::{file_ext, normalize_slug, now_ms};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    /// No live session; raised before any network call.
    Unauthenticated,
    /// Backend rejected the credentials (HTTP 401).
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn unauthenticated() -> Self {
        Self {
            kind: ApiErrorKind::Unauthenticated,
            message: "Sign in to continue".to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        // Prefer the backend-provided message; the raw body is often JSON noise.
        let message = extract_backend_message(&body)
            .unwrap_or_else(|| format!("{ctx} ({status}): {body}"));
        Self {
            kind: ApiErrorKind::Http,
            message,
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Runtime configuration injected by the hosting page as `window.ENV`.
#[derive(Clone, Debug)]
pub(crate) struct EnvConfig {
    pub supabase_url: String,
    pub anon_key: String,
    pub showcase_slug: String,
}

fn env_str(env: &wasm_bindgen::JsValue, key: &str) -> Option<String> {
    js_sys::Reflect::get(env, &key.into())
        .ok()
        .and_then(|v| v.as_string())
        .filter(|s| !s.trim().is_empty())
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut cfg = Self {
            supabase_url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            showcase_slug: "biolink".to_string(),
        };

        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Some(url) = env_str(&env, "SUPABASE_URL") {
                        cfg.supabase_url = url;
                    }
                    if let Some(key) = env_str(&env, "SUPABASE_ANON_KEY") {
                        cfg.anon_key = key;
                    }
                    if let Some(slug) = env_str(&env, "SHOWCASE_SLUG") {
                        cfg.showcase_slug = slug;
                    }
                }
            }
        }

        cfg
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

const TABLE_PROFILES: &str = "profiles";
const TABLE_LINKS: &str = "tools";
const TABLE_NEWS: &str = "news";
const STORAGE_BUCKET: &str = "biolink";
const RPC_INCREMENT_CLICKS: &str = "increment_tool_clicks";

/// Rows endpoint with equality filters and an optional `order` clause.
fn rest_url(base: &str, table: &str, filters: &[(&str, &str)], order: Option<&str>) -> String {
    let mut url = format!("{base}/rest/v1/{table}");
    let mut sep = '?';
    for (field, value) in filters {
        url.push(sep);
        url.push_str(&format!("{field}=eq.{}", urlencoding::encode(value)));
        sep = '&';
    }
    if let Some(order) = order {
        url.push(sep);
        url.push_str(&format!("order={order}"));
    }
    url
}

fn auth_url(base: &str, path: &str) -> String {
    format!("{base}/auth/v1/{path}")
}

fn rpc_url(base: &str, function: &str) -> String {
    format!("{base}/rest/v1/rpc/{function}")
}

/// Storage path namespaced by owner and purpose tag, e.g.
/// `u1/avatars/1756500000000.png`.
fn object_path(owner_id: &str, purpose: &str, now_ms: i64, ext: &str) -> String {
    format!("{owner_id}/{purpose}/{now_ms}.{ext}")
}

fn object_upload_url(base: &str, path: &str) -> String {
    format!("{base}/storage/v1/object/{STORAGE_BUCKET}/{path}")
}

fn public_object_url(base: &str, path: &str) -> String {
    format!("{base}/storage/v1/object/public/{STORAGE_BUCKET}/{path}")
}

/// Supabase services disagree on the error field name; accept the common ones.
fn extract_backend_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["message", "msg", "error_description", "error"] {
        if let Some(s) = v.get(key).and_then(|m| m.as_str()) {
            if !s.trim().is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

fn single_row<T>(rows: Vec<T>) -> Option<T> {
    rows.into_iter().next()
}

pub(crate) fn generated_default_slug() -> String {
    format!("user-{}", (js_sys::Math::random() * 10_000.0) as u32)
}

/// Link payload for create/update; `click_count` is intentionally absent.
#[derive(Serialize, Clone, Debug)]
pub(crate) struct LinkPayload {
    pub title: String,
    pub description: String,
    pub url: String,
    pub icon_url: String,
}

#[derive(Serialize, Clone, Debug)]
pub(crate) struct NewsPayload {
    pub title: String,
    pub content: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
}

/// Thin client over the managed backend: auth, PostgREST rows, object
/// storage, one RPC. Constructed once at startup and held in `AppState`;
/// consumers receive it as a dependency, never via a global.
#[derive(Clone)]
pub(crate) struct BackendClient {
    pub(crate) base_url: String,
    pub(crate) anon_key: String,
    pub(crate) session: Option<Session>,
}

impl BackendClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            base_url,
            anon_key,
            session: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let cfg = EnvConfig::new();
        Self {
            base_url: cfg.supabase_url,
            anon_key: cfg.anon_key,
            session: load_session(),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn sign_out(&mut self) {
        self.session = None;
        clear_session();
    }

    fn require_session(&self) -> ApiResult<&Session> {
        self.session.as_ref().ok_or_else(ApiError::unauthenticated)
    }

    fn with_common_headers(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req = req.header("apikey", self.anon_key.clone());
        let bearer = self
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone());
        req.header("Authorization", format!("Bearer {bearer}"))
    }

    async fn exec(
        &self,
        req: reqwest::RequestBuilder,
        ctx: &str,
    ) -> ApiResult<reqwest::Response> {
        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(res)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, ctx))
        }
    }

    async fn get_rows<T: DeserializeOwned>(&self, url: String, ctx: &str) -> ApiResult<Vec<T>> {
        let client = reqwest::Client::new();
        let req = self.with_common_headers(client.get(url));
        let res = self.exec(req, ctx).await?;
        res.json().await.map_err(ApiError::parse)
    }

    /// Insert/upsert returning the affected rows.
    async fn write_returning<T: DeserializeOwned>(
        &self,
        url: String,
        body: &impl Serialize,
        prefer: &str,
        ctx: &str,
    ) -> ApiResult<Vec<T>> {
        let client = reqwest::Client::new();
        let req = self
            .with_common_headers(client.post(url))
            .header("Prefer", prefer)
            .json(body);
        let res = self.exec(req, ctx).await?;
        res.json().await.map_err(ApiError::parse)
    }

    async fn write_void<B: Serialize>(
        &self,
        method: reqwest::Method,
        url: String,
        body: Option<&B>,
        ctx: &str,
    ) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let mut req = self.with_common_headers(client.request(method, url));
        if let Some(b) = body {
            req = req.json(b);
        }
        self.exec(req, ctx).await?;
        Ok(())
    }

    // ---- auth -----------------------------------------------------------

    pub async fn sign_in(&mut self, email: &str, password: &str) -> ApiResult<Session> {
        let client = reqwest::Client::new();
        let url = format!("{}?grant_type=password", auth_url(&self.base_url, "token"));
        let req = self
            .with_common_headers(client.post(url))
            .json(&serde_json::json!({ "email": email, "password": password }));

        let res = self.exec(req, "Sign in failed").await?;
        let data: serde_json::Value = res.json().await.map_err(ApiError::parse)?;

        let session = session_from_auth_response(&data)
            .ok_or_else(|| ApiError::parse("auth response is missing access_token or user id"))?;

        self.session = Some(session.clone());
        save_session(&session);
        Ok(session)
    }

    /// Creates the auth account. The caller seeds the profile row afterwards
    /// (the backend returns no session when email confirmation is pending).
    pub async fn sign_up(&self, email: &str, password: &str) -> ApiResult<Option<Session>> {
        let client = reqwest::Client::new();
        let req = self
            .with_common_headers(client.post(auth_url(&self.base_url, "signup")))
            .json(&serde_json::json!({ "email": email, "password": password }));

        let res = self.exec(req, "Sign up failed").await?;
        let data: serde_json::Value = res.json().await.map_err(ApiError::parse)?;
        Ok(session_from_auth_response(&data))
    }

    // ---- rows -----------------------------------------------------------

    pub async fn profile_by_slug(&self, slug: &str) -> ApiResult<Option<Profile>> {
        let slug = normalize_slug(slug);
        let url = rest_url(&self.base_url, TABLE_PROFILES, &[("slug", slug.as_str())], None);
        let rows: Vec<Profile> = self.get_rows(url, "Profile lookup failed").await?;
        Ok(single_row(rows))
    }

    pub async fn profile_by_owner(&self, owner_id: &str) -> ApiResult<Option<Profile>> {
        let url = rest_url(&self.base_url, TABLE_PROFILES, &[("id", owner_id)], None);
        let rows: Vec<Profile> = self.get_rows(url, "Profile lookup failed").await?;
        Ok(single_row(rows))
    }

    pub async fn links_for_owner(&self, owner_id: &str) -> ApiResult<Vec<LinkItem>> {
        let url = rest_url(
            &self.base_url,
            TABLE_LINKS,
            &[("user_id", owner_id)],
            Some("created_at.desc"),
        );
        self.get_rows(url, "Loading links failed").await
    }

    pub async fn news_for_owner(&self, owner_id: &str) -> ApiResult<Vec<News>> {
        let url = rest_url(
            &self.base_url,
            TABLE_NEWS,
            &[("user_id", owner_id)],
            Some("created_at.desc"),
        );
        self.get_rows(url, "Loading news failed").await
    }

    pub async fn insert_link(&self, payload: &LinkPayload) -> ApiResult<LinkItem> {
        let session = self.require_session()?;
        let url = rest_url(&self.base_url, TABLE_LINKS, &[], None);
        let mut body = serde_json::to_value(payload).map_err(ApiError::parse)?;
        body["user_id"] = serde_json::Value::String(session.owner_id.clone());

        let rows: Vec<LinkItem> = self
            .write_returning(url, &vec![body], "return=representation", "Creating link failed")
            .await?;
        single_row(rows).ok_or_else(|| ApiError::parse("insert returned no row"))
    }

    pub async fn update_link(&self, id: &str, payload: &LinkPayload) -> ApiResult<()> {
        self.require_session()?;
        let url = rest_url(&self.base_url, TABLE_LINKS, &[("id", id)], None);
        self.write_void(reqwest::Method::PATCH, url, Some(payload), "Updating link failed")
            .await
    }

    pub async fn delete_link(&self, id: &str) -> ApiResult<()> {
        self.require_session()?;
        let url = rest_url(&self.base_url, TABLE_LINKS, &[("id", id)], None);
        self.write_void(reqwest::Method::DELETE, url, None::<&()>, "Deleting link failed")
            .await
    }

    pub async fn insert_news(&self, payload: &NewsPayload) -> ApiResult<News> {
        let session = self.require_session()?;
        let url = rest_url(&self.base_url, TABLE_NEWS, &[], None);
        let mut body = serde_json::to_value(payload).map_err(ApiError::parse)?;
        body["user_id"] = serde_json::Value::String(session.owner_id.clone());

        let rows: Vec<News> = self
            .write_returning(url, &vec![body], "return=representation", "Publishing failed")
            .await?;
        single_row(rows).ok_or_else(|| ApiError::parse("insert returned no row"))
    }

    pub async fn update_news(&self, id: &str, payload: &NewsPayload) -> ApiResult<()> {
        self.require_session()?;
        let url = rest_url(&self.base_url, TABLE_NEWS, &[("id", id)], None);
        self.write_void(reqwest::Method::PATCH, url, Some(payload), "Updating post failed")
            .await
    }

    pub async fn delete_news(&self, id: &str) -> ApiResult<()> {
        self.require_session()?;
        let url = rest_url(&self.base_url, TABLE_NEWS, &[("id", id)], None);
        self.write_void(reqwest::Method::DELETE, url, None::<&()>, "Deleting post failed")
            .await
    }

    /// Seed or overwrite the caller's own profile row (primary-key upsert).
    pub async fn upsert_profile(&self, profile: &Profile) -> ApiResult<()> {
        let session = self.require_session()?;
        let url = rest_url(&self.base_url, TABLE_PROFILES, &[], None);

        let mut row = profile.clone();
        row.id = session.owner_id.clone();
        row.slug = row.slug.as_deref().map(normalize_slug).filter(|s| !s.is_empty());

        let _: Vec<Profile> = self
            .write_returning(
                url,
                &vec![row],
                "resolution=merge-duplicates,return=representation",
                "Saving profile failed",
            )
            .await?;
        Ok(())
    }

    // ---- storage --------------------------------------------------------

    /// Upload under `{owner}/{purpose}/{ts}.{ext}` and return the public URL.
    pub async fn upload_object(
        &self,
        purpose: &str,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ApiResult<String> {
        let session = self.require_session()?;
        let path = object_path(&session.owner_id, purpose, now_ms(), &file_ext(filename));

        let client = reqwest::Client::new();
        let req = self
            .with_common_headers(client.post(object_upload_url(&self.base_url, &path)))
            .header("x-upsert", "true")
            .header("Content-Type", content_type.to_string())
            .body(bytes);

        self.exec(req, "Upload failed").await?;
        Ok(public_object_url(&self.base_url, &path))
    }

    // ---- rpc ------------------------------------------------------------

    /// Callers detach this; its failure must never block link activation.
    pub async fn increment_link_clicks(&self, link_id: &str) -> ApiResult<()> {
        let url = rpc_url(&self.base_url, RPC_INCREMENT_CLICKS);
        self.write_void(
            reqwest::Method::POST,
            url,
            Some(&serde_json::json!({ "row_id": link_id })),
            "Click tracking failed",
        )
        .await
    }
}

fn session_from_auth_response(data: &serde_json::Value) -> Option<Session> {
    let access_token = data.get("access_token")?.as_str()?.to_string();
    let user = data.get("user")?;
    let owner_id = user.get("id")?.as_str()?.to_string();
    let email = user
        .get("email")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Some(Session {
        access_token,
        owner_id,
        email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_url_single_filter() {
        assert_eq!(
            rest_url("https://x.supabase.co", "profiles", &[("slug", "acme")], None),
            "https://x.supabase.co/rest/v1/profiles?slug=eq.acme"
        );
    }

    #[test]
    fn rest_url_filter_and_order() {
        assert_eq!(
            rest_url(
                "https://x.supabase.co",
                "tools",
                &[("user_id", "u1")],
                Some("created_at.desc")
            ),
            "https://x.supabase.co/rest/v1/tools?user_id=eq.u1&order=created_at.desc"
        );
    }

    #[test]
    fn rest_url_encodes_filter_values() {
        let url = rest_url("https://x", "profiles", &[("slug", "a b&c")], None);
        assert_eq!(url, "https://x/rest/v1/profiles?slug=eq.a%20b%26c");
    }

    #[test]
    fn rest_url_no_filters() {
        assert_eq!(rest_url("https://x", "news", &[], None), "https://x/rest/v1/news");
    }

    #[test]
    fn object_path_is_owner_and_purpose_namespaced() {
        assert_eq!(
            object_path("u1", "avatars", 1_756_500_000_000, "png"),
            "u1/avatars/1756500000000.png"
        );
    }

    #[test]
    fn public_object_url_matches_storage_layout() {
        assert_eq!(
            public_object_url("https://x.supabase.co", "u1/icons/1.png"),
            "https://x.supabase.co/storage/v1/object/public/biolink/u1/icons/1.png"
        );
    }

    #[test]
    fn rpc_url_layout() {
        assert_eq!(
            rpc_url("https://x", "increment_tool_clicks"),
            "https://x/rest/v1/rpc/increment_tool_clicks"
        );
    }

    #[test]
    fn extract_backend_message_prefers_message_field() {
        assert_eq!(
            extract_backend_message(r#"{"message": "duplicate key"}"#).as_deref(),
            Some("duplicate key")
        );
        assert_eq!(
            extract_backend_message(r#"{"error_description": "invalid login"}"#).as_deref(),
            Some("invalid login")
        );
        assert_eq!(extract_backend_message("not json"), None);
        assert_eq!(extract_backend_message(r#"{"message": ""}"#), None);
    }

    #[test]
    fn session_from_auth_response_contract() {
        let data: serde_json::Value = serde_json::from_str(
            r#"{
                "access_token": "jwt",
                "token_type": "bearer",
                "user": {"id": "u1", "email": "u@example.com"}
            }"#,
        )
        .expect("fixture should parse");

        let s = session_from_auth_response(&data).expect("should build session");
        assert_eq!(s.access_token, "jwt");
        assert_eq!(s.owner_id, "u1");
        assert_eq!(s.email, "u@example.com");
    }

    #[test]
    fn session_from_auth_response_requires_token_and_user() {
        let data: serde_json::Value =
            serde_json::from_str(r#"{"user": {"id": "u1"}}"#).expect("fixture should parse");
        assert!(session_from_auth_response(&data).is_none());
    }

    #[test]
    fn writes_fail_fast_without_a_session() {
        let client = BackendClient::new("https://x".to_string(), "anon".to_string());
        let err = client.require_session().expect_err("no session");
        assert_eq!(err.kind, ApiErrorKind::Unauthenticated);
    }

    #[test]
    fn single_row_takes_first() {
        assert_eq!(single_row(vec![1, 2, 3]), Some(1));
        assert_eq!(single_row(Vec::<i32>::new()), None);
    }
}
