//! REST client for the monitoring backend.
//!
//! Wraps every endpoint the dashboard consumes.  Built on `reqwest`, so the
//! same client runs natively (server functions, tests) and in the browser
//! (where reqwest delegates to `fetch`).

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::auth::{
    Ack, ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest, SignupRequest,
    ValidateOtpRequest, VerifyCodeRequest,
};
use crate::calendar::{CalendarEvent, NewEvent};
use crate::error::{Error, Result};
use crate::history::{parse_series, TimeRange};
use crate::model::{Account, AccountDraft, Establishment, EstablishmentDraft};
use crate::notification::{NewNotification, Notification, NotificationScope};
use crate::sensor::{parse_latest, Reading, SensorKind};
use crate::session::SessionUser;

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach the session token as a bearer credential on every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn check(path: &str, resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                ["message", "error"]
                    .iter()
                    .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        Err(Error::Status {
            status: status.as_u16(),
            path: path.to_string(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, path: &str, rb: RequestBuilder) -> Result<T> {
        debug!("→ {path}");
        let resp = Self::check(path, rb.send().await?).await?;
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| Error::Decode(format!("{path}: {e}")))
    }

    /// For endpoints whose body is irrelevant (or empty).
    async fn send_unit(&self, path: &str, rb: RequestBuilder) -> Result<()> {
        debug!("→ {path}");
        Self::check(path, rb.send().await?).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(path, self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(path, self.request(Method::POST, path).json(body)).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(path, self.request(Method::PUT, path).json(body)).await
    }

    async fn put_empty(&self, path: &str) -> Result<()> {
        self.send_unit(path, self.request(Method::PUT, path)).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.send_unit(path, self.request(Method::DELETE, path)).await
    }

    // ── sensors ──────────────────────────────────────────────────────

    pub async fn latest(&self) -> Result<std::collections::BTreeMap<SensorKind, Reading>> {
        let doc: Value = self.get("/api/sensors/latest").await?;
        Ok(parse_latest(&doc))
    }

    pub async fn series(&self, kind: SensorKind, range: TimeRange) -> Result<Vec<Reading>> {
        let path = format!("/data/{}/{}", kind.slug(), range.as_str());
        let doc: Value = self.get(&path).await?;
        Ok(parse_series(&doc))
    }

    // ── notifications ────────────────────────────────────────────────

    pub async fn notifications(&self, scope: &NotificationScope) -> Result<Vec<Notification>> {
        let path = scope.base_path();
        let doc: Value = self.get(&path).await?;
        let list = match doc {
            Value::Object(mut obj) => obj.remove("notifications").unwrap_or(Value::Array(vec![])),
            other => other,
        };
        serde_json::from_value(list).map_err(|e| Error::Decode(format!("{path}: {e}")))
    }

    pub async fn create_notification(&self, scope: &NotificationScope, n: &NewNotification) -> Result<Value> {
        self.post(&scope.base_path(), n).await
    }

    pub async fn mark_read(&self, scope: &NotificationScope, id: &str) -> Result<()> {
        self.put_empty(&format!("{}/{id}/read", scope.base_path())).await
    }

    pub async fn mark_all_read(&self, scope: &NotificationScope) -> Result<()> {
        self.put_empty(&format!("{}/read-all", scope.base_path())).await
    }

    pub async fn delete_notification(&self, scope: &NotificationScope, id: &str) -> Result<()> {
        self.delete(&format!("{}/{id}", scope.base_path())).await
    }

    pub async fn delete_all_notifications(&self, scope: &NotificationScope) -> Result<()> {
        self.delete(&scope.base_path()).await
    }

    /// Grant an access request.  The backend marks the requester verified.
    pub async fn approve(&self, id: &str) -> Result<()> {
        self.put_empty(&format!("{}/{id}/approve", NotificationScope::SuperAdmin.base_path()))
            .await
    }

    pub async fn decline(&self, id: &str) -> Result<()> {
        self.put_empty(&format!("{}/{id}/decline", NotificationScope::SuperAdmin.base_path()))
            .await
    }

    // ── accounts ─────────────────────────────────────────────────────

    pub async fn users(&self) -> Result<Vec<Account>> {
        self.get("/api/users").await
    }

    pub async fn create_user(&self, draft: &AccountDraft) -> Result<Account> {
        self.post("/api/users", draft).await
    }

    pub async fn update_user(&self, id: &str, draft: &AccountDraft) -> Result<Account> {
        self.put(&format!("/api/users/{id}"), draft).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/users/{id}")).await
    }

    pub async fn admins(&self) -> Result<Vec<Account>> {
        self.get("/admin").await
    }

    pub async fn create_admin(&self, draft: &AccountDraft) -> Result<Account> {
        self.post("/admin", draft).await
    }

    pub async fn update_admin(&self, id: &str, draft: &AccountDraft) -> Result<Account> {
        self.put(&format!("/admin/{id}"), draft).await
    }

    pub async fn delete_admin(&self, id: &str) -> Result<()> {
        self.delete(&format!("/admin/{id}")).await
    }

    // ── establishments ───────────────────────────────────────────────

    pub async fn establishments(&self) -> Result<Vec<Establishment>> {
        self.get("/api/establishments").await
    }

    pub async fn create_establishment(&self, draft: &EstablishmentDraft) -> Result<Establishment> {
        self.post("/api/establishments", draft).await
    }

    pub async fn update_establishment(
        &self,
        id: &str,
        draft: &EstablishmentDraft,
    ) -> Result<Establishment> {
        self.put(&format!("/api/establishments/{id}"), draft).await
    }

    pub async fn delete_establishment(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/establishments/{id}")).await
    }

    // ── calendar ─────────────────────────────────────────────────────

    pub async fn events(&self) -> Result<Vec<CalendarEvent>> {
        self.get("/events").await
    }

    pub async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent> {
        self.post("/events", event).await
    }

    pub async fn delete_event(&self, id: &str) -> Result<()> {
        self.delete(&format!("/events/{id}")).await
    }

    // ── auth ─────────────────────────────────────────────────────────

    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        self.post("/login", req).await
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<SessionUser> {
        let doc: Value = self.post("/users", req).await?;
        // Some deployments wrap the created user as `{ user: {...} }`.
        let user = doc.get("user").cloned().unwrap_or(doc);
        serde_json::from_value(user).map_err(|e| Error::Decode(format!("/users: {e}")))
    }

    pub async fn verify_code(&self, req: &VerifyCodeRequest) -> Result<Ack> {
        self.post("/verify-code", req).await
    }

    pub async fn forgot_password(&self, req: &ForgotPasswordRequest) -> Result<Ack> {
        self.post("/api/forgot-password", req).await
    }

    pub async fn validate_otp(&self, req: &ValidateOtpRequest) -> Result<Ack> {
        self.post("/api/validate-otp", req).await
    }

    pub async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<Ack> {
        self.post("/api/reset-password", req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let c = BackendClient::new("http://localhost:5000/");
        assert_eq!(c.base_url(), "http://localhost:5000");
    }
}
