//! Reqwest-backed vendor client.
//!
//! Owns OAuth token caching, the single retry after a 401, and paging through
//! listing endpoints. Transport failures are never retried.

use super::dto::{PageDto, TokenResponseDto};
use super::{GatewayError, GatewayResult, VendorCollection, VendorGateway};
use crate::config::VendorSettings;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{Client, Method, Response, StatusCode, header};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Tokens this close to expiry are refreshed before use.
const TOKEN_SAFETY_MARGIN_SECONDS: i64 = 30;

/// Lifetime given to a configured static token.
const FAKE_TOKEN_LIFETIME_DAYS: i64 = 365;

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(TOKEN_SAFETY_MARGIN_SECONDS) < self.expires_at
    }
}

/// Client for the John Deere Operations Center API.
///
/// The token cache is shared by concurrent requests. Two requests may both
/// decide to refresh; the last write wins, which is harmless.
pub struct JohnDeereClient {
    http: Client,
    settings: VendorSettings,
    token: RwLock<Option<AccessToken>>,
}

impl JohnDeereClient {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: VendorSettings) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            settings,
            token: RwLock::new(None),
        })
    }

    /// Makes sure a usable bearer token is cached.
    ///
    /// Does nothing while the cached token is valid for more than the safety
    /// margin, unless `force_refresh` is set. A configured static token skips
    /// the OAuth exchange entirely.
    #[instrument(skip(self))]
    pub async fn authenticate(&self, force_refresh: bool) -> GatewayResult<()> {
        let now = Utc::now();

        if let Some(fake) = &self.settings.fake_token {
            *self.token.write().await = Some(AccessToken {
                value: fake.clone(),
                expires_at: now + ChronoDuration::days(FAKE_TOKEN_LIFETIME_DAYS),
            });
            return Ok(());
        }

        if !force_refresh
            && let Some(token) = self.token.read().await.as_ref()
            && token.is_fresh(now)
        {
            return Ok(());
        }

        debug!("Requesting a new vendor access token");
        let response = self
            .http
            .post(&self.settings.auth_url)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
            ])
            .send()
            .await?;

        let body = read_json(response).await?.ok_or_else(|| {
            GatewayError::Decode("token endpoint returned an empty body".to_string())
        })?;
        let token: TokenResponseDto = serde_json::from_value(body)
            .map_err(|e| GatewayError::Decode(format!("invalid token response: {e}")))?;

        let expires_at = ChronoDuration::try_seconds(token.expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                GatewayError::Decode(format!(
                    "token expires_in out of range: {}",
                    token.expires_in
                ))
            })?;
        *self.token.write().await = Some(AccessToken {
            value: token.access_token,
            expires_at,
        });
        info!(expires_in = token.expires_in, "Vendor access token refreshed");
        Ok(())
    }

    /// Issues an authenticated request against `api_base + path`.
    ///
    /// A 401 with `retry_on_unauthorized` set forces one re-authentication and
    /// one more attempt; the second attempt never retries. Any other non-2xx
    /// status is returned as [`GatewayError::Status`]. An empty body yields `None`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
        retry_on_unauthorized: bool,
    ) -> GatewayResult<Option<Value>> {
        let mut response = self.send_once(&method, path, params, body).await?;

        if response.status() == StatusCode::UNAUTHORIZED && retry_on_unauthorized {
            warn!(%method, path, "Vendor rejected the access token, re-authenticating");
            self.authenticate(true).await?;
            response = self.send_once(&method, path, params, body).await?;
        }

        read_json(response).await
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> GatewayResult<Response> {
        self.authenticate(false).await?;
        let bearer = self
            .token
            .read()
            .await
            .as_ref()
            .map(|token| token.value.clone())
            .unwrap_or_default();

        let url = format!("{}{}", self.settings.api_base.trim_end_matches('/'), path);
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(bearer)
            .header(header::ACCEPT, "application/json");
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(json) = body {
            request = request.json(json);
        }
        Ok(request.send().await?)
    }

    /// Pages through a listing endpoint until the reported total is reached or
    /// a page comes back empty.
    ///
    /// Without a reported total, a short page ends the listing.
    #[instrument(skip(self))]
    async fn list_all(&self, path: &str, org_param: &str) -> GatewayResult<VendorCollection> {
        let page_size = self.settings.page_size.max(1) as usize;
        let mut values: Vec<Value> = Vec::new();

        loop {
            let params = [
                (org_param, self.settings.org_id.clone()),
                ("pageOffset", values.len().to_string()),
                ("itemLimit", page_size.to_string()),
            ];
            let page: PageDto = match self.request(Method::GET, path, &params, None, true).await? {
                Some(json) => serde_json::from_value(json)
                    .map_err(|e| GatewayError::Decode(format!("invalid page from {path}: {e}")))?,
                None => PageDto::default(),
            };

            let fetched = page.values.len();
            values.extend(page.values);

            if fetched == 0 {
                break;
            }
            match page.total {
                Some(total) if values.len() >= total => break,
                None if fetched < page_size => break,
                _ => {}
            }
        }

        debug!(path, count = values.len(), "Vendor listing complete");
        Ok(VendorCollection { values })
    }

    fn work_plans_path(&self) -> String {
        format!("/organizations/{}/workPlans", self.settings.org_id)
    }
}

async fn read_json(response: Response) -> GatewayResult<Option<Value>> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        return Err(GatewayError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    if bytes.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| GatewayError::Decode(format!("invalid JSON body: {e}")))
}

#[async_trait]
impl VendorGateway for JohnDeereClient {
    async fn list_equipment(&self) -> GatewayResult<VendorCollection> {
        self.list_all("/equipment", "organizationIds").await
    }

    async fn list_fields(&self) -> GatewayResult<VendorCollection> {
        self.list_all("/fields", "organizationId").await
    }

    async fn list_field_operations(&self) -> GatewayResult<VendorCollection> {
        self.list_all("/fieldOperations", "organizationId").await
    }

    async fn get_field_operation(&self, operation_id: &str) -> GatewayResult<Option<Value>> {
        let path = format!("/fieldOperations/{operation_id}");
        self.request(Method::GET, &path, &[], None, true).await
    }

    async fn get_field_operation_measurements(
        &self,
        operation_id: &str,
        measurement_type: Option<&str>,
    ) -> GatewayResult<Option<Value>> {
        let mut path = format!("/fieldOperations/{operation_id}/measurementTypes");
        if let Some(kind) = measurement_type {
            path.push('/');
            path.push_str(kind);
        }
        self.request(Method::GET, &path, &[], None, true).await
    }

    async fn create_work_plan(&self, payload: &Value) -> GatewayResult<Option<Value>> {
        let path = self.work_plans_path();
        self.request(Method::POST, &path, &[], Some(payload), true)
            .await
    }

    async fn update_work_plan(
        &self,
        plan_id: i32,
        payload: &Value,
    ) -> GatewayResult<Option<Value>> {
        let path = format!("{}/{plan_id}", self.work_plans_path());
        self.request(Method::PUT, &path, &[], Some(payload), true)
            .await
    }

    async fn delete_work_plan(&self, plan_id: i32) -> GatewayResult<Option<Value>> {
        let path = format!("{}/{plan_id}", self.work_plans_path());
        self.request(Method::DELETE, &path, &[], None, true).await
    }
}
