//! # Bakery API Client
//!
//! The [`BakeryApi`] trait names every REST call the console makes;
//! [`HttpClient`] implements it over `reqwest`.
//!
//! ## Request Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          One API Call                                   │
//! │                                                                         │
//! │  command ──► BakeryApi::list_products()                                 │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  build request  base_url + ["products"]  (each segment percent-encoded) │
//! │                 X-Request-Id: <uuid v4>                                 │
//! │                 Authorization: Bearer <token>   (if the slot holds one) │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  send ────────► no response ──────────────► ClientError::Transport      │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  status ──────► 401 ──────► Unauthorized { message }                    │
//! │                 404 ──────► NotFound { message }                        │
//! │                 other ────► Rejected { status, message }                │
//! │                 │                                                       │
//! │                 ▼ 2xx                                                   │
//! │  parse ───────► schema mismatch ──────────► ClientError::Parse          │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  typed payload (Vec<Product>)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::{Arc, RwLock};

use bakery_core::{
    AuthSuccess, Bill, BillRequest, CategoryValue, Credentials, DailyIncomeSeries, DateRange,
    IncomeStats, InventorySummary, Money, Product, ProductDraft, Registration, User,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn, Instrument};
use url::Url;
use uuid::Uuid;

use crate::api::{
    BillBody, BillList, Envelope, ErrorBody, IncomeBody, ProductBody, ProductList, VerifyBody,
};
use crate::config::ConsoleConfig;
use crate::error::{ClientError, ClientResult};

/// Correlation header attached to every request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// API Trait
// =============================================================================

/// One method per backend call.
pub trait BakeryApi: Send + Sync {
    fn login(&self, credentials: &Credentials)
        -> impl Future<Output = ClientResult<AuthSuccess>> + Send;

    fn register(&self, registration: &Registration)
        -> impl Future<Output = ClientResult<()>> + Send;

    /// Checks `token` explicitly, independent of the shared slot.
    fn verify_token(&self, token: &str) -> impl Future<Output = ClientResult<User>> + Send;

    fn list_products(&self) -> impl Future<Output = ClientResult<Vec<Product>>> + Send;

    fn create_product(&self, draft: &ProductDraft)
        -> impl Future<Output = ClientResult<Product>> + Send;

    fn update_product(
        &self,
        id: &str,
        draft: &ProductDraft,
    ) -> impl Future<Output = ClientResult<Product>> + Send;

    fn delete_product(&self, id: &str) -> impl Future<Output = ClientResult<()>> + Send;

    fn inventory_total(&self) -> impl Future<Output = ClientResult<InventorySummary>> + Send;

    fn category_values(&self) -> impl Future<Output = ClientResult<Vec<CategoryValue>>> + Send;

    fn income_stats(&self, period: &str) -> impl Future<Output = ClientResult<IncomeStats>> + Send;

    fn daily_income(&self, range: &DateRange)
        -> impl Future<Output = ClientResult<DailyIncomeSeries>> + Send;

    fn generate_bill(&self, request: &BillRequest)
        -> impl Future<Output = ClientResult<Bill>> + Send;

    fn list_bills(&self) -> impl Future<Output = ClientResult<Vec<Bill>>> + Send;

    fn get_bill(&self, id: &str) -> impl Future<Output = ClientResult<Bill>> + Send;

    fn today_income(&self) -> impl Future<Output = ClientResult<Money>> + Send;

    fn update_today_income(&self, amount: Money)
        -> impl Future<Output = ClientResult<Money>> + Send;
}

// =============================================================================
// Shared Token Slot
// =============================================================================

/// The bearer token in use, shared between the session and the client.
///
/// The lock is only held to copy the value in or out, never across an
/// await point.
#[derive(Clone, Default)]
pub struct SharedToken(Arc<RwLock<Option<String>>>);

impl SharedToken {
    pub fn new(initial: Option<String>) -> Self {
        SharedToken(Arc::new(RwLock::new(initial)))
    }

    pub fn get(&self) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set(&self, token: Option<String>) {
        *self
            .0
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }
}

impl std::fmt::Debug for SharedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedToken(<redacted>)")
    }
}

// =============================================================================
// HTTP Client
// =============================================================================

#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    base: Url,
    token: SharedToken,
}

impl HttpClient {
    pub fn new(config: &ConsoleConfig, token: SharedToken) -> ClientResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {}", e)))?;
        let base_url = config.api.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)?;
        Ok(HttpClient {
            http,
            base_url,
            base,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &SharedToken {
        &self.token
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidConfig("API URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn headers(&self, request_id: &Uuid, bearer: Option<&str>) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from_str(&request_id.to_string())
                .map_err(|e| ClientError::InvalidConfig(format!("request id header: {}", e)))?,
        );
        if let Some(token) = bearer.filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::InvalidConfig("token is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Sends one request and returns the raw success body.
    ///
    /// `bearer` overrides the shared slot when given.
    async fn execute<F>(
        &self,
        method: Method,
        segments: &[&str],
        bearer: Option<String>,
        configure: F,
    ) -> ClientResult<Vec<u8>>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder + Send,
    {
        let url = self.endpoint(segments)?;
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "api",
            method = method.as_str(),
            path = url.path(),
            request_id = %request_id
        );

        async move {
            let bearer = match bearer {
                Some(token) => Some(token),
                None => self.token.get(),
            };
            let headers = self.headers(&request_id, bearer.as_deref())?;

            let builder = configure(self.http.request(method, url).headers(headers));
            let response = builder.send().await.map_err(|e| {
                warn!(error = %e, "Request failed without a response");
                ClientError::Transport(e.to_string())
            })?;

            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| ClientError::Transport(e.to_string()))?;

            if status.is_success() {
                debug!(status = status.as_u16(), bytes = body.len(), "Response received");
                Ok(body.to_vec())
            } else {
                let err = ClientError::from_status(status.as_u16(), ErrorBody::message_from(&body));
                warn!(status = status.as_u16(), error = %err, "Request rejected");
                Err(err)
            }
        }
        .instrument(span)
        .await
    }

    async fn call<T, F>(&self, method: Method, segments: &[&str], configure: F) -> ClientResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder + Send,
    {
        let body = self.execute(method, segments, None, configure).await?;
        parse(&body)
    }
}

/// Rejects ids that would not address exactly one path segment.
fn resource_id(id: &str) -> ClientResult<&str> {
    match id {
        "" | "." | ".." => Err(ClientError::InvalidId(id.to_string())),
        _ => Ok(id),
    }
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> ClientResult<T> {
    serde_json::from_slice(body).map_err(|e| ClientError::Parse(e.to_string()))
}

fn no_body(builder: RequestBuilder) -> RequestBuilder {
    builder
}

// =============================================================================
// Endpoint Mapping
// =============================================================================

impl BakeryApi for HttpClient {
    async fn login(&self, credentials: &Credentials) -> ClientResult<AuthSuccess> {
        self.call(Method::POST, &["auth", "login"], |b| b.json(credentials)).await
    }

    async fn register(&self, registration: &Registration) -> ClientResult<()> {
        self.execute(Method::POST, &["auth", "register"], None, |b| b.json(registration))
            .await
            .map(|_| ())
    }

    async fn verify_token(&self, token: &str) -> ClientResult<User> {
        let body = self
            .execute(Method::GET, &["auth", "verify"], Some(token.to_string()), no_body)
            .await?;
        parse::<VerifyBody>(&body).map(|b| b.user)
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.call::<Envelope<ProductList>, _>(Method::GET, &["products"], no_body)
            .await
            .map(|e| e.data.into_vec())
    }

    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<Product> {
        self.call::<Envelope<ProductBody>, _>(Method::POST, &["products"], |b| b.json(draft))
            .await
            .map(|e| e.data.product)
    }

    async fn update_product(&self, id: &str, draft: &ProductDraft) -> ClientResult<Product> {
        let id = resource_id(id)?;
        self.call::<Envelope<ProductBody>, _>(Method::PATCH, &["products", id], |b| b.json(draft))
            .await
            .map(|e| e.data.product)
    }

    async fn delete_product(&self, id: &str) -> ClientResult<()> {
        let id = resource_id(id)?;
        self.execute(Method::DELETE, &["products", id], None, no_body)
            .await
            .map(|_| ())
    }

    async fn inventory_total(&self) -> ClientResult<InventorySummary> {
        self.call::<Envelope<InventorySummary>, _>(Method::GET, &["products", "inventory", "total"], no_body)
            .await
            .map(|e| e.data)
    }

    async fn category_values(&self) -> ClientResult<Vec<CategoryValue>> {
        self.call::<Envelope<Vec<CategoryValue>>, _>(
            Method::GET,
            &["products", "category-wise-value"],
            no_body,
        )
        .await
        .map(|e| e.data)
    }

    async fn income_stats(&self, period: &str) -> ClientResult<IncomeStats> {
        self.call::<Envelope<IncomeStats>, _>(
            Method::GET,
            &["products", "inventory", "income-stats"],
            |b| b.query(&[("period", period)]),
        )
        .await
        .map(|e| e.data)
    }

    async fn daily_income(&self, range: &DateRange) -> ClientResult<DailyIncomeSeries> {
        let (start, end) = range.query_pair();
        self.call::<Envelope<DailyIncomeSeries>, _>(Method::GET, &["products", "daily-income"], |b| {
            b.query(&[("startDate", start), ("endDate", end)])
        })
        .await
        .map(|e| e.data)
    }

    async fn generate_bill(&self, request: &BillRequest) -> ClientResult<Bill> {
        self.call::<Envelope<BillBody>, _>(Method::POST, &["bills", "generate"], |b| b.json(request))
            .await
            .map(|e| e.data.bill)
    }

    async fn list_bills(&self) -> ClientResult<Vec<Bill>> {
        self.call::<Envelope<BillList>, _>(Method::GET, &["bills"], no_body)
            .await
            .map(|e| e.data.bills)
    }

    async fn get_bill(&self, id: &str) -> ClientResult<Bill> {
        let id = resource_id(id)?;
        self.call::<Envelope<BillBody>, _>(Method::GET, &["bills", id], no_body)
            .await
            .map(|e| e.data.bill)
    }

    async fn today_income(&self) -> ClientResult<Money> {
        self.call::<Envelope<IncomeBody>, _>(Method::GET, &["bills", "today", "income"], no_body)
            .await
            .map(|e| e.data.income)
    }

    async fn update_today_income(&self, amount: Money) -> ClientResult<Money> {
        let body = IncomeBody { income: amount };
        self.call::<Envelope<IncomeBody>, _>(Method::POST, &["bills", "today", "income"], move |b| {
            b.json(&body)
        })
        .await
        .map(|e| e.data.income)
    }
}
