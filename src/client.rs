use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, CLIENT_TRANSPORT_ERRORS,
};
use crate::types::{
    ChatRequest, ChatResponse, HealthResponse, HistoryResponse, LoginRequest, LoginResponse,
    MessageResponse, ModelListResponse, NewSessionResponse, RatingRequest, RegisterRequest,
    SessionListResponse,
};

const DEFAULT_API_URL: &str = "http://127.0.0.1:12000/api/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

///////////////////////////////////////////// Chatbot //////////////////////////////////////////////

/// Client for the chatbot backend API.
///
/// The client holds the bearer token in a shared slot, so clones handed to
/// the auth controller and the chat session observe the same login state.
/// Holding a token is not the same as the token being valid; callers that
/// need certainty go through [`Chatbot::me`].
#[derive(Clone, Debug)]
pub struct Chatbot {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    token: Arc<RwLock<Option<String>>>,
}

impl Chatbot {
    /// Create a new client.
    ///
    /// The base URL can be provided directly, read from the VIETBOT_API_URL
    /// environment variable, or defaulted to the local backend. A path
    /// without a trailing slash gains one so endpoint paths join under it.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => env::var("VIETBOT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        };
        let base_url = normalize_base_url(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// The API base URL requests resolve against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Install a bearer token; subsequent protected calls use it.
    pub async fn set_token<S: Into<String>>(&self, token: S) {
        *self.token.write().await = Some(token.into());
    }

    /// Drop the held bearer token.
    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    /// Whether a bearer token is currently held.
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    ////////////////////////////////////////// endpoints ///////////////////////////////////////////

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        let url = self.endpoint("auth/login")?;
        self.execute(self.client.post(url).headers(Self::default_headers()).json(req))
            .await
    }

    /// Create a new account. The server replies with an acknowledgement; no
    /// token is issued until the account logs in.
    pub async fn register(&self, req: &RegisterRequest) -> Result<MessageResponse> {
        let url = self.endpoint("auth/register")?;
        self.execute(self.client.post(url).headers(Self::default_headers()).json(req))
            .await
    }

    /// Check that the held token is still accepted.
    ///
    /// Any success status counts as valid; the body is not inspected.
    pub async fn me(&self) -> Result<()> {
        let url = self.endpoint("auth/me")?;
        let headers = self.auth_headers().await?;
        self.dispatch(self.client.get(url).headers(headers)).await?;
        Ok(())
    }

    /// Ask the server whether it can reach its model backend.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # tokio_test::block_on(async {
    /// let client = vietbot::Chatbot::new(None).unwrap();
    /// let health = client.health().await.unwrap();
    /// println!("ollama connected: {}", health.ollama_connected);
    /// # });
    /// ```
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint("health")?;
        self.execute(self.client.get(url).headers(Self::default_headers()))
            .await
    }

    /// Mint a fresh session id.
    pub async fn new_session(&self) -> Result<NewSessionResponse> {
        let url = self.endpoint("new-session")?;
        let headers = self.auth_headers().await?;
        self.execute(self.client.get(url).headers(headers)).await
    }

    /// Send one chat message and wait for the model's reply.
    pub async fn send_message(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint("chat")?;
        let headers = self.auth_headers().await?;
        self.execute(self.client.post(url).headers(headers).json(req))
            .await
    }

    /// List the stored sessions.
    pub async fn sessions(&self) -> Result<SessionListResponse> {
        let url = self.endpoint("sessions")?;
        let headers = self.auth_headers().await?;
        self.execute(self.client.get(url).headers(headers)).await
    }

    /// Fetch a session's stored exchanges.
    pub async fn history(&self, session_id: &str) -> Result<HistoryResponse> {
        let url = self.endpoint(&format!("history/{}", session_id))?;
        let headers = self.auth_headers().await?;
        self.execute(self.client.get(url).headers(headers)).await
    }

    /// Submit a star rating for a stored exchange.
    pub async fn rate(&self, req: &RatingRequest) -> Result<MessageResponse> {
        let url = self.endpoint("rate")?;
        let headers = self.auth_headers().await?;
        self.execute(self.client.post(url).headers(headers).json(req))
            .await
    }

    /// Delete a stored session and its history.
    pub async fn delete_session(&self, session_id: &str) -> Result<MessageResponse> {
        let url = self.endpoint(&format!("session/{}", session_id))?;
        let headers = self.auth_headers().await?;
        self.execute(self.client.delete(url).headers(headers)).await
    }

    /// List the model names the server can generate with.
    pub async fn models(&self) -> Result<ModelListResponse> {
        let url = self.endpoint("models")?;
        let headers = self.auth_headers().await?;
        self.execute(self.client.get(url).headers(headers)).await
    }

    ////////////////////////////////////////// internals ///////////////////////////////////////////

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(Error::from)
    }

    /// Create and return default headers for API requests.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Default headers plus the bearer token.
    ///
    /// Fails with an authentication error when no token is held. The token
    /// is attached as-is; whether it is still accepted is the server's call.
    async fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self.token.read().await;
        let token = token
            .as_deref()
            .ok_or_else(|| Error::authentication("no bearer token held; log in first"))?;
        let mut headers = Self::default_headers();
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            Error::authentication("held token contains characters not valid in a header")
        })?;
        headers.insert(header::AUTHORIZATION, value);
        Ok(headers)
    }

    /// Send a request, triage transport failures, and reject non-success
    /// statuses through [`Chatbot::process_error_response`].
    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            CLIENT_TRANSPORT_ERRORS.click();
            if e.is_timeout() {
                Error::timeout(
                    format!("Request timed out: {}", e),
                    Some(self.timeout.as_secs_f64()),
                )
            } else if e.is_connect() {
                Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
            } else {
                Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
            }
        })?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.dispatch(builder).await?;
        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Process API response errors and convert to our Error type.
    ///
    /// The backend reports errors as `{"detail": ...}`. A string detail is
    /// used verbatim; any other shape (FastAPI's 422 validation arrays) is
    /// flattened to its JSON text.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = match serde_json::from_str::<serde_json::Value>(&error_body) {
            Ok(serde_json::Value::Object(body)) => body.get("detail").map(|detail| match detail {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            _ => None,
        };
        let message = detail.unwrap_or(error_body);

        match status_code {
            400 => Error::bad_request(message),
            401 => Error::authentication(message),
            403 => Error::permission(message),
            404 => Error::not_found(message),
            408 => Error::timeout(message, None),
            422 => Error::validation(message, None),
            429 => Error::rate_limit(message, retry_after),
            500 => Error::internal_server(message),
            502..=504 => Error::service_unavailable(message, retry_after),
            _ => Error::api(status_code, message),
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
