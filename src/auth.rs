//! Session and authentication lifecycle.
//!
//! [`AuthController`] drives the flow the web client runs on page load and on
//! its login/register forms: resume a stored token after re-verifying it,
//! exchange credentials for a fresh token, create accounts, and log out. All
//! client-side validation failures carry messages already localized for
//! display and never reach the network.

use crate::client::Chatbot;
use crate::error::{Error, Result};
use crate::observability::{
    AUTH_LOGIN_FAILURES, AUTH_LOGINS, AUTH_LOGOUTS, AUTH_REGISTRATIONS, AUTH_RESUME_REJECTIONS,
    AUTH_RESUMES,
};
use crate::store::{ACCESS_TOKEN_KEY, Credentials, StateStore, USER_INFO_KEY};
use crate::types::{LoginRequest, MessageResponse, RegisterRequest};

//////////////////////////////////////////// AuthState /////////////////////////////////////////////

/// Where the client stands in the authentication lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AuthState {
    /// No accepted credentials; only public endpoints are usable.
    #[default]
    Unauthenticated,
    /// Stored credentials are being re-verified against the server.
    Verifying,
    /// The held token was accepted; protected endpoints are usable.
    Authenticated,
}

/////////////////////////////////////////// RegisterForm ///////////////////////////////////////////

/// A registration form as the user filled it in, confirmation field
/// included. Only [`AuthController::register`] consumes it; the confirmation
/// never goes over the wire.
#[derive(Clone, Debug, Default)]
pub struct RegisterForm {
    /// Desired account name. Required.
    pub username: String,
    /// Contact email. Required.
    pub email: String,
    /// Account password. Required, minimum six characters.
    pub password: String,
    /// Must match `password`.
    pub confirm_password: String,
    /// Optional human-readable name; empty means unset.
    pub full_name: String,
}

////////////////////////////////////////// AuthController //////////////////////////////////////////

/// Drives login, registration, resume, and logout against one client and one
/// state store.
#[derive(Clone, Debug)]
pub struct AuthController {
    client: Chatbot,
    store: StateStore,
    state: AuthState,
}

impl AuthController {
    /// Creates a controller over clones of the client and store.
    pub fn new(client: Chatbot, store: StateStore) -> Self {
        Self {
            client,
            store,
            state: AuthState::Unauthenticated,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Whether the held token was accepted by the server.
    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// Resume a stored session, the startup check.
    ///
    /// With nothing stored this stays unauthenticated and issues no request.
    /// With stored credentials it installs the token and asks the server
    /// whether the token is still accepted. Any failure there, HTTP or
    /// transport, clears the stored pair and reports `Ok(None)`: an expired
    /// session is a normal outcome, not an error.
    pub async fn resume(&mut self) -> Result<Option<Credentials>> {
        let Some(creds) = self.store.credentials().await else {
            // Sweep any half-written pair.
            if self.store.get(ACCESS_TOKEN_KEY).await.is_some()
                || self.store.get(USER_INFO_KEY).await.is_some()
            {
                self.store.clear_credentials().await?;
            }
            self.state = AuthState::Unauthenticated;
            return Ok(None);
        };

        AUTH_RESUMES.click();
        self.state = AuthState::Verifying;
        self.client.set_token(&creds.token).await;

        match self.client.me().await {
            Ok(()) => {
                self.state = AuthState::Authenticated;
                Ok(Some(creds))
            }
            Err(_) => {
                AUTH_RESUME_REJECTIONS.click();
                self.store.clear_credentials().await?;
                self.client.clear_token().await;
                self.state = AuthState::Unauthenticated;
                Ok(None)
            }
        }
    }

    /// Exchange a username and password for a token.
    ///
    /// Empty fields fail locally with a localized validation error before any
    /// request. On success the token and account info are persisted as a
    /// pair, the token is installed on the client, and the state becomes
    /// authenticated. Server rejections pass through for the caller to
    /// surface.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Credentials> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::validation("Vui lòng nhập đầy đủ thông tin", None));
        }

        let req = LoginRequest::new(username, password);
        let resp = match self.client.login(&req).await {
            Ok(resp) => resp,
            Err(err) => {
                AUTH_LOGIN_FAILURES.click();
                return Err(err);
            }
        };

        let creds = self
            .store
            .set_credentials(&resp.access_token, &resp.user)
            .await?;
        self.client.set_token(resp.access_token).await;
        self.state = AuthState::Authenticated;
        AUTH_LOGINS.click();
        Ok(creds)
    }

    /// Create a new account.
    ///
    /// Validation runs in form order and the first failure wins: required
    /// fields, then password confirmation, then password length. No request
    /// is made on a validation failure, and success does not log the account
    /// in; the caller returns to the login flow.
    pub async fn register(&self, form: &RegisterForm) -> Result<MessageResponse> {
        if form.username.is_empty() || form.email.is_empty() || form.password.is_empty() {
            return Err(Error::validation(
                "Vui lòng nhập đầy đủ thông tin bắt buộc",
                None,
            ));
        }
        if form.password != form.confirm_password {
            return Err(Error::validation(
                "Mật khẩu xác nhận không khớp",
                Some("confirm_password".to_string()),
            ));
        }
        if form.password.chars().count() < 6 {
            return Err(Error::validation(
                "Mật khẩu phải có ít nhất 6 ký tự",
                Some("password".to_string()),
            ));
        }

        let mut req = RegisterRequest::new(&form.username, &form.email, &form.password);
        if !form.full_name.is_empty() {
            req = req.with_full_name(&form.full_name);
        }

        let resp = self.client.register(&req).await?;
        AUTH_REGISTRATIONS.click();
        Ok(resp)
    }

    /// Drop the session: remove the stored pair, drop the client token, and
    /// return to unauthenticated. Never contacts the server and works from
    /// any state.
    pub async fn logout(&mut self) -> Result<()> {
        self.store.clear_credentials().await?;
        self.client.clear_token().await;
        self.state = AuthState::Unauthenticated;
        AUTH_LOGOUTS.click();
        Ok(())
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
