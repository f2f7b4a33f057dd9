//! OAuth credentials for the spreadsheet source.
//!
//! The persisted token moves through three states:
//!
//! | state     | transition              | side effect            |
//! |-----------|-------------------------|------------------------|
//! | any       | `load`                  | reads the token file   |
//! | `Expired` | `refresh`               | writes the token file  |
//! | `NoToken` | `interactive_authorize` | writes the token file  |
//!
//! An expired token without a refresh token goes through
//! `interactive_authorize` as well.

use chrono::{DateTime, Duration, Utc};
use frosty_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only access to spreadsheet values.
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_REDIRECT_URI: &str = "http://localhost";

/// Tokens expiring within this window are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// OAuth client registration, from a Google "installed" or "web" client secret file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecret {
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

/// Read the client secret file.
pub fn load_client_secret(path: &Path) -> AppResult<ClientSecret> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Auth(format!(
            "Failed to read client secret file {:?}: {}",
            path, e
        ))
    })?;

    let file: ClientSecretFile = serde_json::from_str(&contents).map_err(|e| {
        AppError::Auth(format!(
            "Failed to parse client secret file {:?}: {}",
            path, e
        ))
    })?;

    file.installed.or(file.web).ok_or_else(|| {
        AppError::Auth(format!(
            "Client secret file {:?} has neither an 'installed' nor a 'web' section",
            path
        ))
    })
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Token as persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl StoredToken {
    /// Build a stored token from an endpoint response.
    ///
    /// Refresh responses usually omit the refresh token; `previous_refresh`
    /// is kept in that case.
    pub fn from_response(
        response: TokenResponse,
        previous_refresh: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let scopes = response
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| vec![SHEETS_READONLY_SCOPE.to_string()]);

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expiry: now + Duration::seconds(response.expires_in),
            scopes,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry - Duration::seconds(EXPIRY_SKEW_SECS) > now
    }
}

/// Where the persisted credential currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    NoToken,
    Valid(StoredToken),
    Expired(StoredToken),
}

impl TokenState {
    pub fn classify(token: StoredToken, now: DateTime<Utc>) -> Self {
        if token.is_valid_at(now) {
            TokenState::Valid(token)
        } else {
            TokenState::Expired(token)
        }
    }

    /// `load` transition: read the token file.
    ///
    /// A missing or unparseable file is `NoToken`.
    pub fn load(path: &Path, now: DateTime<Utc>) -> AppResult<Self> {
        if !path.exists() {
            return Ok(TokenState::NoToken);
        }

        let contents = std::fs::read_to_string(path)?;
        match serde_json::from_str::<StoredToken>(&contents) {
            Ok(token) => Ok(Self::classify(token, now)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable token file {:?}: {}", path, e);
                Ok(TokenState::NoToken)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenState::NoToken => "no-token",
            TokenState::Valid(_) => "valid",
            TokenState::Expired(_) => "expired",
        }
    }
}

/// Write the token file, creating its directory.
pub fn persist_token(path: &Path, token: &StoredToken) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(token)?;
    std::fs::write(path, json)?;

    tracing::debug!("Persisted token to {:?}", path);
    Ok(())
}

/// Consent URL for the installed-app flow.
pub fn authorize_url(secret: &ClientSecret, state: &str) -> AppResult<String> {
    let url = reqwest::Url::parse_with_params(
        &secret.auth_uri,
        &[
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", secret.redirect_uri()),
            ("response_type", "code"),
            ("scope", SHEETS_READONLY_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .map_err(|e| AppError::Auth(format!("Invalid auth_uri '{}': {}", secret.auth_uri, e)))?;

    Ok(url.into())
}

/// Authorization code pasted back by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub code: String,
    /// `state` of the redirect URL; `None` for a bare code.
    pub state: Option<String>,
}

/// Accept either a bare code or the full redirect URL the browser landed on.
pub fn parse_authorization_response(input: &str) -> Option<AuthorizationResponse> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        let url = reqwest::Url::parse(input).ok()?;
        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                _ => {}
            }
        }
        return code.map(|code| AuthorizationResponse {
            code,
            state: Some(state.unwrap_or_default()),
        });
    }

    Some(AuthorizationResponse {
        code: input.to_string(),
        state: None,
    })
}

/// Code from the user's input, rejecting a redirect URL whose `state`
/// differs from the one sent in the consent URL.
pub fn extract_code(input: &str, expected_state: &str) -> AppResult<String> {
    let response = parse_authorization_response(input)
        .ok_or_else(|| AppError::Auth("No authorization code entered".to_string()))?;

    match response.state.as_deref() {
        Some(state) if state != expected_state => Err(AppError::Auth(
            "Authorization state mismatch; restart the authorization".to_string(),
        )),
        _ => Ok(response.code),
    }
}

/// Token endpoint exchanges.
#[async_trait::async_trait]
pub trait OAuthFlow: Send + Sync {
    async fn refresh(&self, secret: &ClientSecret, refresh_token: &str)
        -> AppResult<TokenResponse>;

    async fn exchange_code(&self, secret: &ClientSecret, code: &str) -> AppResult<TokenResponse>;
}

/// Google OAuth token endpoint client.
#[derive(Debug, Clone, Default)]
pub struct GoogleOAuth {
    client: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new() -> Self {
        Self::default()
    }

    async fn post_form(&self, token_uri: &str, params: &[(&str, &str)]) -> AppResult<TokenResponse> {
        let response = self
            .client
            .post(token_uri)
            .header("Accept", "application/json")
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to reach token endpoint: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Auth(format!(
                "Token endpoint error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))
    }
}

#[async_trait::async_trait]
impl OAuthFlow for GoogleOAuth {
    async fn refresh(
        &self,
        secret: &ClientSecret,
        refresh_token: &str,
    ) -> AppResult<TokenResponse> {
        self.post_form(
            &secret.token_uri,
            &[
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ],
        )
        .await
    }

    async fn exchange_code(&self, secret: &ClientSecret, code: &str) -> AppResult<TokenResponse> {
        self.post_form(
            &secret.token_uri,
            &[
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", secret.redirect_uri()),
                ("grant_type", "authorization_code"),
            ],
        )
        .await
    }
}

/// Obtains the user's answer to the consent URL: a bare code or the
/// redirected URL.
///
/// Implementations may block; they are called on the blocking pool.
pub trait AuthorizationCodePrompt: Send + Sync {
    fn request_code(&self, authorize_url: &str) -> AppResult<String>;
}

/// Prints the consent URL to stderr and reads the answer from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl AuthorizationCodePrompt for StdinPrompt {
    fn request_code(&self, authorize_url: &str) -> AppResult<String> {
        let mut stderr = std::io::stderr();
        writeln!(stderr, "Open this URL in your browser to authorize spreadsheet access:")?;
        writeln!(stderr, "\n  {}\n", authorize_url)?;
        write!(stderr, "Paste the authorization code (or the redirected URL): ")?;
        stderr.flush()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;

        Ok(line)
    }
}

/// Drives the token state machine for one token file.
pub struct CredentialManager {
    token_path: PathBuf,
    client_secret_path: PathBuf,
    flow: Arc<dyn OAuthFlow>,
    prompt: Arc<dyn AuthorizationCodePrompt>,
}

impl CredentialManager {
    /// Manager using Google's token endpoint and a terminal prompt.
    pub fn new(token_path: impl Into<PathBuf>, client_secret_path: impl Into<PathBuf>) -> Self {
        Self::with_flow(
            token_path,
            client_secret_path,
            Arc::new(GoogleOAuth::new()),
            Arc::new(StdinPrompt),
        )
    }

    pub fn with_flow(
        token_path: impl Into<PathBuf>,
        client_secret_path: impl Into<PathBuf>,
        flow: Arc<dyn OAuthFlow>,
        prompt: Arc<dyn AuthorizationCodePrompt>,
    ) -> Self {
        Self {
            token_path: token_path.into(),
            client_secret_path: client_secret_path.into(),
            flow,
            prompt,
        }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Current state of the token file.
    pub fn state(&self) -> AppResult<TokenState> {
        TokenState::load(&self.token_path, Utc::now())
    }

    /// Return a valid token, refreshing or authorizing as the state requires.
    pub async fn ensure_valid(&self) -> AppResult<StoredToken> {
        let state = self.state()?;
        tracing::debug!("Token state: {}", state.name());

        match state {
            TokenState::Valid(token) => Ok(token),
            TokenState::Expired(StoredToken {
                refresh_token: Some(refresh_token),
                ..
            }) => self.refresh(&refresh_token).await,
            TokenState::Expired(_) | TokenState::NoToken => self.interactive_authorize().await,
        }
    }

    pub async fn access_token(&self) -> AppResult<String> {
        Ok(self.ensure_valid().await?.access_token)
    }

    /// `refresh` transition. Writes the token file.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<StoredToken> {
        tracing::info!("Refreshing spreadsheet access token");

        let secret = load_client_secret(&self.client_secret_path)?;
        let response = self.flow.refresh(&secret, refresh_token).await?;
        let token = StoredToken::from_response(response, Some(refresh_token.to_string()), Utc::now());

        persist_token(&self.token_path, &token)?;
        Ok(token)
    }

    /// `interactive_authorize` transition. Writes the token file.
    pub async fn interactive_authorize(&self) -> AppResult<StoredToken> {
        tracing::info!("Starting interactive authorization");

        let secret = load_client_secret(&self.client_secret_path)?;
        let state = uuid::Uuid::new_v4().to_string();
        let url = authorize_url(&secret, &state)?;

        let prompt = Arc::clone(&self.prompt);
        let answer = tokio::task::spawn_blocking(move || prompt.request_code(&url))
            .await
            .map_err(|e| AppError::Auth(format!("Authorization prompt failed: {}", e)))??;

        let code = extract_code(&answer, &state)?;
        let response = self.flow.exchange_code(&secret, &code).await?;
        let token = StoredToken::from_response(response, None, Utc::now());

        persist_token(&self.token_path, &token)?;
        tracing::info!("Authorization complete; token saved to {:?}", self.token_path);
        Ok(token)
    }
}
