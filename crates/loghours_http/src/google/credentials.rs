use base64::Engine;
use base64::prelude::{BASE64_STANDARD, BASE64_URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use loghours_error::{ErrorKind, LogError, Result, ResultExt};
use reqwest::{Method, Request};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::client::{HttpClient, HttpResponse, ensure_success, read_json_response, set_form_body};

/// Read and write access to spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
pub struct ServiceAccount {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct JwtHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    exp: u64,
    iat: u64,
}

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
}

impl ServiceAccount {
    pub fn try_from_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("Failed to deserialize json service account key")
    }

    /// Decode a base64 encoded json service account key.
    pub fn try_from_base64(input: &str) -> Result<Self> {
        let decoded = BASE64_STANDARD
            .decode(input.trim())
            .context("Service account key is not valid base64")?;
        let json = String::from_utf8(decoded).context("Service account key is not utf-8")?;
        Self::try_from_str(&json)
    }

    /// Header and claims segments of the JWT, base64 encoded and joined.
    fn signing_input(&self, scope: &str, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp() as u64;
        let exp = (now + Duration::hours(1)).timestamp() as u64;

        let claims = JwtClaims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: self.token_uri.clone(),
            iat,
            exp,
        };
        let header = JwtHeader {
            alg: "RS256".to_string(),
            typ: "JWT".to_string(),
        };

        let header_b64 = BASE64_URL_SAFE_NO_PAD
            .encode(serde_json::to_string(&header).context("Failed to encode jwt header")?);
        let claims_b64 = BASE64_URL_SAFE_NO_PAD
            .encode(serde_json::to_string(&claims).context("Failed to encode jwt claims")?);

        Ok(format!("{header_b64}.{claims_b64}"))
    }

    fn key_pair(&self) -> Result<RsaKeyPair> {
        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let key = rustls_pemfile::read_one(&mut reader).context("invalid PEM private key")?;
        match key {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => {
                RsaKeyPair::from_pkcs8(der.secret_pkcs8_der())
                    .map_err(|_| LogError::new("Failed to create rsa key pair from pkcs8 key"))
            }
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => {
                RsaKeyPair::from_der(der.secret_pkcs1_der())
                    .map_err(|_| LogError::new("Failed to create rsa key pair from pkcs1 key"))
            }
            _ => Err(LogError::new("Missing key")),
        }
    }

    /// Build a signed JWT for the given scope.
    pub fn signed_jwt(&self, scope: &str, now: DateTime<Utc>) -> Result<String> {
        let signing_input = self.signing_input(scope, now)?;
        let key_pair = self.key_pair()?;

        // Sign with PKCS#1 v1.5 SHA-256 (RS256)
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| LogError::new("Failed to sign payload"))?;

        let sig_b64 = BASE64_URL_SAFE_NO_PAD.encode(&signature);
        Ok(format!("{signing_input}.{sig_b64}"))
    }

    /// Fetch an access token using this service account.
    pub async fn fetch_access_token<C>(&self, client: &C, scope: &str) -> Result<AccessToken>
    where
        C: HttpClient,
    {
        let jwt = self
            .signed_jwt(scope, Utc::now())
            .map_err(|e| e.with_kind(ErrorKind::Provider))?;

        // Exchange the JWT for an access token
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", &jwt),
        ];
        let url = Url::parse(&self.token_uri).context("Failed to parse token uri as url")?;
        let mut request = Request::new(Method::POST, url);
        set_form_body(&mut request, &params)?;

        debug!(client_email = %self.client_email, "fetching access token");
        let resp = ensure_success(client.do_request(request).await?).await?;
        let tok_resp: AccessToken = read_json_response(resp.into_bytes_stream()).await?;

        Ok(tok_resp)
    }
}
