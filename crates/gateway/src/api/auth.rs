//! Bearer-token authentication for protected routes.
//!
//! Two modes, chosen by `auth.mode`:
//! - `supabase`: the token is sent to `{url}/auth/v1/user` with the service
//!   key as `apikey`; the provider answers with the user it belongs to.
//! - `static`: one shared token from the environment, compared as SHA-256
//!   digests in constant time, authenticating a fixed user id.
//!
//! Authenticated users are upserted into the store and attached to the
//! request as an [`AuthUser`] extension.

use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ob_domain::config::{AuthConfig, AuthMode};
use ob_domain::error::{Error, Result};
use ob_domain::trace::TraceEvent;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::api::error::api_error;
use crate::state::AppState;

/// The caller of a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

pub enum Authenticator {
    Supabase {
        http: reqwest::Client,
        url: String,
        service_key: String,
    },
    Static {
        /// SHA-256 digest of the shared token.
        token_hash: Vec<u8>,
        user_id: String,
    },
}

#[derive(Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl Authenticator {
    pub fn from_config(cfg: &AuthConfig) -> Result<Self> {
        match cfg.mode {
            AuthMode::Static => {
                let token = cfg.resolve_static_token().ok_or_else(|| {
                    Error::Config(format!(
                        "static auth requires env var {}",
                        cfg.static_token_env
                    ))
                })?;
                Ok(Self::static_token(&token, &cfg.static_user_id))
            }
            AuthMode::Supabase => {
                let url = cfg
                    .url
                    .as_deref()
                    .filter(|u| !u.trim().is_empty())
                    .ok_or_else(|| Error::Config("auth.url is required".into()))?;
                let service_key = cfg.resolve_service_key().ok_or_else(|| {
                    Error::Config(format!(
                        "auth provider requires env var {}",
                        cfg.service_key_env
                    ))
                })?;
                let http = reqwest::Client::builder()
                    .timeout(Duration::from_millis(cfg.timeout_ms))
                    .build()
                    .map_err(|e| Error::Http(e.to_string()))?;
                Ok(Self::Supabase {
                    http,
                    url: url.trim_end_matches('/').to_owned(),
                    service_key,
                })
            }
        }
    }

    pub fn static_token(token: &str, user_id: &str) -> Self {
        Self::Static {
            token_hash: Sha256::digest(token.as_bytes()).to_vec(),
            user_id: user_id.to_owned(),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::Supabase { .. } => "supabase",
            Self::Static { .. } => "static",
        }
    }

    /// Resolve the user a bearer token belongs to. `Error::Auth` for tokens
    /// the provider rejects; transport failures surface as `Error::Http` or
    /// `Error::Timeout`.
    pub async fn verify(&self, token: &str) -> Result<AuthUser> {
        match self {
            Self::Static {
                token_hash,
                user_id,
            } => {
                // Fixed-length digests keep the comparison independent of
                // the token length.
                let provided = Sha256::digest(token.as_bytes());
                if bool::from(provided.ct_eq(token_hash.as_slice())) {
                    Ok(AuthUser {
                        id: user_id.clone(),
                        email: None,
                    })
                } else {
                    Err(Error::Auth("token mismatch".into()))
                }
            }
            Self::Supabase {
                http,
                url,
                service_key,
            } => {
                let resp = http
                    .get(format!("{url}/auth/v1/user"))
                    .header("apikey", service_key)
                    .bearer_auth(token)
                    .send()
                    .await
                    .map_err(|e| {
                        if e.is_timeout() {
                            Error::Timeout(e.to_string())
                        } else {
                            Error::Http(e.to_string())
                        }
                    })?;
                let status = resp.status();
                if status.is_client_error() {
                    return Err(Error::Auth(format!("provider returned {status}")));
                }
                if !status.is_success() {
                    return Err(Error::Http(format!("auth provider returned {status}")));
                }
                let user: ProviderUser = resp
                    .json()
                    .await
                    .map_err(|e| Error::Auth(format!("unreadable user payload: {e}")))?;
                Ok(AuthUser {
                    id: user.id,
                    email: user.email,
                })
            }
        }
    }
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn reject(reason: &str) -> Response {
    TraceEvent::AuthRejected {
        reason: reason.to_owned(),
    }
    .emit();
    api_error(StatusCode::UNAUTHORIZED, "invalid or missing bearer token")
}

/// Axum middleware that authenticates the caller of protected routes.
/// Attach via `axum::middleware::from_fn_with_state`.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&req) else {
        return reject("missing bearer token");
    };

    let user = match state.auth.verify(token).await {
        Ok(user) => user,
        Err(Error::Auth(reason)) => return reject(&reason),
        Err(e) => {
            tracing::error!(error = %e, "auth provider unavailable");
            return api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "authentication temporarily unavailable",
            );
        }
    };

    if let Err(e) = state.store.upsert_user(&user.id, user.email.as_deref()) {
        tracing::error!(error = %e, user_id = %user.id, "failed to record user");
        return api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            .into_response();
    }

    req.extensions_mut().insert(user);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_matches_only_itself() {
        let auth = Authenticator::static_token("s3cret", "local-user");
        assert_eq!(auth.verify("s3cret").await.unwrap().id, "local-user");
        assert!(matches!(auth.verify("s3cre").await, Err(Error::Auth(_))));
        assert!(matches!(auth.verify("").await, Err(Error::Auth(_))));
    }

    #[test]
    fn supabase_requires_url_and_key() {
        let cfg = AuthConfig {
            url: None,
            ..AuthConfig::default()
        };
        assert!(matches!(
            Authenticator::from_config(&cfg),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn bearer_prefix_is_required() {
        let req = Request::builder()
            .header("authorization", "Basic abc")
            .body(Body::empty())
            .unwrap();
        assert!(bearer_token(&req).is_none());

        let req = Request::builder()
            .header("authorization", "Bearer abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req), Some("abc"));
    }
}
