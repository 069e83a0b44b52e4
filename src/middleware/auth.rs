use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::resume::Viewer;
use crate::utils::time::now;
use crate::AppState;

pub const ROLE_CANDIDATE: &str = "candidate";
pub const ROLE_RECRUITER: &str = "recruiter";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

impl Claims {
    fn has_role(&self, role: &str) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    pub fn is_recruiter(&self) -> bool {
        self.has_role(ROLE_RECRUITER) || self.is_admin()
    }

    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| Error::Unauthorized("Token subject is not a user id".to_string()))
    }

    /// `stored_staff` is the `is_staff` flag of the user record; an admin
    /// token is staff regardless.
    pub fn viewer(&self, stored_staff: bool) -> Result<Viewer> {
        Ok(Viewer {
            user_id: self.user_id()?,
            is_staff: stored_staff || self.is_admin(),
        })
    }
}

/// Viewer for an authenticated request, with staff status read from the
/// user record. Unknown users are treated as non-staff.
pub async fn resolve_viewer(state: &AppState, claims: &Claims) -> Result<Viewer> {
    let user_id = claims.user_id()?;
    let stored: Option<bool> = sqlx::query_scalar("SELECT is_staff FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?;
    claims.viewer(stored.unwrap_or(false))
}

pub fn issue_token(user_id: Uuid, role: &str, secret: &str, ttl: Duration) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now() + ttl).timestamp().max(0) as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

/// `Ok(None)` when no Authorization header is present at all.
fn read_claims(req: &Request, secret: &str) -> std::result::Result<Option<Claims>, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(reject(StatusCode::UNAUTHORIZED, "unsupported_scheme"));
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(Some(data.claims)),
        Err(e) => {
            tracing::debug!("Rejected bearer token: {}", e);
            Err(reject(StatusCode::UNAUTHORIZED, "invalid_token"))
        }
    }
}

pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match read_claims(&req, &state.jwt_secret) {
        Ok(Some(claims)) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Ok(None) => reject(StatusCode::UNAUTHORIZED, "missing_authorization"),
        Err(response) => response,
    }
}

/// Attaches claims when a valid token is sent, lets anonymous requests
/// through, and still rejects malformed or expired tokens.
pub async fn optional_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match read_claims(&req, &state.jwt_secret) {
        Ok(Some(claims)) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Ok(None) => next.run(req).await,
        Err(response) => response,
    }
}

/// Claims of an authenticated caller. Rejects with 401 when the request
/// carried no valid token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| Error::Unauthorized("missing_authorization".to_string()))
    }
}

/// A recruiter or administrator; other authenticated callers get 403.
#[derive(Debug, Clone)]
pub struct RecruiterUser(pub Claims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RecruiterUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let CurrentUser(claims) = CurrentUser::from_request_parts(parts, state).await?;
        if !claims.is_recruiter() {
            return Err(Error::Forbidden("Recruiter access required".to_string()));
        }
        Ok(RecruiterUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<&str>) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            exp: 0,
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn roles_grant_expected_access() {
        assert!(!claims(Some("candidate")).is_recruiter());
        assert!(claims(Some("recruiter")).is_recruiter());
        assert!(claims(Some("ADMIN")).is_recruiter());
        assert!(claims(Some("admin")).viewer(false).unwrap().is_staff);
        assert!(!claims(None).viewer(false).unwrap().is_staff);
    }

    #[test]
    fn stored_staff_flag_grants_staff_without_admin_role() {
        assert!(claims(Some(ROLE_RECRUITER)).viewer(true).unwrap().is_staff);
        assert!(!claims(Some(ROLE_RECRUITER)).viewer(false).unwrap().is_staff);
    }

    #[test]
    fn subject_must_be_a_uuid() {
        let mut c = claims(None);
        c.sub = "42".into();
        assert!(matches!(c.user_id(), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn issued_tokens_decode_with_the_same_secret() {
        let id = Uuid::new_v4();
        let token = issue_token(id, ROLE_RECRUITER, "secret", Duration::hours(1)).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.user_id().unwrap(), id);
        assert!(data.claims.is_recruiter());

        let wrong = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(wrong.is_err());
    }

    fn parts_with(claims: Option<Claims>) -> Parts {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        if let Some(claims) = claims {
            parts.extensions.insert(claims);
        }
        parts
    }

    #[test]
    fn extractors_map_missing_and_wrong_roles() {
        let mut anonymous = parts_with(None);
        let missing = tokio_test::block_on(CurrentUser::from_request_parts(&mut anonymous, &()));
        assert!(matches!(missing, Err(Error::Unauthorized(_))));

        let mut candidate = parts_with(Some(claims(Some(ROLE_CANDIDATE))));
        let denied = tokio_test::block_on(RecruiterUser::from_request_parts(&mut candidate, &()));
        assert!(matches!(denied, Err(Error::Forbidden(_))));

        let mut recruiter = parts_with(Some(claims(Some(ROLE_RECRUITER))));
        let allowed = tokio_test::block_on(RecruiterUser::from_request_parts(&mut recruiter, &()));
        assert!(allowed.is_ok());
    }
}
