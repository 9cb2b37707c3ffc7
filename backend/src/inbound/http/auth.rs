//! Bearer-token authentication for task handlers.
//!
//! [`BearerOwner`] verifies the `Authorization: Bearer …` header through the
//! [`AccessTokenVerifier`](crate::domain::ports::AccessTokenVerifier) port.
//! Handlers then call [`BearerOwner::require_path_owner`] so a caller can only
//! address their own task collection.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::TokenError;
use crate::domain::{DomainError, OwnerId};

use super::ApiResult;
use super::state::HttpState;

const BEARER_SCHEME: &str = "bearer";

/// Owner identity proven by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerOwner(OwnerId);

impl BearerOwner {
    #[must_use]
    pub const fn owner_id(&self) -> &OwnerId {
        &self.0
    }

    /// Confirm the `{owner_id}` path segment names the authenticated owner.
    ///
    /// # Errors
    ///
    /// Returns `403 forbidden` when the path addresses another owner's tasks.
    pub fn require_path_owner(&self, path_owner: &str) -> ApiResult<OwnerId> {
        if self.0.as_str() == path_owner {
            Ok(self.0.clone())
        } else {
            debug!(
                owner_id = %self.0,
                path_owner,
                "bearer owner does not match path owner"
            );
            Err(DomainError::forbidden(
                "access token does not grant access to this owner's tasks",
            ))
        }
    }

    fn authenticate(req: &HttpRequest) -> ApiResult<Self> {
        let state = req
            .app_data::<web::Data<HttpState>>()
            .ok_or_else(|| DomainError::internal("HTTP state is not configured"))?;
        let token = bearer_token(req)?;
        state
            .tokens
            .verify(token)
            .map(Self)
            .map_err(|err| token_rejected(&err))
    }
}

fn bearer_token(req: &HttpRequest) -> ApiResult<&str> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| DomainError::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| DomainError::unauthorized("authorization header is not valid text"))?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| DomainError::unauthorized("authorization header must use the Bearer scheme"))?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(DomainError::unauthorized(
            "authorization header must use the Bearer scheme",
        ));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(DomainError::unauthorized("missing bearer token"));
    }
    Ok(token)
}

fn token_rejected(err: &TokenError) -> DomainError {
    debug!(error = %err, "bearer token rejected");
    match err {
        TokenError::Expired => DomainError::unauthorized("access token has expired"),
        _ => DomainError::unauthorized("invalid access token"),
    }
}

impl FromRequest for BearerOwner {
    type Error = DomainError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockChatCommand, MockChatQuery, MockTaskCommand, MockTaskQuery};
    use crate::test_support::{bearer_for, test_tokens};
    use actix_web::http::StatusCode;
    use actix_web::http::header::WWW_AUTHENTICATE;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    fn state() -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(MockTaskCommand::new()),
            Arc::new(MockTaskQuery::new()),
            Arc::new(MockChatCommand::new()),
            Arc::new(MockChatQuery::new()),
            test_tokens(),
        ))
    }

    async fn whoami(owner: BearerOwner) -> HttpResponse {
        HttpResponse::Ok().body(owner.owner_id().to_string())
    }

    async fn call(header: Option<String>) -> (StatusCode, bool, String) {
        let app = actix_test::init_service(
            App::new()
                .app_data(state())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let mut request = actix_test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let challenged = response.headers().contains_key(WWW_AUTHENTICATE);
        let body = actix_test::read_body(response).await;
        (status, challenged, String::from_utf8_lossy(&body).into_owned())
    }

    #[rstest]
    #[actix_web::test]
    async fn valid_token_yields_owner() {
        let header = bearer_for(&test_tokens(), "alice");
        let (status, challenged, body) = call(Some(header)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!challenged);
        assert_eq!(body, "alice");
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Bearer".to_owned()))]
    #[case(Some("Bearer    ".to_owned()))]
    #[case(Some("Basic YWxpY2U6cGFzcw==".to_owned()))]
    #[case(Some("Bearer not-a-token".to_owned()))]
    #[actix_web::test]
    async fn missing_or_invalid_credentials_are_challenged(#[case] header: Option<String>) {
        let (status, challenged, _) = call(header).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(challenged);
    }

    #[rstest]
    #[actix_web::test]
    async fn scheme_is_case_insensitive() {
        let header = bearer_for(&test_tokens(), "alice").replacen("Bearer", "bearer", 1);
        let (status, _, _) = call(Some(header)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    fn path_owner_must_match() {
        let owner = BearerOwner(OwnerId::new("alice").expect("valid owner"));
        assert_eq!(
            owner.require_path_owner("alice").map(|id| id.to_string()),
            Ok("alice".to_owned())
        );
        let err = owner.require_path_owner("bob").expect_err("foreign owner");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn expired_tokens_get_a_specific_message() {
        let err = token_rejected(&TokenError::expired());
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "access token has expired");
        let err = token_rejected(&TokenError::invalid_signature());
        assert_eq!(err.message(), "invalid access token");
    }
}
