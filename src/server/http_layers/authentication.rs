//! Bearer authentication middleware
//!
//! Requests either hit a whitelisted endpoint, carry a whitelisted protocol
//! call without credentials, or present a bearer token that the identity
//! service accepts. Authenticated requests get a `SecurityContext` extension.

use super::super::state::ServerState;
use crate::auth::{bypass, BearerInfoError, BearerToken, BypassError, SecurityContext};
use axum::extract::{OptionalFromRequestParts, State};
use axum::{
    body::Body,
    http::{header, request::Parts, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

struct WhitelistedEndpoint {
    path: &'static str,
    prefix: bool,
    methods: &'static [&'static str],
}

const WHITELISTED_ENDPOINTS: &[WhitelistedEndpoint] = &[
    WhitelistedEndpoint {
        path: "/api/health",
        prefix: false,
        methods: &["GET", "OPTIONS"],
    },
    WhitelistedEndpoint {
        path: "/.well-known",
        prefix: true,
        methods: &["GET", "OPTIONS"],
    },
];

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    Unauthorized,
    PayloadTooLarge,
    InternalError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            AuthRejection::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE.into_response(),
            AuthRejection::InternalError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Handlers take `Option<SecurityContext>`; `None` means the request came
/// through the unauthenticated bypass.
impl<S> OptionalFromRequestParts<S> for SecurityContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<SecurityContext>().cloned())
    }
}

/// Method, path and query of the request, carried for rejection logs.
struct RequestTarget {
    method: String,
    path: String,
    query: String,
}

impl RequestTarget {
    fn of(request: &Request<Body>) -> Self {
        Self {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().unwrap_or_default().to_string(),
        }
    }
}

fn is_whitelisted(path: &str, method: &str) -> bool {
    WHITELISTED_ENDPOINTS.iter().any(|endpoint| {
        let path_matches = if endpoint.prefix {
            path.starts_with(endpoint.path)
        } else {
            path == endpoint.path
        };
        path_matches && endpoint.methods.contains(&method)
    })
}

fn extract_bearer_token(value: &HeaderValue) -> Option<&str> {
    value
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

fn is_length_limit(err: &axum::Error) -> bool {
    std::error::Error::source(err)
        .map(|source| source.is::<http_body_util::LengthLimitError>())
        .unwrap_or(false)
}

fn declared_content_length(request: &Request<Body>) -> Option<usize> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

pub async fn authenticate(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match authorize(&state, request).await {
        Ok(request) => next.run(request).await,
        Err(rejection) => rejection.into_response(),
    }
}

async fn authorize(
    state: &ServerState,
    mut request: Request<Body>,
) -> Result<Request<Body>, AuthRejection> {
    let target = RequestTarget::of(&request);

    if is_whitelisted(&target.path, &target.method) {
        return Ok(request);
    }

    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .filter(|value| !value.is_empty())
        .cloned();

    let Some(authorization) = authorization else {
        return authorize_unauthenticated(state, request, &target).await;
    };

    let Some(token) = extract_bearer_token(&authorization) else {
        warn!(
            method = %target.method,
            path = %target.path,
            query = %target.query,
            "Malformed authorization header"
        );
        return Err(AuthRejection::Unauthorized);
    };

    let info = state
        .authenticator
        .bearer_info(token)
        .await
        .map_err(|err| match err {
            BearerInfoError::Unauthorized => {
                warn!(
                    method = %target.method,
                    path = %target.path,
                    query = %target.query,
                    "Bearer token rejected by identity service"
                );
                AuthRejection::Unauthorized
            }
            err => {
                error!(
                    method = %target.method,
                    path = %target.path,
                    query = %target.query,
                    "Failed to get bearer info: {}",
                    err
                );
                AuthRejection::InternalError
            }
        })?;

    let security = SecurityContext::from_bearer_info(
        info,
        BearerToken::new(token),
        &state.config.deployment_region,
    );
    debug!(
        user_id = security.user_id,
        installation_id = security.installation_id,
        cross_region = security.cross_region,
        "Authenticated {} {}",
        target.method,
        target.path
    );
    request.extensions_mut().insert(security);

    Ok(request)
}

/// Buffer the body, check the bypass policy and hand the same bytes downstream.
async fn authorize_unauthenticated(
    state: &ServerState,
    request: Request<Body>,
    target: &RequestTarget,
) -> Result<Request<Body>, AuthRejection> {
    let limit = state.config.max_unauthenticated_body_bytes;

    if declared_content_length(&request).is_some_and(|length| length > limit) {
        warn!(
            method = %target.method,
            path = %target.path,
            query = %target.query,
            "Unauthenticated body exceeds {} bytes",
            limit
        );
        return Err(AuthRejection::PayloadTooLarge);
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(err) if is_length_limit(&err) => {
            warn!(
                method = %target.method,
                path = %target.path,
                query = %target.query,
                "Unauthenticated body exceeds {} bytes",
                limit
            );
            return Err(AuthRejection::PayloadTooLarge);
        }
        Err(err) => {
            error!(
                method = %target.method,
                path = %target.path,
                query = %target.query,
                "Failed to read request body: {}",
                err
            );
            return Err(AuthRejection::InternalError);
        }
    };

    match bypass(&bytes) {
        Ok(()) => Ok(Request::from_parts(parts, Body::from(bytes))),
        Err(BypassError::Parse(err)) => {
            warn!(
                method = %target.method,
                path = %target.path,
                query = %target.query,
                "Unauthenticated request with unparsable body: {}",
                err
            );
            Err(AuthRejection::Unauthorized)
        }
        Err(err @ BypassError::NotAuthenticated(_)) => {
            warn!(
                method = %target.method,
                path = %target.path,
                query = %target.query,
                "{}",
                err
            );
            Err(AuthRejection::Unauthorized)
        }
    }
}
