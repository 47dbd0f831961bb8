//! Authentication middleware for stylemate-server
//!
//! Verifies the bearer token before any handler runs and makes the caller's
//! [`Identity`] available as a request extension.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use stylemate_common::auth::Identity;
use tracing::debug;

use crate::{ApiError, AppState};

/// Authentication middleware
///
/// Returns 401 Unauthorized if the token is missing or fails verification.
/// Applied to protected routes only.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity: Identity = state.verifier.verify_header(header).map_err(|e| {
        debug!("Rejected request to {}: {}", request.uri().path(), e);
        ApiError::Unauthorized(e.to_string())
    })?;

    debug!(user_id = %identity.user_id, "Authenticated request");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
