use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::user::UserView;

/// Extracts the authenticated identity from request extensions.
///
/// Intended for routes behind `AuthMiddleware`, which verifies the bearer
/// token, re-loads the user record, and inserts the resulting [`UserView`]
/// into request extensions. Carries the full public projection (id, name,
/// email, role) so handlers can stamp creator references and serve
/// `/auth/me` without another lookup.
///
/// If no identity is present (middleware missing or misconfigured) the
/// extractor fails with `Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserView);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserView>().cloned() {
            Some(user) => ready(Ok(AuthenticatedUser(user))),
            None => {
                let err = AppError::Unauthorized(
                    "Identity not found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
