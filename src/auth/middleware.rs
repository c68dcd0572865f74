//! Access-control middleware for the `/api` scope.
//!
//! For every non-public request: extract the bearer token, verify it, re-load
//! the current user record by the token's subject id (a token for a deleted
//! account is rejected), attach the identity to request extensions, and
//! evaluate the route policy table. Handlers behind this middleware can rely
//! on the `AuthenticatedUser` extractor.

use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;

use crate::auth::{policy, token::verify_token};
use crate::config::Config;
use crate::error::AppError;
use crate::repo;

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    // Rc so the inner service can be moved into the boxed future after the
    // async identity load.
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Registration, login, and the health check carry no token.
        let path = req.path();
        if path == "/api/health"
            || path.starts_with("/api/auth/login")
            || path.starts_with("/api/auth/register")
        {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned);

            let token = match token {
                Some(token) => token,
                None => return Err(AppError::Unauthorized("Missing token".into()).into()),
            };

            let config = req
                .app_data::<web::Data<Config>>()
                .cloned()
                .ok_or_else(|| {
                    AppError::InternalServerError("Configuration not registered".into())
                })?;
            let pool = req.app_data::<web::Data<PgPool>>().cloned().ok_or_else(|| {
                AppError::InternalServerError("Database pool not registered".into())
            })?;

            let claims = verify_token(&token, &config.auth)?;

            // The token may outlive the account; the store is authoritative.
            let user = repo::users::find_view_by_id(pool.get_ref(), claims.sub)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;

            if !policy::is_allowed(req.method(), req.path(), user.role) {
                return Err(AppError::Forbidden(
                    "You do not have permission to perform this action".into(),
                )
                .into());
            }

            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}
