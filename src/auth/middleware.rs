use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderValue, AUTHORIZATION},
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::token::{Claims, TokenService};
use crate::error::AppError;
use crate::models::Role;

/// Gates a scope on a valid bearer token whose role satisfies `required`.
///
/// On success the decoded [`Claims`] are stored in the request extensions for
/// [`AuthenticatedUser`](crate::auth::AuthenticatedUser) to pick up. Rejections
/// are answered directly with a JSON error body and the wrapped service is
/// never called.
#[derive(Clone)]
pub struct AuthMiddleware {
    tokens: Arc<dyn TokenService>,
    required: Role,
}

impl AuthMiddleware {
    pub fn new(tokens: Arc<dyn TokenService>, required: Role) -> Self {
        Self { tokens, required }
    }

    /// Any role may pass.
    pub fn authenticated(tokens: Arc<dyn TokenService>) -> Self {
        Self::new(tokens, Role::User)
    }

    pub fn admin_only(tokens: Arc<dyn TokenService>) -> Self {
        Self::new(tokens, Role::Admin)
    }
}

/// Splits `Bearer <token>`. The scheme is matched case-insensitively and the
/// header must consist of exactly two space separated parts.
fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Some(token)
        }
        _ => None,
    }
}

/// Decides whether a request carrying `header` may reach a route requiring `required`.
pub fn authorize(
    header: Option<&HeaderValue>,
    tokens: &dyn TokenService,
    required: Role,
) -> Result<Claims, AppError> {
    let header = match header {
        Some(value) if !value.is_empty() => value,
        _ => {
            return Err(AppError::Unauthorized(
                "Authorization header is required".into(),
            ))
        }
    };

    let token = header
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".into()))?;

    let claims = tokens
        .validate_token(token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    if !claims.role.satisfies(required) {
        log::warn!(
            "user '{}' with role {} denied access to a {} route",
            claims.username,
            claims.role,
            required
        );
        return Err(AppError::Forbidden(
            "User role not allowed to access this endpoint".into(),
        ));
    }

    Ok(claims)
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            tokens: Arc::clone(&self.tokens),
            required: self.required,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    tokens: Arc<dyn TokenService>,
    required: Role,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = authorize(
            req.headers().get(AUTHORIZATION),
            self.tokens.as_ref(),
            self.required,
        );

        match decision {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let service = Rc::clone(&self.service);
                Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(err) => {
                log::debug!("rejected {} {}: {}", req.method(), req.path(), err);
                let response = req.into_response(err.error_response());
                Box::pin(async move { Ok(response.map_into_right_body()) })
            }
        }
    }
}
