use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::Role;

/// The caller identified by [`AuthMiddleware`](crate::auth::AuthMiddleware).
///
/// Only usable on routes inside a scope wrapped by the middleware; anywhere
/// else extraction fails with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }

    pub fn role(&self) -> Role {
        self.0.role
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims))),
            None => {
                let err = AppError::Unauthorized("Authorization header is required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
