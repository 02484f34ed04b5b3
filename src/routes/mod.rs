pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{error::JsonPayloadError, guard, web, HttpRequest};
use std::sync::Arc;

use crate::auth::{AuthMiddleware, TokenService};
use crate::error::AppError;

/// Mounts the API routes. Expected under an `/api` scope.
///
/// Reading tasks needs any valid token; changing tasks and managing users
/// needs an Admin token. `/auth` is public.
pub fn config(cfg: &mut web::ServiceConfig, tokens: Arc<dyn TokenService>) {
    cfg.app_data(json_config())
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::register),
        )
        .service(
            web::scope("/tasks")
                .guard(guard::Get())
                .wrap(AuthMiddleware::authenticated(Arc::clone(&tokens)))
                .service(tasks::get_tasks)
                .service(tasks::get_task),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware::admin_only(Arc::clone(&tokens)))
                .service(tasks::create_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware::admin_only(tokens))
                .service(users::list_users)
                .service(users::promote_user),
        );
}

/// Malformed or mistyped JSON bodies are answered with 400 and the usual error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, req: &HttpRequest| {
        log::debug!("rejected JSON body on {}: {}", req.path(), err);
        AppError::BadRequest("Invalid input data".into()).into()
    })
}
