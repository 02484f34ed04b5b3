use crate::{error::AppError, models::UserResponse, usecases::UserUseCase};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;

use crate::auth::AuthenticatedUser;

/// Lists every account without its password hash. Admin only.
#[get("")]
pub async fn list_users(users: web::Data<UserUseCase>) -> Result<impl Responder, AppError> {
    let all: Vec<UserResponse> = users
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(all))
}

/// Raises a User to Admin. Admin only.
///
/// ## Responses:
/// - `200 OK`: `{"message", "user"}` with the promoted account.
/// - `404 Not Found`: no account has that username.
/// - `409 Conflict`: the account is already an Admin.
#[post("/{username}/promote")]
pub async fn promote_user(
    users: web::Data<UserUseCase>,
    username: web::Path<String>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let promoted = users.promote_user(&username).await?;
    log::info!("'{}' promoted '{}'", caller.username(), promoted.username);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User promoted successfully",
        "user": UserResponse::from(promoted),
    })))
}
