use crate::{
    auth::{AuthResponse, Credentials},
    error::AppError,
    usecases::UserUseCase,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// The first account ever registered becomes an Admin.
#[post("/register")]
pub async fn register(
    users: web::Data<UserUseCase>,
    credentials: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    credentials.validate()?;
    users.create_user(credentials.into_inner()).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".into(),
        token: None,
    }))
}

/// Login user
///
/// Returns a bearer token carrying the account's role.
#[post("/login")]
pub async fn login(
    users: web::Data<UserUseCase>,
    credentials: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    credentials.validate()?;
    let token = users.login(credentials.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "User logged in successfully".into(),
        token: Some(token),
    }))
}
