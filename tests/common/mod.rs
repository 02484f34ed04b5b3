#![allow(dead_code)]

use actix_cors::Cors;
use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use taskgate::auth::{BcryptHasher, JwtService};
use taskgate::routes::health;
use taskgate::Services;

pub const TEST_SECRET: &str = "integration-test-secret";

/// In-memory services with a cheap bcrypt cost.
pub fn services() -> Services {
    Services::in_memory(
        Arc::new(BcryptHasher::new(4)),
        Arc::new(JwtService::new(TEST_SECRET, chrono::Duration::hours(1))),
        Duration::from_secs(5),
    )
    .expect("in-memory services")
}

/// The same application layout the binary serves.
pub async fn init_app(
    services: Services,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(move |cfg| services.configure(cfg))),
    )
    .await
}

/// Sends a request and returns the status with the body parsed as JSON
/// (`Value::Null` for an empty body).
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))
    };
    (status, body)
}

pub async fn register<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"username": username, "password": password}))
        .to_request();
    send(app, req).await
}

pub async fn login<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": username, "password": password}))
        .to_request();
    send(app, req).await
}

/// Registers `username` and returns a bearer token for it.
pub async fn token_for<S, B>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = register(app, username, "password123").await;
    assert_eq!(status, StatusCode::CREATED, "register {}: {}", username, body);

    let (status, body) = login(app, username, "password123").await;
    assert_eq!(status, StatusCode::OK, "login {}: {}", username, body);
    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}
