use crate::{
    error::AppResult,
    models::{LoginReqDto, RefreshReqDto, TokenPair},
    services::AuthService,
};
use actix_web::{HttpResponse, web};
use tracing::info;

/// Exchange email and password for an access and refresh token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "message": "Invalid credentials",
            "code": "INVALID_CREDENTIALS"
        })),
        (status = 429, description = "Too many requests")
    ),
    tag = "Auth"
)]
pub async fn login(
    auth: web::Data<AuthService>,
    payload: web::Json<LoginReqDto>,
) -> AppResult<HttpResponse> {
    info!("Login request received");
    let pair = auth.login(&payload.email, &payload.password).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// Rotate a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshReqDto,
    responses(
        (status = 200, description = "New token pair; the presented refresh token is revoked", body = TokenPair),
        (status = 401, description = "Refresh token invalid, expired or already used"),
        (status = 429, description = "Too many requests")
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    auth: web::Data<AuthService>,
    payload: web::Json<RefreshReqDto>,
) -> AppResult<HttpResponse> {
    let pair = auth.refresh(&payload.refresh_token).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body = RefreshReqDto,
    responses(
        (status = 204, description = "Logged out, even if the token was unknown")
    ),
    tag = "Auth"
)]
pub async fn logout(
    auth: web::Data<AuthService>,
    payload: web::Json<RefreshReqDto>,
) -> AppResult<HttpResponse> {
    auth.logout(&payload.refresh_token).await?;
    Ok(HttpResponse::NoContent().finish())
}
