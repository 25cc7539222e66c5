use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::models::TokenType;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;
use tracing::debug;

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(json!({
        "message": message,
        "code": "UNAUTHORIZED",
    }));
    req.into_response(resp.map_into_boxed_body())
}

/// Verifies the bearer access token and stores the caller as `AuthUser`.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header_value = match req.headers().get("Authorization") {
        Some(h) => match h.to_str() {
            Ok(v) => v.to_owned(),
            Err(_) => return Ok(unauthorized(req, "Invalid Authorization header encoding")),
        },
        None => return Ok(unauthorized(req, "Missing Authorization header")),
    };

    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return Ok(unauthorized(req, "Authorization header must start with Bearer"));
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "Bearer token rejected");
            return Ok(unauthorized(req, "Invalid or expired token"));
        }
    };

    if claims.token_type != TokenType::Access {
        return Ok(unauthorized(req, "Access token required"));
    }

    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
        email: claims.sub,
        role: claims.role,
    });

    next.call(req).await
}
