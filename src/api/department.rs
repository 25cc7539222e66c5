use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::department::Department;
use crate::services::UserService;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Warehouse")]
    pub name: String,
}

#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "All departments", body = [Department]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn list_departments(
    _auth: AuthUser,
    service: web::Data<UserService>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.departments().await?))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Empty name"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn create_department(
    auth: AuthUser,
    service: web::Data<UserService>,
    payload: web::Json<CreateDepartment>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let department = service.create_department(&payload.name).await?;
    Ok(HttpResponse::Created().json(department))
}
