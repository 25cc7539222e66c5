use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    #[schema(example = 2)]
    pub id: u64,
    #[schema(example = "Warehouse")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}
