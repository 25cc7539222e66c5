use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg(test)]
use mockall::automock;

use crate::error::{AppError, AppResult, is_constraint_violation};
use crate::model::department::Department;
use crate::model::role::Role;
use crate::model::user::{NewUser, User, UserChanges, UserFilter};
use crate::utils::db_utils::{UpdateSet, build_update_sql, execute_update};

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, department_id, \
                            leave_balance, annual_entitlement, is_active, last_login_at, created_at";

/// `(limit, offset)` for a 1-based page; the offset is `u64` since `u32::MAX` pages overflow `u32`.
fn page_window(page: u32, per_page: u32) -> (u64, u64) {
    let per_page = u64::from(per_page.clamp(1, 100));
    let offset = u64::from(page.max(1) - 1) * per_page;
    (per_page, offset)
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: u64) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> AppResult<bool>;

    async fn count_admins(&self) -> AppResult<i64>;

    /// One page of users plus the total matching the filter
    async fn list(&self, filter: UserFilter) -> AppResult<(Vec<User>, i64)>;

    /// Fails with `Conflict` on a duplicate email
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// `None` when the user does not exist
    async fn update(&self, user_id: u64, changes: UserChanges) -> AppResult<Option<User>>;

    /// Soft delete; `false` when the user does not exist
    async fn deactivate(&self, user_id: u64) -> AppResult<bool>;

    async fn touch_login(&self, user_id: u64) -> AppResult<()>;

    async fn list_departments(&self) -> AppResult<Vec<Department>>;

    /// Fails with `Conflict` on a duplicate name
    async fn create_department(&self, name: String) -> AppResult<Department>;
}

pub struct MySqlUserStore {
    pool: MySqlPool,
}

impl MySqlUserStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

#[async_trait]
impl UserStore for MySqlUserStore {
    async fn find_by_id(&self, user_id: u64) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists != 0)
    }

    async fn count_admins(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role = ? AND is_active = 1",
        )
        .bind(Role::Admin.as_ref())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list(&self, filter: UserFilter) -> AppResult<(Vec<User>, i64)> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut args: Vec<FilterValue> = Vec::new();

        if !filter.include_inactive {
            conditions.push("is_active = 1");
        }

        if let Some(role) = filter.role {
            conditions.push("role = ?");
            args.push(FilterValue::Str(role.as_ref().to_string()));
        }

        if let Some(department_id) = filter.department_id {
            conditions.push("department_id = ?");
            args.push(FilterValue::U64(department_id));
        }

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            conditions.push("(full_name LIKE ? OR email LIKE ?)");
            let like = format!("%{}%", search);
            args.push(FilterValue::Str(like.clone()));
            args.push(FilterValue::Str(like));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM users{}", where_clause);
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(s.as_str()),
            };
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let (per_page, offset) = page_window(filter.page, filter.per_page);

        let data_sql = format!(
            "SELECT {} FROM users{} ORDER BY full_name, id LIMIT ? OFFSET ?",
            USER_COLUMNS, where_clause
        );
        let mut data_q = sqlx::query_as::<_, User>(&data_sql);
        for arg in &args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(*v),
                FilterValue::Str(s) => data_q.bind(s.as_str()),
            };
        }
        let users = data_q
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((users, total))
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (email, password_hash, full_name, role, department_id,
                 leave_balance, annual_entitlement)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_ref())
        .bind(user.department_id)
        .bind(user.annual_entitlement)
        .bind(user.annual_entitlement)
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(r) => r,
            Err(e) if is_constraint_violation(&e) => {
                return Err(AppError::conflict(
                    "Email already registered or department unknown",
                ));
            }
            Err(e) => return Err(e.into()),
        };

        self.find_by_id(result.last_insert_id())
            .await?
            .ok_or_else(|| AppError::internal("user vanished after insert"))
    }

    async fn update(&self, user_id: u64, changes: UserChanges) -> AppResult<Option<User>> {
        let mut set = UpdateSet::new();
        set.set_opt("full_name", changes.full_name)
            .set_opt("role", changes.role.map(|r| r.as_ref().to_string()))
            .set_opt("department_id", changes.department_id)
            .set_opt("annual_entitlement", changes.annual_entitlement)
            .set_opt("leave_balance", changes.leave_balance)
            .set_opt("is_active", changes.is_active);

        let update = build_update_sql("users", set, "id", user_id)?;
        execute_update(&self.pool, update).await.map_err(|e| {
            if is_constraint_violation(&e) {
                AppError::validation("Unknown department")
            } else {
                e.into()
            }
        })?;

        self.find_by_id(user_id).await
    }

    async fn deactivate(&self, user_id: u64) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        // already inactive rows report 0 affected
        Ok(self.find_by_id(user_id).await?.is_some())
    }

    async fn touch_login(&self, user_id: u64) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = UTC_TIMESTAMP() WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_departments(&self) -> AppResult<Vec<Department>> {
        let departments = sqlx::query_as::<_, Department>(
            "SELECT id, name, created_at FROM departments ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(departments)
    }

    async fn create_department(&self, name: String) -> AppResult<Department> {
        let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
            .bind(&name)
            .execute(&self.pool)
            .await;

        let result = match result {
            Ok(r) => r,
            Err(e) if is_constraint_violation(&e) => {
                return Err(AppError::conflict(format!("Department {} already exists", name)));
            }
            Err(e) => return Err(e.into()),
        };

        let department = sqlx::query_as::<_, Department>(
            "SELECT id, name, created_at FROM departments WHERE id = ?",
        )
        .bind(result.last_insert_id())
        .fetch_one(&self.pool)
        .await?;
        Ok(department)
    }
}

#[cfg(test)]
mod tests {
    use super::page_window;

    #[test]
    fn first_page_starts_at_zero() {
        assert_eq!(page_window(0, 20), (20, 0));
        assert_eq!(page_window(1, 20), (20, 0));
        assert_eq!(page_window(3, 20), (20, 40));
    }

    #[test]
    fn per_page_is_clamped() {
        assert_eq!(page_window(2, 0), (1, 1));
        assert_eq!(page_window(2, 5000), (100, 100));
    }

    #[test]
    fn largest_page_does_not_overflow() {
        assert_eq!(
            page_window(u32::MAX, 100),
            (100, (u64::from(u32::MAX) - 1) * 100)
        );
    }
}
