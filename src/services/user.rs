use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::auth::password::{MIN_PASSWORD_LEN, hash_password};
use crate::error::{AppError, AppResult};
use crate::model::department::Department;
use crate::model::role::Role;
use crate::model::user::{CreateUser, NewUser, User, UserChanges, UserFilter};
use crate::store::UserStore;
use crate::utils::{email_cache, email_filter};

pub struct UserService {
    users: Arc<dyn UserStore>,
    default_annual_leave: i32,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, default_annual_leave: i32) -> Self {
        Self {
            users,
            default_annual_leave,
        }
    }

    /// true  => email AVAILABLE
    /// false => email TAKEN
    ///
    /// Cuckoo filter first (fast negative), then the cache (fast positive),
    /// then the database.
    pub async fn is_email_available(&self, email: &str) -> AppResult<bool> {
        if !email_filter::might_exist(email) {
            return Ok(true);
        }

        if email_cache::is_taken(email).await {
            return Ok(false);
        }

        let taken = self.users.email_exists(&email_filter::normalize(email)).await?;
        if taken {
            email_cache::mark_taken(email).await;
        }
        Ok(!taken)
    }

    pub async fn list(&self, filter: UserFilter) -> AppResult<(Vec<User>, i64)> {
        self.users.list(filter).await
    }

    pub async fn get(&self, user_id: u64) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    #[instrument(name = "user_create", skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: CreateUser) -> AppResult<User> {
        let email = email_filter::normalize(&input.email);
        let full_name = input.full_name.trim().to_string();

        if !email.contains('@') {
            return Err(AppError::validation("A valid email is required"));
        }
        if full_name.is_empty() {
            return Err(AppError::validation("full_name must not be empty"));
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let annual_entitlement = input.annual_entitlement.unwrap_or(self.default_annual_leave);
        if annual_entitlement < 0 {
            return Err(AppError::validation("annual_entitlement cannot be negative"));
        }

        if !self.is_email_available(&email).await? {
            debug!("Email already registered");
            return Err(AppError::conflict("Email already registered"));
        }

        let user = self
            .users
            .create(NewUser {
                email: email.clone(),
                password_hash: hash_password(&input.password)?,
                full_name,
                role: input.role,
                department_id: input.department_id,
                annual_entitlement,
            })
            .await?;

        email_filter::insert(&email);
        email_cache::mark_taken(&email).await;

        info!(user_id = user.id, role = %user.role, "User onboarded");
        Ok(user)
    }

    pub async fn update(&self, user_id: u64, changes: UserChanges) -> AppResult<User> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields provided for update"));
        }
        if changes.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("full_name must not be empty"));
        }
        if changes.leave_balance.is_some_and(|b| b < 0)
            || changes.annual_entitlement.is_some_and(|e| e < 0)
        {
            return Err(AppError::validation("Leave days cannot be negative"));
        }

        self.users
            .update(user_id, changes)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    /// Soft delete. Admins cannot lock themselves out.
    pub async fn deactivate(&self, user_id: u64, acting_user_id: u64) -> AppResult<()> {
        if user_id == acting_user_id {
            return Err(AppError::validation("You cannot deactivate your own account"));
        }
        if !self.users.deactivate(user_id).await? {
            return Err(AppError::NotFound("User"));
        }
        info!(user_id, "User deactivated");
        Ok(())
    }

    pub async fn departments(&self) -> AppResult<Vec<Department>> {
        self.users.list_departments().await
    }

    pub async fn create_department(&self, name: &str) -> AppResult<Department> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Department name must not be empty"));
        }
        self.users.create_department(name.to_string()).await
    }

    /// Creates the first admin when the database has none.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<()> {
        if self.users.count_admins().await? > 0 {
            return Ok(());
        }

        warn!(email, "No admin account found, creating one");
        self.create(CreateUser {
            email: email.to_string(),
            password: password.to_string(),
            full_name: "Administrator".to_string(),
            role: Role::Admin,
            department_id: None,
            annual_entitlement: None,
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::user::MockUserStore;
    use chrono::Utc;

    fn create_input(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            password: "correct-horse-battery".to_string(),
            full_name: " Jane Doe ".to_string(),
            role: Role::Employee,
            department_id: Some(2),
            annual_entitlement: None,
        }
    }

    fn stored(new: NewUser) -> User {
        User {
            id: 7,
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            role: new.role,
            department_id: new.department_id,
            leave_balance: new.annual_entitlement,
            annual_entitlement: new.annual_entitlement,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn create_normalizes_and_applies_default_entitlement() {
        let mut users = MockUserStore::new();
        users.expect_email_exists().returning(|_| Ok(false));
        users
            .expect_create()
            .withf(|new| {
                new.email == "new.hire.service@company.com"
                    && new.full_name == "Jane Doe"
                    && new.annual_entitlement == 20
                    && new.password_hash.starts_with("$argon2")
            })
            .returning(|new| Ok(stored(new)));

        let service = UserService::new(Arc::new(users), 20);
        let user = service
            .create(create_input(" New.Hire.Service@Company.com"))
            .await
            .unwrap();

        assert_eq!(user.leave_balance, 20);
    }

    #[actix_web::test]
    async fn create_rejects_short_passwords() {
        let mut users = MockUserStore::new();
        users.expect_create().never();

        let service = UserService::new(Arc::new(users), 20);
        let mut input = create_input("short.pw@company.com");
        input.password = "short".into();

        assert!(matches!(
            service.create(input).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[actix_web::test]
    async fn second_registration_of_an_email_conflicts() {
        let mut users = MockUserStore::new();
        users.expect_email_exists().returning(|_| Ok(false));
        users.expect_create().times(1).returning(|new| Ok(stored(new)));

        let service = UserService::new(Arc::new(users), 20);
        service
            .create(create_input("twice@company.com"))
            .await
            .unwrap();

        // served from the in-memory filter and cache, no second insert
        let err = service
            .create(create_input("Twice@company.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn update_rejects_negative_balance() {
        let mut users = MockUserStore::new();
        users.expect_update().never();

        let service = UserService::new(Arc::new(users), 20);
        let err = service
            .update(
                7,
                UserChanges {
                    leave_balance: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[actix_web::test]
    async fn admins_cannot_deactivate_themselves() {
        let mut users = MockUserStore::new();
        users.expect_deactivate().never();

        let service = UserService::new(Arc::new(users), 20);
        assert!(matches!(
            service.deactivate(1, 1).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[actix_web::test]
    async fn ensure_admin_skips_when_one_exists() {
        let mut users = MockUserStore::new();
        users.expect_count_admins().returning(|| Ok(1));
        users.expect_create().never();

        let service = UserService::new(Arc::new(users), 20);
        service
            .ensure_admin("admin@company.com", "correct-horse-battery")
            .await
            .unwrap();
    }
}
