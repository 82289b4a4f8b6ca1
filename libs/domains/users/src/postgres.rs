use async_trait::async_trait;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, SqlErr};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{NewUser, User},
    repository::UserRepository,
};

/// PostgreSQL-backed repository; uniqueness comes from the `username` UNIQUE constraint.
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn write_error(err: DbErr, username: &str) -> UserError {
    classify_write_error(err.sql_err(), err, username)
}

/// Unique violations become `DuplicateUsername`, anything else stays a database error.
fn classify_write_error(sql_err: Option<SqlErr>, err: DbErr, username: &str) -> UserError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(%username, %detail, "Unique constraint rejected write");
            UserError::DuplicateUsername(username.to_string())
        }
        _ => UserError::Database(err),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<User> {
        let username = user.username.clone();
        let active_model: entity::ActiveModel = user.into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, &username))?;

        tracing::info!(user_id = model.user_id, username = %model.username, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::UserId)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i32, user: NewUser) -> UserResult<User> {
        let username = user.username.clone();
        let active_model = entity::ActiveModel {
            user_id: Unchanged(id),
            nama_user: Set(user.nama_user),
            role: Set(user.role),
            username: Set(user.username),
            password: Set(user.password_hash),
        };

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => UserError::NotFound(id.to_string()),
            other => write_error(other, &username),
        })?;

        tracing::info!(user_id = id, "Updated user");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = id, "Deleted user");
        }
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: i32, username: &str) -> entity::Model {
        entity::Model {
            user_id: id,
            nama_user: "Budi".to_string(),
            role: Role::Cashier,
            username: username.to_string(),
            password: "hash".to_string(),
        }
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            nama_user: "Budi".to_string(),
            role: Role::Cashier,
            username: username.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_returns_stored_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(7, "budi1")]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let user = repo.create(new_user("budi1")).await.unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.username, "budi1");
        assert_eq!(user.role, Role::Cashier);
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgUserRepository::new(db);

        assert_eq!(repo.get_by_id(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_maps_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "a"), model(2, "b")]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let users = repo.list().await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let result = repo.update(5, new_user("budi1")).await;
        assert!(matches!(result, Err(UserError::NotFound(ref id)) if id == "5"));
    }

    #[tokio::test]
    async fn test_delete_reports_affected_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = PgUserRepository::new(db);

        assert!(repo.delete(3).await.unwrap());
        assert!(!repo.delete(3).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_failure_is_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let result = repo.list().await;
        assert!(matches!(result, Err(UserError::Database(DbErr::Custom(ref msg))) if msg == "connection reset"));
    }

    #[tokio::test]
    async fn test_create_failure_without_constraint_is_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("disk full".to_string())])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let result = repo.create(new_user("budi1")).await;
        assert!(matches!(result, Err(UserError::Database(_))));
    }

    // sqlx's PgDatabaseError cannot be built outside sqlx, so the mock can
    // never yield a DbErr whose sql_err() is a unique violation. The
    // classification is exercised directly instead.
    #[test]
    fn test_unique_violation_is_duplicate_username() {
        let err = classify_write_error(
            Some(SqlErr::UniqueConstraintViolation(
                "duplicate key value violates unique constraint \"users_username_key\"".to_string(),
            )),
            DbErr::Custom("23505".to_string()),
            "budi1",
        );

        assert!(matches!(err, UserError::DuplicateUsername(ref name) if name == "budi1"));
    }

    #[test]
    fn test_foreign_key_violation_stays_database_error() {
        let err = classify_write_error(
            Some(SqlErr::ForeignKeyConstraintViolation("fk".to_string())),
            DbErr::Custom("23503".to_string()),
            "budi1",
        );

        assert!(matches!(err, UserError::Database(_)));
    }
}
