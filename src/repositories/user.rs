use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    db,
    error::{AppError, Result},
    models::user::{Role, User},
};

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: row.try_get("role")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Creates a new user. A duplicate email surfaces as a conflict.
pub async fn insert(
    pool: &Pool,
    id: Uuid,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
            &[&id, &name, &email, &password_hash, &role],
        )
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                AppError::Conflict("A user with this email already exists".to_string())
            } else {
                AppError::from(e)
            }
        })?;
    row_to_user(&row)
}

/// Finds a user by their email address.
pub async fn find_by_email(pool: &Pool, email: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt("SELECT * FROM users WHERE email = $1", &[&email])
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Finds a user by their ID.
pub async fn find_by_id(pool: &Pool, user_id: &Uuid) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt("SELECT * FROM users WHERE id = $1", &[user_id])
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Lists all users.
pub async fn list_all(pool: &Pool) -> Result<Vec<User>> {
    let client = pool.get().await?;
    let rows = client
        .query("SELECT * FROM users ORDER BY created_at", &[])
        .await?;
    rows.iter().map(row_to_user).collect()
}

/// Updates a user's name and/or email. Role is immutable after creation.
pub async fn update_profile(
    pool: &Pool,
    user_id: &Uuid,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
            &[user_id, &name, &email],
        )
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                AppError::Conflict("A user with this email already exists".to_string())
            } else {
                AppError::from(e)
            }
        })?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Deletes a user. Returns whether a row was removed.
pub async fn delete(pool: &Pool, user_id: &Uuid) -> Result<bool> {
    let client = pool.get().await?;
    let deleted = client
        .execute("DELETE FROM users WHERE id = $1", &[user_id])
        .await?;
    Ok(deleted > 0)
}
