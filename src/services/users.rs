use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::user::User,
    repositories::user as user_repo,
    state::AppState,
};

/// Lists all users.
pub async fn list_users(state: &AppState) -> Result<Vec<User>> {
    user_repo::list_all(&state.db).await
}

/// Fetches a user by ID.
pub async fn get_user(state: &AppState, user_id: Uuid) -> Result<User> {
    user_repo::find_by_id(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Updates a user's name and/or email.
pub async fn update_user(
    state: &AppState,
    user_id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<User> {
    user_repo::update_profile(&state.db, &user_id, name, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Deletes a user.
///
/// Outstanding tokens for the account die with the row: authentication
/// re-resolves the subject on every request and finds nothing.
pub async fn delete_user(state: &AppState, user_id: Uuid) -> Result<()> {
    if !user_repo::delete(&state.db, &user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    tracing::info!("✅ User deleted: {}", user_id);
    Ok(())
}
