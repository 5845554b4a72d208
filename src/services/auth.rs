use crate::error::{AppError, Result};
use crate::jwt::{self, TokenPair};
use crate::models::user::{Role, User};
use crate::repositories::user as user_repo;
use crate::state::AppState;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;
use zeroize::Zeroize;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 6;

/// Hashes a password using Argon2id.
fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

/// Verifies a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;
    let argon2 = Argon2::default();
    let result = argon2
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    Ok(result)
}

/// Registers a new user. Role defaults to student when not given.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `name` - The user's full name.
/// * `email` - The user's email, unique across the platform.
/// * `password` - The plaintext password to hash.
/// * `role` - The role assigned at creation; immutable afterwards.
///
/// # Returns
///
/// A `Result` containing the created `User`.
pub async fn register(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
    role: Option<Role>,
) -> Result<User> {
    tracing::debug!("🔐 Registering user: {}", email);

    if user_repo::find_by_email(&state.db, email).await?.is_some() {
        return Err(AppError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(password)?;
    let user = user_repo::insert(
        &state.db,
        Uuid::new_v4(),
        name,
        email,
        &password_hash,
        role.unwrap_or(Role::Student),
    )
    .await?;

    tracing::info!("✅ User registered with ID: {}", user.id);
    Ok(user)
}

/// Authenticates a user by email and password and issues a token pair.
///
/// Unknown email and wrong password fail identically so the response gives
/// no account-existence oracle.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<(TokenPair, User)> {
    tracing::debug!("🔐 Login attempt: {}", email);

    let user = user_repo::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }

    let tokens = jwt::issue(&state.config, &user)?;
    tracing::info!("✅ User logged in: {}", user.id);
    Ok((tokens, user))
}

/// Exchanges a refresh token for a fresh token pair.
///
/// The identity is re-resolved from storage; a deleted account invalidates
/// its outstanding refresh tokens even though their signatures still check.
pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<(TokenPair, User)> {
    let claims = jwt::verify_refresh(&state.config, refresh_token)?;

    let user = user_repo::find_by_id(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token, authorization denied".to_string()))?;

    let tokens = jwt::issue(&state.config, &user)?;
    tracing::info!("✅ Tokens refreshed for user: {}", user.id);
    Ok((tokens, user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip_verifies() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }
}
