use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{
    error::{AppError, Result},
    jwt,
    models::user::{Role, User},
    repositories::user as user_repo,
    state::AppState,
};

/// The identity resolved for the current request, attached as an extension
/// by [`authenticate`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Allow-set for admin-only routes.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
/// Allow-set for instructor routes (admins pass everywhere).
pub const INSTRUCTOR_OR_ADMIN: &[Role] = &[Role::Instructor, Role::Admin];
/// Allow-set for student routes (admins pass everywhere).
pub const STUDENT_OR_ADMIN: &[Role] = &[Role::Student, Role::Admin];

/// A middleware that requires a valid bearer token.
///
/// Extracts `Authorization: Bearer <token>`, verifies it, then re-resolves
/// the user from storage by subject id - the token's role claim is never
/// trusted for authorization, and a deleted account fails here even while
/// its tokens still carry valid signatures.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    tracing::debug!("🔐 Checking authentication...");

    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = jwt::extract_bearer(auth_header).ok_or_else(|| {
        tracing::warn!("❌ No bearer token in Authorization header");
        AppError::Unauthorized("No token provided, authorization denied".to_string())
    })?;

    let claims = jwt::verify_access(&state.config, token)?;

    let user = user_repo::find_by_id(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::warn!("❌ Token subject {} no longer exists", claims.sub);
            AppError::Unauthorized("Invalid token, authorization denied".to_string())
        })?;

    tracing::debug!("✅ User authenticated: {}", user.id);

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// The route-level authorization policy: the identity's role must be a
/// member of the route's allow-set.
pub fn authorize(user: &CurrentUser, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&user.0.role) {
        Ok(())
    } else {
        tracing::warn!("❌ Role {:?} not allowed for user {}", user.0.role, user.0.id);
        Err(AppError::Forbidden)
    }
}

/// A middleware that applies [`authorize`] with a fixed allow-set.
/// Composed after [`authenticate`]:
///
/// ```ignore
/// .route_layer(from_fn(|req, next| require_role(req, next, INSTRUCTOR_OR_ADMIN)))
/// .route_layer(from_fn_with_state(state.clone(), authenticate))
/// ```
pub async fn require_role(
    request: Request<Body>,
    next: Next,
    allowed: &'static [Role],
) -> Result<Response> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    authorize(user, allowed)?;

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user_with_role(role: Role) -> CurrentUser {
        CurrentUser(User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@demo.com".to_string(),
            password_hash: "hash".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[test]
    fn role_in_allow_set_passes() {
        assert!(authorize(&user_with_role(Role::Instructor), INSTRUCTOR_OR_ADMIN).is_ok());
        assert!(authorize(&user_with_role(Role::Admin), INSTRUCTOR_OR_ADMIN).is_ok());
        assert!(authorize(&user_with_role(Role::Student), STUDENT_OR_ADMIN).is_ok());
    }

    #[test]
    fn role_outside_allow_set_is_forbidden() {
        let err = authorize(&user_with_role(Role::Student), INSTRUCTOR_OR_ADMIN).unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = authorize(&user_with_role(Role::Instructor), ADMIN_ONLY).unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[test]
    fn admin_is_not_implicitly_a_student() {
        // Admin passes through the explicit allow-sets, nothing else.
        assert!(authorize(&user_with_role(Role::Admin), STUDENT_OR_ADMIN).is_ok());
        assert!(authorize(&user_with_role(Role::Admin), &[Role::Student]).is_err());
    }
}
