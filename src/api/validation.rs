use crate::api::errors::ApiError;
use crate::db::types::UserRole;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

/// Accounts self-register as `user`, `ecole` or `entreprise`; `admin` exists
/// only through the bootstrap account.
pub(crate) fn validate_registration_role(role: UserRole) -> Result<(), ApiError> {
    if role == UserRole::Admin {
        Err(ApiError::BadRequest("Role must be one of: user, ecole, entreprise".to_string()))
    } else {
        Ok(())
    }
}
