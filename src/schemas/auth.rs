use serde::Serialize;

use crate::db::models::User;
use crate::schemas::user::UserResponse;

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserResponse,
}

impl TokenResponse {
    pub(crate) fn bearer(access_token: String, user: User) -> Self {
        Self { access_token, token_type: "bearer".to_string(), user: UserResponse::from_db(user) }
    }
}
