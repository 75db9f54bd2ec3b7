use serde::{Deserialize, Serialize};

// -- Session claims --

/// Session token claims shared between roost-api (cookie middleware) and the
/// auth handlers that mint tokens. Canonical definition lives here in
/// roost-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Auth forms --

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
    /// Checkbox: present ("on") when ticked, absent otherwise.
    #[serde(default)]
    pub agree_to_tos: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountDeletionForm {
    pub email: String,
    pub password: String,
}

// -- Content forms --

#[derive(Debug, Deserialize)]
pub struct TextForm {
    pub text: String,
}

// -- Admin forms --

#[derive(Debug, Deserialize)]
pub struct AdminUserEdit {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminTextEdit {
    pub text: String,
}

// -- Responses --

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub likes: i64,
    pub liked: bool,
}
