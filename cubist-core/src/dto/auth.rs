//! Authentication DTOs

use serde::{Deserialize, Serialize};

/// Form body of `POST /api/v1/authentication/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response of `POST /api/v1/authentication/login`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub access_token: Option<String>,
}

impl LoginResponse {
    /// The `authorization` header value for a successful login
    pub fn bearer_token(self) -> Option<String> {
        if !self.success {
            return None;
        }
        self.access_token
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t))
    }
}
