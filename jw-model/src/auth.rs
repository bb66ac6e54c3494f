use serde::{Deserialize, Serialize};

/// Credentials posted to the login endpoint.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token material returned on successful login.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}
