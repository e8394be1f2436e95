use serde::{Deserialize, Serialize};

use crate::models::{poll_models::MAX_TEXT_LEN, user_models::User};
use crate::utils::error::{AppError, AppResult};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 150;
pub const MIN_DISPLAY_NAME_LEN: usize = 2;

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterStartRequest {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterFinishRequest {
    pub username: String,
    pub credential: serde_json::Value,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AuthStartRequest {
    pub username: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AuthFinishRequest {
    pub username: String,
    pub credential: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub success: bool,
    pub user_id: String,
    pub username: String,
    pub display_name: String,
}

impl From<&User> for AuthResponse {
    fn from(user: &User) -> Self {
        Self {
            success: true,
            user_id: user.id.to_hex(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UpdateProfileRequest {
    pub about: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub about: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            username: user.username,
            display_name: user.display_name,
            email: user.email,
            about: user.about,
        }
    }
}

/// Describes a form: the fields a client must send to the matching POST.
#[derive(Serialize, Deserialize, Debug)]
pub struct FormDescription {
    pub action: String,
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

pub fn clean_about(about: &str) -> AppResult<String> {
    let about = about.trim();
    if about.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::ValidationError(format!(
            "About must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(about.to_string())
}

impl RegisterStartRequest {
    pub fn validate(&self) -> AppResult<()> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(AppError::ValidationError("Username is required".to_string()));
        }
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AppError::ValidationError(format!(
                "Username must be at least {MIN_USERNAME_LEN} characters long"
            )));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(AppError::ValidationError(format!(
                "Username must be at most {MAX_USERNAME_LEN} characters long"
            )));
        }
        if username != self.username {
            return Err(AppError::ValidationError(
                "Username must not start or end with whitespace".to_string(),
            ));
        }

        if self.display_name.trim().chars().count() < MIN_DISPLAY_NAME_LEN {
            return Err(AppError::ValidationError(format!(
                "Display name must be at least {MIN_DISPLAY_NAME_LEN} characters long"
            )));
        }

        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(AppError::ValidationError("Enter a valid email address".to_string()));
            }
        }

        clean_about(self.about.as_deref().unwrap_or_default())?;

        Ok(())
    }
}
