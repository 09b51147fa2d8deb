use serde::{Deserialize, Serialize};

use crate::domain::{User, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Exchange of a Google ID token for an app session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub token: String,
}

impl From<AuthResponse> for User {
    fn from(value: AuthResponse) -> Self {
        Self {
            id: value.id,
            full_name: value.full_name,
            email: value.email,
            token: value.token,
            birth_year: None,
            avatar: None,
            profile_pictures: None,
            birth_date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub birth_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub user_id: String,
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePicturesResponse {
    #[serde(default)]
    pub profile_pictures: Vec<String>,
}

/// Older server builds answer with `url`, newer ones with `imageUrl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProfilePictureResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl UploadProfilePictureResponse {
    pub fn into_url(self) -> Option<String> {
        self.image_url
            .filter(|url| !url.is_empty())
            .or(self.url.filter(|url| !url.is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveProfilePictureRequest {
    pub image_url: String,
}

/// Body of `update-profile-pictures-order`: the compacted list of occupied
/// gallery URLs in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub profile_pictures: Vec<String>,
}
