use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{User, UserProfile},
    error::ApiError,
    protocol::{
        AuthResponse, GoogleLoginRequest, ProfilePicturesResponse, RemoveProfilePictureRequest,
        ReorderRequest, UploadProfilePictureResponse,
    },
};
use tracing::{debug, info, warn};

pub mod auth;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod gallery;
pub mod session;

pub use cache::{CacheState, GalleryCache};
pub use config::{load_settings, ClientSettings};
pub use controller::{
    AlertKind, GalleryAlert, GalleryEvent, GalleryOperation, GalleryOrderingController,
    UploadOutcome,
};
pub use error::ClientError;
pub use gallery::{PhotoSlot, PhotoSlots, SlotIndex};
pub use session::{FileSessionStore, MemorySessionStore, SessionContext, SessionStore};

/// Content type every gallery upload is sent with.
pub const UPLOAD_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Remote store holding the durable copy of the gallery.
#[async_trait]
pub trait GalleryBackend: Send + Sync {
    async fn fetch_profile_pictures(&self) -> Result<Vec<String>, ClientError>;
    async fn upload_profile_picture(&self, upload: PhotoUpload) -> Result<String, ClientError>;
    async fn remove_profile_picture(&self, image_url: &str) -> Result<(), ClientError>;
    async fn update_profile_pictures_order(
        &self,
        request: &ReorderRequest,
    ) -> Result<(), ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Device photo library the user picks uploads from.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;
    /// `Ok(None)` when the user dismissed the picker.
    async fn pick_image(&self) -> Result<Option<Vec<u8>>, ClientError>;
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(settings: &ClientSettings, session: Arc<SessionContext>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config::normalize_base_url(&settings.api_base_url)?,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let request = auth::login_request(email, password)?;
        let body: AuthResponse = self
            .send_json(
                self.http.post(self.url("/api/auth/login")).json(&request),
                "Invalid email or password",
            )
            .await?;
        self.start_session(body).await
    }

    /// Exchanges an ID token obtained from Google sign-in for an app session.
    pub async fn login_with_google(&self, id_token: &str) -> Result<User, ClientError> {
        if id_token.trim().is_empty() {
            return Err(ClientError::validation("No ID token from Google"));
        }
        let body: AuthResponse = self
            .send_json(
                self.http
                    .post(self.url("/api/auth/google"))
                    .json(&GoogleLoginRequest {
                        token: id_token.to_string(),
                    }),
                "Google login failed",
            )
            .await?;
        self.start_session(body).await
    }

    pub async fn register(&self, form: auth::RegistrationForm) -> Result<(), ClientError> {
        let request = form.into_request()?;
        self.post_json("/api/auth/register", &request, "Registration failed", false)
            .await?;
        info!("auth: registered account username={}", request.username);
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ClientError> {
        let request = auth::forgot_password_request(email)?;
        self.post_json(
            "/api/auth/forgot-password",
            &request,
            "Could not send reset email",
            false,
        )
        .await
    }

    pub async fn reset_password(
        &self,
        user_id: &str,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), ClientError> {
        let request = auth::reset_password_request(user_id, token, password, confirm_password)?;
        self.post_json(
            "/api/auth/reset-password",
            &request,
            "Could not reset password",
            false,
        )
        .await
    }

    pub async fn fetch_profile(&self) -> Result<UserProfile, ClientError> {
        let request = self.authorized(self.http.get(self.url("/api/user/profile"))).await?;
        self.send_json(request, "Could not load profile").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn start_session(&self, body: AuthResponse) -> Result<User, ClientError> {
        let user = User::from(body);
        info!("auth: signed in user_id={}", user.id);
        if let Err(err) = self.session.set_user(user.clone()).await {
            warn!("auth: session not persisted: {err}");
        }
        Ok(user)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.session.bearer_token().await?;
        Ok(request.bearer_auth(token))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
        authenticated: bool,
    ) -> Result<(), ClientError> {
        let mut request = self.http.post(self.url(path)).json(body);
        if authenticated {
            request = self.authorized(request).await?;
        }
        self.send(request, fallback).await?;
        Ok(())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ClientError> {
        Ok(self.send(request, fallback).await?.json().await?)
    }

    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response, ClientError> {
        let res = request.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        let err = ApiError::from_body(status.as_u16(), &body, fallback);
        debug!(
            "api: request failed status={} code={:?} message={}",
            status.as_u16(),
            err.code,
            err.message
        );
        Err(ClientError::from((status.as_u16(), err)))
    }
}

#[async_trait]
impl GalleryBackend for ApiClient {
    async fn fetch_profile_pictures(&self) -> Result<Vec<String>, ClientError> {
        let request = self
            .authorized(self.http.get(self.url("/api/user/profile-pictures")))
            .await?;
        let body: ProfilePicturesResponse = self
            .send_json(request, "Could not load profile pictures")
            .await?;
        Ok(body.profile_pictures)
    }

    async fn upload_profile_picture(&self, upload: PhotoUpload) -> Result<String, ClientError> {
        let size = upload.bytes.len();
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.filename.clone())
            .mime_str(UPLOAD_MIME_TYPE)?;
        let form = multipart::Form::new().part("profilePicture", part);
        let request = self
            .authorized(
                self.http
                    .post(self.url("/api/user/upload-profile-picture"))
                    .multipart(form),
            )
            .await?;
        let body: UploadProfilePictureResponse =
            self.send_json(request, "Image upload failed").await?;
        let url = body.into_url().ok_or_else(|| ClientError::Api {
            status: 200,
            message: "upload response carried no image url".into(),
        })?;
        info!(
            "gallery: uploaded filename={} size_bytes={size}",
            upload.filename
        );
        Ok(url)
    }

    async fn remove_profile_picture(&self, image_url: &str) -> Result<(), ClientError> {
        self.post_json(
            "/api/user/remove-profile-picture",
            &RemoveProfilePictureRequest {
                image_url: image_url.to_string(),
            },
            "Image removal failed",
            true,
        )
        .await
    }

    async fn update_profile_pictures_order(
        &self,
        request: &ReorderRequest,
    ) -> Result<(), ClientError> {
        self.post_json(
            "/api/user/update-profile-pictures-order",
            request,
            "Could not sync photo order",
            true,
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
