use rouille::Response;
use serde_json::json;

use crate::playback::error::PlaybackError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<PlaybackError> for ApiError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::NotFound(id) => ApiError::NotFound(format!("track {} not found", id)),

            PlaybackError::EmptyPlaylist => ApiError::BadRequest("playlist is empty".into()),

            PlaybackError::Resolution(e) => ApiError::Internal(e.to_string()),

            PlaybackError::Player(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<rouille::input::json::JsonError> for ApiError {
    fn from(err: rouille::input::json::JsonError) -> Self {
        ApiError::BadRequest(format!("invalid json body: {err}"))
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    /// failed control calls keep the `{"status": false}` shape clients expect
    pub fn into_response(self) -> Response {
        let status = self.status_code();
        let (ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg)) = self;
        Response::json(&json!({ "status": false, "error": msg })).with_status_code(status)
    }
}
