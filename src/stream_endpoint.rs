use crate::{
    config::StreamConfig,
    domain::track::Track,
    playback::error::ResolveError,
};

/// Turns a track into a url the media player can open
pub trait StreamResolver: Send + Sync {
    fn resolve_stream_url(&self, track: &Track, device_id: &str) -> Result<String, ResolveError>;

    /// device the streams are requested for
    fn device_id(&self) -> &str;
}

/// Resolves tracks against a streaming endpoint serving `/tracks/{ref}/stream`
#[derive(Debug, Clone)]
pub struct StreamEndpoint {
    base_url: String,
    device_id: String,
}

impl StreamEndpoint {
    pub fn new(conf: &StreamConfig) -> Self {
        Self {
            base_url: conf.base_url.trim_end_matches('/').to_string(),
            device_id: conf.device_id.clone(),
        }
    }
}

impl StreamResolver for StreamEndpoint {
    fn resolve_stream_url(&self, track: &Track, device_id: &str) -> Result<String, ResolveError> {
        let reference = track.store_id.trim();
        if reference.is_empty() {
            return Err(ResolveError::MissingReference(track.id.clone()));
        }
        if !is_url_safe(reference) {
            return Err(ResolveError::Unavailable(format!(
                "track {} has an invalid stream reference",
                track.id
            )));
        }
        if !is_url_safe(device_id) {
            return Err(ResolveError::Unavailable("invalid device id".to_string()));
        }

        let url = &self.base_url;
        if device_id.is_empty() {
            Ok(format!("{url}/tracks/{reference}/stream"))
        } else {
            Ok(format!("{url}/tracks/{reference}/stream?device={device_id}"))
        }
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }
}

/// unreserved url characters only, so the value needs no escaping anywhere downstream
fn is_url_safe(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
}
