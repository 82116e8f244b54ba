//! Session runtime configuration.
//!
//! [`SessionConfig`] carries the tunables the session core needs at
//! construction time: pipeline timeouts, the accepted media-type allow-list,
//! and the event hub buffer capacity. Values come from [`Default`], builder
//! methods, or environment variables via [`SessionConfig::from_env`].

use std::time::Duration;

/// Tunables for one session manager instance.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use docweave::config::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_ingest_timeout(Duration::from_secs(10))
///     .with_accepted_media_types(["application/pdf", "text/markdown"]);
///
/// assert!(config.accepts("application/pdf"));
/// assert!(config.accepts("TEXT/MARKDOWN"));
/// assert!(!config.accepts("image/png"));
/// ```
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Upper bound on one Ingestor call.
    pub ingest_timeout: Duration,
    /// Upper bound on one Answerer call.
    pub answer_timeout: Duration,
    /// Media types accepted for upload, compared case-insensitively.
    pub accepted_media_types: Vec<String>,
    /// Broadcast buffer capacity of the session event hub.
    pub event_buffer_capacity: usize,
}

impl SessionConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 1024;
    /// The reference system accepts exactly one format family.
    pub const DEFAULT_MEDIA_TYPE: &'static str = "application/pdf";

    /// Resolve configuration from the environment, falling back to defaults
    /// for anything unset or unparsable.
    ///
    /// Recognized variables (a `.env` file is honored if present):
    /// - `DOCWEAVE_INGEST_TIMEOUT_MS`
    /// - `DOCWEAVE_ANSWER_TIMEOUT_MS`
    /// - `DOCWEAVE_ACCEPTED_MEDIA_TYPES` (comma-separated)
    /// - `DOCWEAVE_EVENT_BUFFER`
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Some(ms) = env_u64("DOCWEAVE_INGEST_TIMEOUT_MS") {
            config.ingest_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("DOCWEAVE_ANSWER_TIMEOUT_MS") {
            config.answer_timeout = Duration::from_millis(ms);
        }
        if let Ok(types) = std::env::var("DOCWEAVE_ACCEPTED_MEDIA_TYPES") {
            let parsed: Vec<String> = types
                .split(',')
                .map(|entry| entry.trim().to_ascii_lowercase())
                .filter(|entry| !entry.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.accepted_media_types = parsed;
            }
        }
        if let Some(capacity) = env_u64("DOCWEAVE_EVENT_BUFFER") {
            config.event_buffer_capacity = capacity.max(1) as usize;
        }
        config
    }

    #[must_use]
    pub fn with_ingest_timeout(mut self, timeout: Duration) -> Self {
        self.ingest_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_answer_timeout(mut self, timeout: Duration) -> Self {
        self.answer_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_accepted_media_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_media_types = types
            .into_iter()
            .map(|entry| entry.into().to_ascii_lowercase())
            .collect();
        self
    }

    #[must_use]
    pub fn with_event_buffer_capacity(mut self, capacity: usize) -> Self {
        self.event_buffer_capacity = capacity.max(1);
        self
    }

    /// Returns `true` if the declared media type is on the allow-list.
    #[must_use]
    pub fn accepts(&self, media_type: &str) -> bool {
        self.accepted_media_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(media_type.trim()))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ingest_timeout: Self::DEFAULT_TIMEOUT,
            answer_timeout: Self::DEFAULT_TIMEOUT,
            accepted_media_types: vec![Self::DEFAULT_MEDIA_TYPE.to_string()],
            event_buffer_capacity: Self::DEFAULT_EVENT_BUFFER_CAPACITY,
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.trim().parse().ok()
}
