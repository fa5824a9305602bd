/// The backend origin used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Builder for [`HttpConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpConfigBuilder {
    base_url: Option<String>,
}

impl HttpConfigBuilder {
    /// Creates a builder with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpConfig {
        let base_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        HttpConfig {
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
        }
    }
}

/// Configuration for the HTTP transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpConfig {
    pub(crate) base_url: String,
}

impl HttpConfig {
    /// Returns the backend origin, without a trailing slash.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfigBuilder::new().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(HttpConfig::default().base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            HttpConfigBuilder::new()
                .with_base_url("https://chat.example.com/api/")
                .build()
                .endpoint("/chat"),
            "https://chat.example.com/api/chat"
        );
        assert_eq!(
            HttpConfigBuilder::new().with_base_url("  ").build().base_url(),
            DEFAULT_BASE_URL
        );
    }
}
