use std::env;

pub const DEFAULT_ENDPOINT: &str = "/api/generate";
pub const DEFAULT_IMAGE_URL_FIELD: &str = "imageUrl";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: Option<String>,
    pub endpoint: String,
    pub image_url_field: String,
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            base_url: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            image_url_field: DEFAULT_IMAGE_URL_FIELD.to_string(),
            user_agent: None,
        }
    }
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to defaults for
    /// missing or blank values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        FetchConfig {
            base_url: read("GENFETCH_BASE_URL"),
            endpoint: read("GENFETCH_ENDPOINT").unwrap_or(defaults.endpoint),
            image_url_field: read("GENFETCH_IMAGE_URL_FIELD").unwrap_or(defaults.image_url_field),
            user_agent: read("GENFETCH_USER_AGENT"),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_image_url_field(mut self, field: impl Into<String>) -> Self {
        self.image_url_field = field.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Absolute URLs pass through; relative paths are joined onto
    /// `base_url` when one is configured.
    pub fn resolve(&self, endpoint: &str) -> String {
        if is_absolute(endpoint) {
            return endpoint.to_string();
        }
        match &self.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            ),
            None => endpoint.to_string(),
        }
    }
}

fn is_absolute(endpoint: &str) -> bool {
    endpoint.starts_with("http://") || endpoint.starts_with("https://")
}
