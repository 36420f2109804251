use crate::{
    config::FetchConfig,
    error::{FetchError, Result},
    models::{extract_image_url, GeneratedImage, PromptBody},
    state::{RequestState, StateCell, TrackerSnapshot},
    transport::{HttpTransport, Transport},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::time::Instant;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

/// Issues prompt requests and keeps their outcome observable.
///
/// `T` is the decoded response shape and `R` the request body. Calls may
/// overlap; nothing serializes them, so whichever settles last decides
/// `response_data` and `error`, while every success still appends its image.
pub struct FetchTracker<T, R, X = HttpTransport> {
    transport: X,
    config: FetchConfig,
    state: StateCell<T>,
    _request: PhantomData<fn(&R)>,
}

impl<T, R> FetchTracker<T, R, HttpTransport>
where
    T: DeserializeOwned + Clone,
    R: PromptBody,
{
    pub fn new(config: FetchConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T, R, X> FetchTracker<T, R, X>
where
    T: DeserializeOwned + Clone,
    R: PromptBody,
    X: Transport,
{
    pub fn with_transport(transport: X, config: FetchConfig) -> Self {
        Self {
            transport,
            config,
            state: StateCell::new(),
            _request: PhantomData,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// POSTs `body` as JSON to `endpoint` and records the outcome.
    ///
    /// Never fails from the caller's point of view: errors land in
    /// [`FetchTracker::error`], and on success the parsed response becomes
    /// `response_data` and one [`GeneratedImage`] is appended.
    pub async fn fetch_data(&self, endpoint: &str, body: &R) {
        let request_id = Uuid::new_v4();
        let url = self.config.resolve(endpoint);
        let guard = self.state.begin();

        log::debug!("[{}] POST {} (prompt: {:?})", request_id, url, body.prompt());
        let started = Instant::now();

        match self.execute(&url, body).await {
            Ok((data, image)) => {
                log::info!(
                    "[{}] settled in {}ms, image: {}",
                    request_id,
                    started.elapsed().as_millis(),
                    image.image_url.as_deref().unwrap_or("<none>")
                );
                guard.succeed(data, image);
            }
            Err(e) => {
                log::warn!(
                    "[{}] failed after {}ms: {}",
                    request_id,
                    started.elapsed().as_millis(),
                    e
                );
                guard.fail(e.to_string());
            }
        }
    }

    /// [`FetchTracker::fetch_data`] against the configured endpoint.
    pub async fn fetch(&self, body: &R) {
        let endpoint = self.config.endpoint.clone();
        self.fetch_data(&endpoint, body).await
    }

    async fn execute(&self, url: &str, body: &R) -> Result<(T, GeneratedImage)> {
        let payload =
            serde_json::to_string(body).map_err(|e| FetchError::Serialization(e.to_string()))?;

        let response = self.transport.post_json(url, payload).await?;
        if !response.is_success() {
            return Err(FetchError::status(response.status, response.body));
        }

        let value: Value =
            serde_json::from_str(&response.body).map_err(|e| FetchError::Decode(e.to_string()))?;
        let image_url = extract_image_url(&value, &self.config.image_url_field);
        let data: T =
            serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok((data, GeneratedImage::new(image_url, body.prompt())))
    }

    pub fn snapshot(&self) -> TrackerSnapshot<T> {
        self.state.snapshot()
    }

    pub fn state(&self) -> RequestState<T> {
        self.state.read(|s| s.state.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state.read(|s| s.is_loading())
    }

    pub fn response_data(&self) -> Option<T> {
        self.state.read(|s| s.response_data.clone())
    }

    pub fn error(&self) -> Option<String> {
        self.state.read(|s| s.error().map(str::to_string))
    }

    pub fn generated_images(&self) -> Vec<GeneratedImage> {
        self.state.read(|s| s.generated_images.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot<T>> {
        self.state.subscribe()
    }

    /// Yields the current snapshot, then one per change. Changes that land
    /// between polls are coalesced into the latest.
    pub fn updates(&self) -> WatchStream<TrackerSnapshot<T>>
    where
        T: Send + Sync + 'static,
    {
        WatchStream::new(self.state.subscribe())
    }
}
