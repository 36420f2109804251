pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod state;
pub mod tracker;
pub mod transport;

pub use config::FetchConfig;
pub use error::{FetchError, Result};
pub use models::{GeneratedImage, ImageGenerationRequest, ImageGenerationResponse, PromptBody};
pub use state::{RequestState, TrackerSnapshot};
pub use tracker::FetchTracker;
pub use transport::{HttpTransport, Transport, TransportResponse};
