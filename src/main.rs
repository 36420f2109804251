use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::StreamExt;
use genfetch::{
    logger::{self, LogLevel, LoggerConfig},
    FetchConfig, FetchTracker, ImageGenerationRequest, RequestState,
};
use serde_json::Value;
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let level = env::var("RUST_LOG")
        .ok()
        .and_then(|name| LogLevel::parse(&name))
        .unwrap_or(LogLevel::Info);
    logger::init_with_config(LoggerConfig::development().with_level(level))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let prompts: Vec<String> = env::args().skip(1).collect();
    if prompts.is_empty() {
        eprintln!("usage: genfetch <prompt> [<prompt>...]");
        return Ok(());
    }

    let config = FetchConfig::from_env();
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Base URL: {}", config.base_url.as_deref().unwrap_or("<none>"));
    log::info!("   Endpoint: {}", config.endpoint);
    log::info!("   Image URL field: {}", config.image_url_field);

    // Loose JSON responses: any shape the server sends back is kept.
    let tracker: FetchTracker<Value, ImageGenerationRequest> = FetchTracker::new(config)?;

    let mut updates = tracker.updates();
    let watcher = tokio::spawn(async move {
        while let Some(snapshot) = updates.next().await {
            match &snapshot.state {
                RequestState::Idle => {}
                RequestState::Loading => log::info!("🔄 Generating..."),
                RequestState::Succeeded(_) => log::info!(
                    "✅ {} image(s) generated so far",
                    snapshot.generated_images().len()
                ),
                RequestState::Failed(message) => log::error!("❌ {}", message),
            }
        }
    });

    for prompt in &prompts {
        log::info!("🎨 Prompt: {}", prompt);
        tracker.fetch(&ImageGenerationRequest::new(prompt.as_str())).await;
    }

    let images = tracker.generated_images();
    println!("{}", serde_json::to_string_pretty(&images)?);

    for (n, image) in images.iter().enumerate() {
        let Some((extension, bytes)) = image.image_url.as_deref().and_then(decode_data_url) else {
            continue;
        };
        let filename = format!(
            "generated_image_{}_{}.{}",
            n + 1,
            chrono::Utc::now().timestamp(),
            extension
        );
        match fs::write(&filename, bytes) {
            Ok(_) => log::info!("💾 Image saved to: {}", filename),
            Err(e) => log::error!("❌ Failed to save image: {}", e),
        }
    }

    drop(tracker);
    if let Err(e) = watcher.await {
        log::error!("❌ State watcher stopped abnormally: {}", e);
    }

    Ok(())
}

/// Splits a `data:image/<type>;base64,<payload>` URL into a file extension
/// and the decoded bytes. The extension is the subtype without any `+suffix`
/// (`svg+xml` saves as `svg`). Anything else (plain URLs, bad base64) yields
/// `None`.
fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let (header, payload) = url.strip_prefix("data:")?.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let subtype = mime.strip_prefix("image/")?;
    let extension = match subtype.split('+').next() {
        Some("jpeg") => "jpg",
        Some(ext) if !ext.is_empty() => ext,
        _ => return None,
    };
    let bytes = STANDARD.decode(payload).ok()?;
    Some((extension.to_string(), bytes))
}
