use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request body the tracker can send: anything serializable that carries
/// the prompt the image was generated from.
pub trait PromptBody: Serialize {
    fn prompt(&self) -> &str;
}

/// Loose JSON bodies are accepted as-is; a missing `prompt` reads as empty.
impl PromptBody for Value {
    fn prompt(&self) -> &str {
        self.get("prompt").and_then(Value::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_images: Option<u32>,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            width: None,
            height: None,
            num_images: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_num_images(mut self, num_images: u32) -> Self {
        self.num_images = Some(num_images);
        self
    }
}

impl PromptBody for ImageGenerationRequest {
    fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// One successfully generated image, in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub image_url: Option<String>,
    pub prompt: String,
}

impl GeneratedImage {
    pub fn new(image_url: Option<String>, prompt: impl Into<String>) -> Self {
        Self {
            image_url,
            prompt: prompt.into(),
        }
    }
}

/// Reads `field` off a decoded response without assuming its shape.
/// Anything other than a string value yields `None`.
pub fn extract_image_url(response: &Value, field: &str) -> Option<String> {
    response
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_camel_case_and_skips_unset_fields() {
        let request = ImageGenerationRequest::new("cat").with_num_images(2);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({ "prompt": "cat", "numImages": 2 }));
    }

    #[test]
    fn json_body_prompt() {
        assert_eq!(json!({ "prompt": "dog", "style": "ink" }).prompt(), "dog");
        assert_eq!(json!({ "style": "ink" }).prompt(), "");
        assert_eq!(json!({ "prompt": 7 }).prompt(), "");
    }

    #[test]
    fn image_url_extraction_is_unchecked_but_safe() {
        let response = json!({ "imageUrl": "http://x/1.png", "count": 1 });
        assert_eq!(
            extract_image_url(&response, "imageUrl").as_deref(),
            Some("http://x/1.png")
        );
        assert_eq!(extract_image_url(&response, "count"), None);
        assert_eq!(extract_image_url(&response, "missing"), None);
        assert_eq!(extract_image_url(&json!(["http://x/1.png"]), "imageUrl"), None);
    }

    #[test]
    fn generated_image_uses_camel_case_keys() {
        let record = GeneratedImage::new(Some("http://x/1.png".into()), "cat");
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({ "imageUrl": "http://x/1.png", "prompt": "cat" })
        );
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let response: ImageGenerationResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.image_url, None);
        assert_eq!(response.model, None);
    }
}
