use base64::Engine;
use color_eyre::eyre::{eyre, Context};
use cookbook::Vocabulary;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    state::{flag, ApiKey, Lookup},
    Result,
};

const DEFAULT_ANNOTATE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub use_mock: bool,
    pub api_key: Option<ApiKey>,
    pub annotate_url: String,
}

impl VisionConfig {
    pub(crate) fn from_lookup(lookup: Lookup) -> Self {
        Self {
            use_mock: flag(lookup, "USE_MOCK_VISION"),
            api_key: lookup("GOOGLE_CLOUD_VISION_API_KEY").map(ApiKey::new),
            annotate_url: DEFAULT_ANNOTATE_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn mock() -> Self {
        Self {
            use_mock: true,
            api_key: None,
            annotate_url: DEFAULT_ANNOTATE_URL.to_string(),
        }
    }
}

/// Turns a fridge photo into ingredient names.
///
/// Uses Google Cloud Vision when configured, and guesses from the file name
/// otherwise or whenever the API call fails.
#[derive(Debug, Clone)]
pub(crate) struct VisionGateway {
    config: VisionConfig,
    client: reqwest::Client,
}

impl VisionGateway {
    pub fn new(config: VisionConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    #[tracing::instrument(skip(self, vocabulary, image), fields(bytes = image.len()))]
    pub async fn recognize_ingredients(
        &self,
        vocabulary: &Vocabulary,
        filename: &str,
        image: &[u8],
    ) -> Vec<String> {
        if self.config.use_mock {
            return mock_recognize(vocabulary, filename);
        }

        let Some(api_key) = &self.config.api_key else {
            tracing::warn!("Google Cloud Vision API key not found, using mock data");
            return mock_recognize(vocabulary, filename);
        };

        match self.annotate(api_key, image).await {
            Ok(response) => ingredients_from_annotations(vocabulary, &response),
            Err(e) => {
                tracing::error!(error = ?e, "Error using Vision API");
                mock_recognize(vocabulary, filename)
            }
        }
    }

    async fn annotate(&self, api_key: &ApiKey, image: &[u8]) -> Result<AnnotateImageResponse> {
        let content = base64::engine::general_purpose::STANDARD.encode(image);
        let body = json!({
            "requests": [{
                "image": { "content": content },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": 20 },
                    { "type": "OBJECT_LOCALIZATION", "maxResults": 20 },
                ],
            }],
        });

        let response: BatchAnnotateImagesResponse = self
            .client
            .post(&self.config.annotate_url)
            .query(&[("key", api_key.expose())])
            .json(&body)
            .send()
            .await?
            .error_for_status()
            .wrap_err("Vision API returned an error status")?
            .json()
            .await
            .wrap_err("Vision API response wasn't the JSON we expected")?;

        let response = response
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| eyre!("Vision API returned no responses"))?;

        if let Some(error) = &response.error {
            return Err(eyre!("Vision API failed to annotate image: {}", error.message));
        }

        Ok(response)
    }
}

fn mock_recognize(vocabulary: &Vocabulary, filename: &str) -> Vec<String> {
    let mut rng = rand::thread_rng();

    vocabulary.guess_from_filename(filename, &mut rng)
}

/// Food-related labels first. Detected objects only count when no label
/// looked like food.
pub(crate) fn ingredients_from_annotations(
    vocabulary: &Vocabulary,
    response: &AnnotateImageResponse,
) -> Vec<String> {
    let mut labels = food_names(
        vocabulary,
        response
            .label_annotations
            .iter()
            .map(|l| l.description.as_str()),
    );
    if labels.is_empty() {
        labels = food_names(
            vocabulary,
            response
                .localized_object_annotations
                .iter()
                .map(|o| o.name.as_str()),
        );
    }

    vocabulary.ingredients_for_labels(labels.as_slice())
}

fn food_names<'a>(vocabulary: &Vocabulary, names: impl Iterator<Item = &'a str>) -> Vec<String> {
    names
        .filter(|name| vocabulary.is_food_related(name))
        .map(str::to_lowercase)
        .collect()
}

#[derive(Debug, Deserialize, Serialize)]
struct BatchAnnotateImagesResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    error: Option<AnnotateError>,
}

#[derive(Debug, Deserialize, Serialize)]
struct LabelAnnotation {
    description: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct LocalizedObjectAnnotation {
    name: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct AnnotateError {
    message: String,
}
