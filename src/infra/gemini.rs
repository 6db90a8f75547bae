use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::workflows::applicants::enrichment::{CompletionClient, CompletionError};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// [`CompletionClient`] over the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

impl CompletionClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(format!("{GEMINI_API_URL}/{}:generateContent", self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .map_err(|err| CompletionError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(CompletionError::Service {
                status: status.as_u16(),
                detail,
            });
        }

        let payload: GenerateResponse = response
            .json()
            .map_err(|err| CompletionError::Transport(err.to_string()))?;

        let text = payload
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}
