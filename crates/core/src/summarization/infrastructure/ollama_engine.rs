use std::time::Duration;

use serde_json::json;

use crate::summarization::domain::summarizer::SummaryEngine;

const MAX_ATTEMPTS: u32 = 3;
const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);
const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Summary engine backed by a local Ollama server.
pub struct OllamaEngine {
    api_url: String,
    tags_url: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl OllamaEngine {
    pub fn new(api_url: &str, tags_url: &str, model: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(GENERATE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            api_url: api_url.to_string(),
            tags_url: tags_url.to_string(),
            model: model.to_string(),
            client,
        }
    }

    /// Checks that the Ollama server is up. Used by setup validation.
    pub fn ping(&self) -> bool {
        let client = match reqwest::blocking::Client::builder()
            .timeout(PING_TIMEOUT)
            .build()
        {
            Ok(c) => c,
            Err(_) => return false,
        };
        match client.get(&self.tags_url).send() {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn request_payload(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.1,
                "top_p": 0.85,
                "num_predict": 1000
            }
        })
    }
}

impl SummaryEngine for OllamaEngine {
    fn generate(&self, prompt: &str) -> Option<String> {
        let payload = self.request_payload(prompt);

        for attempt in 1..=MAX_ATTEMPTS {
            log::info!("Calling Ollama (attempt {attempt}/{MAX_ATTEMPTS})");

            match self.client.post(&self.api_url).json(&payload).send() {
                Ok(resp) if resp.status().is_success() => {
                    match resp.json::<serde_json::Value>() {
                        Ok(body) => {
                            if let Some(text) = extract_response(&body) {
                                return Some(text);
                            }
                            log::warn!("Ollama response missing 'response' field");
                        }
                        Err(e) => log::warn!("Malformed Ollama response: {e}"),
                    }
                }
                Ok(resp) => log::warn!("Ollama returned status {}", resp.status()),
                Err(e) if e.is_timeout() => log::warn!("Ollama request timed out"),
                Err(e) => log::error!("Ollama error: {e}"),
            }

            if attempt < MAX_ATTEMPTS {
                log::info!("Retrying...");
            }
        }

        None
    }
}

fn extract_response(body: &serde_json::Value) -> Option<String> {
    body.get("response")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
