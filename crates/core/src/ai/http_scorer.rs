use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{SEMANTIC_SCORER_TIMEOUT_SECS, SEMANTIC_SCORE_CAP};
use crate::matching::{SemanticError, SemanticRequest, SemanticScore, SemanticScorer};

/// Connection settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct HttpScorerConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// The verdict the model is instructed to return as raw JSON.
#[derive(Debug, Deserialize)]
struct Verdict {
    score: u8,
    reasoning: String,
}

const SYSTEM_PROMPT: &str = "You rate how related a financial transaction is to a savings goal. \
Respond with ONLY a JSON object: {\"score\": <integer 0-10>, \"reasoning\": \"<one sentence>\"}. \
10 means the transaction clearly funds the goal, 0 means unrelated.";

/// Semantic scorer backed by an OpenAI-compatible chat endpoint. Every
/// call is bounded by a hard timeout; callers treat any error as a zero
/// sub-score, so nothing here retries.
pub struct HttpSemanticScorer {
    config: HttpScorerConfig,
    http_client: Client,
}

impl HttpSemanticScorer {
    pub fn new(config: HttpScorerConfig) -> Self {
        HttpSemanticScorer {
            config,
            http_client: Client::new(),
        }
    }

    fn build_prompt(request: &SemanticRequest) -> String {
        let goal_description = request.goal_description.as_deref().unwrap_or("none");
        format!(
            "Transaction: \"{}\" (type: {}, amount: {})\nGoal: \"{}\" (type: {}, description: {})",
            request.transaction_description,
            request.transaction_type.as_str(),
            request.transaction_amount,
            request.goal_name,
            request.goal_type.as_str(),
            goal_description,
        )
    }

    async fn call(&self, request: &SemanticRequest) -> Result<SemanticScore, SemanticError> {
        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_prompt(request),
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SemanticError::Provider(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SemanticError::Provider(format!(
                "provider returned status {}",
                response.status()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| SemanticError::MalformedResponse(format!("invalid body: {}", e)))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.trim())
            .ok_or_else(|| SemanticError::MalformedResponse("empty choices".to_string()))?;

        let verdict: Verdict = serde_json::from_str(content).map_err(|e| {
            SemanticError::MalformedResponse(format!("not a verdict object: {}", e))
        })?;

        debug!(
            "Semantic verdict for '{}' vs '{}': {} ({})",
            request.transaction_description, request.goal_name, verdict.score, verdict.reasoning
        );

        Ok(SemanticScore {
            score: (verdict.score as u32).min(SEMANTIC_SCORE_CAP) as u8,
            reasoning: verdict.reasoning,
        })
    }
}

#[async_trait]
impl SemanticScorer for HttpSemanticScorer {
    async fn score(&self, request: &SemanticRequest) -> Result<SemanticScore, SemanticError> {
        tokio::time::timeout(
            Duration::from_secs(SEMANTIC_SCORER_TIMEOUT_SECS),
            self.call(request),
        )
        .await
        .map_err(|_| SemanticError::Timeout)?
    }
}
