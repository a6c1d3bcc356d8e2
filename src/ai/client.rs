//! AI gateway client
//!
//! Calls a hosted chat-completion gateway with a fixed structure-analysis
//! prompt and parses the model's reply into an [`Analysis`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::{AiError, Analysis, HierarchyProvider};
use crate::config::AiConfig;
use crate::hierarchy::{fallback_result, HierarchyNode, Statistics};

/// System instruction describing the structure-detection heuristics.
pub const SYSTEM_PROMPT: &str = r#"You are an expert document structure analyzer. Your task is to analyze document text and extract its hierarchical structure.

RULES:
1. Identify headings, subheadings, sections, paragraphs, lists, and tables
2. Determine the logical nesting level (1 = main heading, 2 = subheading, 3+ = nested content)
3. Preserve the reading order
4. Assign unique IDs to each node
5. Group related content under appropriate parent headings

OUTPUT FORMAT:
Return ONLY valid JSON with this structure:
{
  "title": "Document Title",
  "hierarchy": [
    {
      "id": "h1_1",
      "level": 1,
      "type": "heading",
      "text": "Main Heading",
      "children": [
        {
          "id": "p1_1",
          "level": 2,
          "type": "paragraph",
          "text": "Content under heading...",
          "children": [],
          "metadata": { "confidence": 0.95 }
        }
      ],
      "metadata": { "confidence": 0.98, "style": "title" }
    }
  ],
  "statistics": {
    "totalNodes": 0,
    "headings": 0,
    "paragraphs": 0,
    "maxDepth": 0
  }
}

DETECTION PATTERNS:
- ALL CAPS or Title Case at line start = likely heading
- Numbered sections (1., 1.1, a., i.) = structured headings
- Bullet points or dashes = list items
- Short standalone lines = potential headings
- Long text blocks = paragraphs
- Tabular data with consistent spacing = tables"#;

/// Chat-completion API request format
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completion API response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Lenient shape for the model's JSON reply
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    hierarchy: Vec<HierarchyNode>,
    #[serde(default)]
    statistics: Option<Statistics>,
    #[serde(default)]
    parse_warning: Option<String>,
}

/// Production hierarchy provider backed by a chat-completion gateway.
pub struct GatewayClient {
    config: AiConfig,
    client: Client,
}

impl GatewayClient {
    pub fn new(config: AiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Truncate text to the configured cap, counted in characters.
    fn truncate_content<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.config.max_prompt_chars) {
            Some((end, _)) => &text[..end],
            None => text,
        }
    }
}

#[async_trait]
impl HierarchyProvider for GatewayClient {
    async fn analyze(&self, text_content: &str, page_breaks: &[usize]) -> Result<Analysis, AiError> {
        let api_key = match &self.config.api_key {
            Some(key) if !key.is_empty() => key,
            _ => {
                error!("AI gateway API key not configured");
                return Err(AiError::NotConfigured);
            }
        };

        debug!(
            "Analyzing document: {} bytes, {} page breaks",
            text_content.len(),
            page_breaks.len()
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Analyze this document and extract its hierarchical structure:\n\n{}",
                        self.truncate_content(text_content)
                    ),
                },
            ],
            temperature: self.config.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.config.gateway_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("AI gateway error {}: {}", status, body);
            return match status.as_u16() {
                429 => Err(AiError::RateLimited),
                402 => Err(AiError::QuotaExhausted),
                code => Err(AiError::Gateway { status: code }),
            };
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Connection(e.to_string()))?;

        let reply = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(AiError::EmptyResponse)?;

        debug!("AI reply received, length: {}", reply.len());
        Ok(Analysis::from_model_reply(&reply, text_content))
    }
}

impl Analysis {
    /// Parse a model reply into an [`Analysis`].
    ///
    /// Replies wrapped in a fenced code block are unwrapped first.
    /// Unparsable replies degrade to the two-node fallback stub with a
    /// parse warning; statistics of parsed replies are recomputed from the
    /// tree rather than trusted.
    pub fn from_model_reply(reply: &str, source_text: &str) -> Analysis {
        let json = strip_code_fence(reply);

        let raw: RawAnalysis = match serde_json::from_str(json) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("AI reply was not valid JSON ({}), returning fallback structure", e);
                let stub = fallback_result(source_text);
                return Analysis {
                    title: Some(stub.title),
                    hierarchy: stub.hierarchy,
                    statistics: stub.statistics,
                    parse_warning: stub.parse_warning,
                };
            }
        };

        let statistics = Statistics::from_nodes(&raw.hierarchy);
        if let Some(reported) = &raw.statistics {
            if *reported != statistics {
                debug!(
                    "Model-reported statistics disagree with traversal: {:?} vs {:?}",
                    reported, statistics
                );
            }
        }

        Analysis {
            title: raw.title,
            hierarchy: raw.hierarchy,
            statistics,
            parse_warning: raw.parse_warning,
        }
    }
}

/// Unwrap an optional ```json fenced code block around the reply.
fn strip_code_fence(reply: &str) -> &str {
    let Some(start) = reply.find("```") else {
        return reply;
    };
    let inner = &reply[start + 3..];
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    match inner.find("```") {
        Some(end) => inner[..end].trim(),
        None => reply,
    }
}
