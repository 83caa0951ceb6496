use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ModelAnalyzer;
use crate::error::{CollabResult, CollaboratorError};
use crate::extract::suggested::AnalysisOutput;
use crate::model::ScopeHint;
use crate::text::clip;

/// Page text sent to the model is cut to this many characters.
pub const MAX_PROMPT_CHARS: usize = 8000;

const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.1;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion endpoint.
pub struct ChatAnalyzer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatAnalyzer {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Duration) -> CollabResult<Self> {
        if api_key.trim().is_empty() {
            return Err(CollaboratorError::MissingKey("llm_api_key"));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(ChatAnalyzer {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ModelAnalyzer for ChatAnalyzer {
    async fn analyze(
        &self,
        page_text: &str,
        company: &str,
        scope: Option<&ScopeHint>,
    ) -> CollabResult<AnalysisOutput> {
        let prompt = build_prompt(page_text, company, scope);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(company, prompt_chars = prompt.len(), "sending analysis request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body: ChatResponse = response.json().await?;
        let reply = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CollaboratorError::Provider("empty completion".to_string()))?;

        let output = AnalysisOutput::from_reply(&reply);
        if let AnalysisOutput::Structured(list) = &output {
            info!(company, executives = list.len(), "model analysis parsed");
        }
        Ok(output)
    }
}

/// Global-leadership prompt for a global-only hint, comprehensive otherwise.
pub fn build_prompt(page_text: &str, company: &str, scope: Option<&ScopeHint>) -> String {
    let content = clip(page_text, MAX_PROMPT_CHARS);
    match scope {
        Some(hint) if hint.is_global_only() => format!(
            r#"Analyze the following webpage content from {company} and extract GLOBAL CORPORATE LEADERS and C-suite executives.

Rules:
1. Extract only global corporate leaders and C-suite executives, not regional managers.
2. Highest priority: CEO, CFO, CTO, COO, President, Chairman, Vice Chairman.
3. Also: CIO, CMO, CHRO, CLO, CSO, CDO, CRO, CPO, CCO, CAO, Founder, Co-Founder, EVP, SVP.
4. Exclude titles scoped to a region such as "President, Canada" or "VP, Europe" unless the role is also global.
5. Return only real people you are confident about.

Content to analyze:
{content}

Reply with JSON in exactly this shape:
{{"executives": [{{"name": "Full Name", "title": "Complete Corporate Title", "scope": "Global/Corporate", "confidence": "High/Medium/Low"}}]}}"#
        ),
        _ => {
            let region = match scope {
                Some(ScopeHint::Region(r)) => format!(" The company is based in {}.", r),
                _ => String::new(),
            };
            format!(
                r#"Analyze the following webpage content from {company} and extract ALL C-level executives and senior leadership.{region}

Rules:
1. Extract only real people with actual names, not generic titles.
2. Focus on C-level roles: CEO, CFO, CTO, COO, CIO, CMO, CHRO, CLO, CSO, CDO, CRO, CPO, CCO, CAO.
3. Also include President, Chairman, Vice Chairman, Founder, Co-Founder, Managing Director, Executive Director, EVP, SVP.
4. Include location or region when mentioned, e.g. "President, North America".
5. Return only executives you are confident about.

Content to analyze:
{content}

Reply with JSON in exactly this shape:
{{"executives": [{{"name": "Full Name", "title": "Complete Title", "location": "Region if mentioned", "confidence": "High/Medium/Low"}}]}}"#
            )
        }
    }
}
