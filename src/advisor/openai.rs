// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ADVISOR OPENAI (chat completions)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{parse_ranges, AdvisorError, BoundaryAdvisor, LineRange};
use crate::config::AdvisorConfig;

const BOUNDARY_PROMPT: &str = r#"You split narration scripts into logical sections.
The user sends a script with every line prefixed by its 0-based line number ("12: text").
Return ONLY a JSON object in this exact format:
{"sections": [{"startLine": 0, "endLine": 14}, {"startLine": 15, "endLine": 40}]}
Rules: ranges are inclusive, sorted, do not overlap and only use line numbers that exist."#;

const TRANSLATE_PROMPT: &str = "You are a professional translator. Translate the user's text \
to the requested language, keeping line breaks. Respond with the translated text only.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
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
    #[serde(default)]
    content: Option<String>,
}

/// Advisor sobre uma API compatível com OpenAI
pub struct OpenAiAdvisor {
    client: reqwest::Client,
    api_key: String,
    config: AdvisorConfig,
}

impl OpenAiAdvisor {
    /// Cria o advisor; falha se não houver chave configurada
    pub fn new(config: AdvisorConfig) -> Result<Self, AdvisorError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AdvisorError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Texto com o número de cada linha (0-based) como prefixo
    fn numbered(text: &str) -> String {
        text.lines()
            .enumerate()
            .map(|(i, line)| format!("{}: {}", i, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn chat(&self, system: &str, user: String) -> Result<String, AdvisorError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("⚠️  Advisor retornou {}", status);
            return Err(AdvisorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;
        log::debug!("🤖 {} respondeu {}", self.config.model, status);

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AdvisorError::MalformedResponse("resposta sem conteúdo".into()))
    }
}

#[async_trait]
impl BoundaryAdvisor for OpenAiAdvisor {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn suggest_boundaries(&self, text: &str) -> Result<Vec<LineRange>, AdvisorError> {
        log::info!("🤖 Pedindo fronteiras de seção ({} linhas)", text.lines().count());
        let content = self.chat(BOUNDARY_PROMPT, Self::numbered(text)).await?;
        let ranges = parse_ranges(&content)?;
        log::info!("🤖 {} intervalos sugeridos", ranges.len());
        Ok(ranges)
    }

    async fn translate(&self, text: &str, language: &str) -> Result<String, AdvisorError> {
        log::info!("🌐 Traduzindo {} caracteres para {}", text.chars().count(), language);
        let user = format!("Target language: {}\n\n{}", language, text);
        let content = self.chat(TRANSLATE_PROMPT, user).await?;
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let err = OpenAiAdvisor::new(AdvisorConfig::default()).err();
        assert!(matches!(err, Some(AdvisorError::NotConfigured)));
    }

    #[test]
    fn test_endpoint_and_numbering() {
        let config = AdvisorConfig {
            api_key: Some("sk-test".into()),
            base_url: "http://localhost:9/v1/".into(),
            ..Default::default()
        };
        let advisor = OpenAiAdvisor::new(config).unwrap();

        assert_eq!(advisor.endpoint(), "http://localhost:9/v1/chat/completions");
        assert_eq!(OpenAiAdvisor::numbered("a\nb"), "0: a\n1: b");
    }

    #[tokio::test]
    async fn test_network_failure_is_reported() {
        let config = AdvisorConfig {
            api_key: Some("sk-test".into()),
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 2,
            ..Default::default()
        };
        let advisor = OpenAiAdvisor::new(config).unwrap();

        let err = advisor.suggest_boundaries("ATO I - A\ntexto").await.unwrap_err();
        assert!(matches!(err, AdvisorError::Network(_)));
    }
}
