use super::{Assistant, check_status, endpoint};
use crate::config::AssistantConfig;
use crate::error::GuardError;
use crate::types::assistant::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat,
};
use async_trait::async_trait;
use tracing::debug;

/// Chat-completion client for an OpenAI-compatible endpoint.
pub struct OpenAiAssistant {
    client: reqwest::Client,
    cfg: AssistantConfig,
}

impl OpenAiAssistant {
    pub fn new(client: reqwest::Client, cfg: &AssistantConfig) -> Self {
        Self {
            client,
            cfg: cfg.clone(),
        }
    }

    fn build_request<'a>(&'a self, issue: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.cfg.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.cfg.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: issue,
                },
            ],
            stream: false,
            response_format: ResponseFormat { kind: "text" },
            temperature: self.cfg.temperature,
            top_p: self.cfg.top_p,
        }
    }
}

#[async_trait]
impl Assistant for OpenAiAssistant {
    async fn suggest(&self, issue: &str) -> Result<String, GuardError> {
        let api_key = self
            .cfg
            .api_key
            .as_deref()
            .ok_or(GuardError::AssistantUnavailable)?;
        let url = endpoint(&self.cfg.base_url, "chat/completions")?;

        let resp = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&self.build_request(issue))
            .send()
            .await?;
        let completion: ChatCompletionResponse = check_status(resp)?.json().await?;
        debug!(
            model = %self.cfg.model,
            choices = completion.choices.len(),
            "assistant completion received"
        );
        Ok(completion.into_suggestion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_system_and_user_messages() {
        let assistant = OpenAiAssistant::new(reqwest::Client::new(), &AssistantConfig::default());
        let body = serde_json::to_value(assistant.build_request("table logs has no RLS")).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["stream"], false);
        assert_eq!(body["response_format"]["type"], "text");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "table logs has no RLS");
    }

    #[tokio::test]
    async fn missing_api_key_is_unavailable() {
        let assistant = OpenAiAssistant::new(reqwest::Client::new(), &AssistantConfig::default());
        assert!(matches!(
            assistant.suggest("anything").await,
            Err(GuardError::AssistantUnavailable)
        ));
    }
}
