//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；支持 Gemini、OpenAI、自建代理等。
//! 视觉模式下把画面帧编码为 PNG data URL，作为 image_url 内容片段随提示词一起发送。

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageUrlArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::env::Frame;
use crate::llm::Oracle;

/// OpenAI 兼容客户端：持有 Client 与 model 名，generate 时发送单条 user 消息并取首条 content
pub struct OpenAiOracle {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiOracle {
    /// api_key 由调用方从进程环境读取后传入，本结构不记录日志
    pub fn new(base_url: Option<&str>, model: &str, api_key: &str) -> Self {
        let config = match base_url {
            Some(url) => OpenAIConfig::new().with_api_base(url).with_api_key(api_key),
            None => OpenAIConfig::new().with_api_key(api_key),
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn user_message(
        &self,
        prompt: &str,
        image: Option<&Frame>,
    ) -> Result<ChatCompletionRequestMessage, String> {
        let mut builder = ChatCompletionRequestUserMessageArgs::default();
        match image {
            None => {
                builder.content(prompt.to_string());
            }
            Some(frame) => {
                let url = frame.to_png_data_url().map_err(|e| e.to_string())?;
                let parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
                    ChatCompletionRequestMessageContentPartTextArgs::default()
                        .text(prompt.to_string())
                        .build()
                        .map_err(|e| e.to_string())?
                        .into(),
                    ChatCompletionRequestMessageContentPartImageArgs::default()
                        .image_url(
                            ImageUrlArgs::default()
                                .url(url)
                                .build()
                                .map_err(|e| e.to_string())?,
                        )
                        .build()
                        .map_err(|e| e.to_string())?
                        .into(),
                ];
                builder.content(parts);
            }
        }
        let message = builder.build().map_err(|e| e.to_string())?;
        Ok(ChatCompletionRequestMessage::User(message))
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn generate(&self, prompt: &str, image: Option<&Frame>) -> Result<String, String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![self.user_message(prompt, image)?])
            .build()
            .map_err(|e| e.to_string())?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| e.to_string())?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Token usage"
            );
        }

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}
