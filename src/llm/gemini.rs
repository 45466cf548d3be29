//! Gemini API 客户端（OpenAI 兼容格式）
//!
//! Gemini 提供 OpenAI 兼容端点。
//! - Base URL: https://generativelanguage.googleapis.com/v1beta/openai/
//! - 模型: gemini-2.0-flash（同时支持文本与图像输入）

use crate::llm::OpenAiOracle;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const GEMINI_FLASH: &str = "gemini-2.0-flash";
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// 创建 Gemini 客户端；未设置 `GEMINI_API_KEY` 时返回 None
///
/// 模型优先取 `model` 参数，其次 `GEMINI_MODEL` 环境变量，最后 gemini-2.0-flash
pub fn create_gemini_oracle(model: Option<&str>) -> Option<OpenAiOracle> {
    let api_key = std::env::var(GEMINI_API_KEY_VAR).ok()?;

    let model = model
        .map(String::from)
        .or_else(|| std::env::var("GEMINI_MODEL").ok())
        .unwrap_or_else(|| GEMINI_FLASH.to_string());

    Some(OpenAiOracle::new(Some(GEMINI_BASE_URL), &model, &api_key))
}
