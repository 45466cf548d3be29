//! 预言机（语言 / 视觉语言模型）抽象
//!
//! 所有后端（OpenAI 兼容 / Gemini / Mock）实现 Oracle：generate(prompt, 可选画面帧) -> 文本。
//! 回复格式不作任何假设，格式约束全部由动作解析器负责。

use async_trait::async_trait;

use crate::env::Frame;

/// 预言机 trait：一次阻塞式生成
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn generate(&self, prompt: &str, image: Option<&Frame>) -> Result<String, String>;
}
