//! 决策层：观察 + 历史 -> 提示词 -> 预言机 -> 解析为动作
//!
//! 文本模式与视觉模式共用同一个 DecisionEngine，只在提示词的观察段与是否附带画面帧上不同；
//! 解析失败的处理由 ParseFailurePolicy 显式配置，而不是按模式写死。

pub mod engine;
pub mod history;
pub mod prompt;
pub mod target_text;

use async_trait::async_trait;
use serde::Deserialize;

use crate::action::{Action, ScreenLimits};
use crate::core::{AgentError, DecisionError};
use crate::env::Observation;

pub use engine::DecisionEngine;
pub use history::History;
pub use prompt::PromptBuilder;
pub use target_text::TargetTextAgent;

/// 提示词中嵌入哪种观察材料
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationMode {
    /// 结构化元素列表
    #[default]
    Text,
    /// 渲染画面帧（随提示词一起发送给模型）
    Image,
}

impl ObservationMode {
    /// 未显式配置时的解析失败策略：文本模式终止，视觉模式降级为 NONE
    pub fn default_parse_failure_policy(&self) -> ParseFailurePolicy {
        match self {
            ObservationMode::Text => ParseFailurePolicy::Abort,
            ObservationMode::Image => ParseFailurePolicy::NoOp,
        }
    }
}

/// 模型回复无法解析时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailurePolicy {
    /// 作为致命错误终止循环
    Abort,
    /// 本步降级为 NONE，循环继续
    NoOp,
}

/// 一次决策的结果：动作 + 原始回复（由调用方写入 History）
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub raw_reply: String,
    /// 若本步因解析失败降级为 NONE，记录原因
    pub fallback: Option<DecisionError>,
}

/// 决策者：EpisodeRunner 只依赖此 trait
#[async_trait]
pub trait Agent: Send + Sync {
    async fn decide(
        &self,
        observation: &Observation,
        history: &History,
        limits: Option<ScreenLimits>,
    ) -> Result<Decision, AgentError>;
}
