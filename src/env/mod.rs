//! 环境层：模拟网页环境的协作接口（reset / step / close）与观察数据
//!
//! 环境本身（渲染、奖励、终止判断）在进程外；本 crate 只通过 Environment trait 消费它。

pub mod frame;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ScreenLimits};

pub use frame::{Frame, FrameError};
pub use http::HttpEnvironment;

/// 环境附带的额外信息，循环从不检查其内容
pub type Info = serde_json::Value;

/// 页面上的一个元素（结构化观察）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomElement {
    #[serde(rename = "ref")]
    pub element_ref: i64,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub tag: String,
    /// 人类可读的文本标签
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub classes: String,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl DomElement {
    pub fn new(element_ref: i64, tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            element_ref,
            parent: None,
            tag: tag.into(),
            text: text.into(),
            value: String::new(),
            id: String::new(),
            classes: String::new(),
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

/// 每步由环境提供的只读快照：任务描述 + 元素列表 + 可选画面帧
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 自然语言任务描述
    pub utterance: String,
    #[serde(default)]
    pub dom_elements: Vec<DomElement>,
    #[serde(default)]
    pub screenshot: Option<Frame>,
}

/// step 的返回
#[derive(Debug, Clone, Deserialize)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    #[serde(default)]
    pub info: Info,
}

/// 环境协作接口；错误以字符串返回，由 EpisodeRunner 统一映射为 EnvironmentFailure
#[async_trait]
pub trait Environment: Send {
    /// 重置环境；seed 只在首次重置时提供
    async fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, Info), String>;

    async fn step(&mut self, action: &Action) -> Result<StepOutcome, String>;

    /// 释放环境资源；EpisodeRunner 保证每次 run 恰好调用一次
    async fn close(&mut self) -> Result<(), String>;

    /// 屏幕尺寸（未知时为 None）
    fn limits(&self) -> Option<ScreenLimits>;
}
