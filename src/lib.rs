//! WebPilot - 网页环境逐步交互智能体
//!
//! 模块划分：
//! - **action**: 动作词表与模型回复解析
//! - **agent**: 按配置装配预言机与决策者
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、错误恢复、外部中断
//! - **decision**: 提示词构建、决策引擎、决策历史、规则型决策者
//! - **env**: 环境协作接口、观察数据、HTTP 桥接
//! - **episode**: 回合主循环与计数器、过程事件
//! - **llm**: 预言机抽象与实现（OpenAI 兼容 / Gemini / Mock）及超时重试
//! - **observability**: 日志初始化

pub mod action;
pub mod agent;
pub mod config;
pub mod core;
pub mod decision;
pub mod env;
pub mod episode;
pub mod llm;
pub mod observability;

pub use action::{parse_action, Action, ActionKind, ScreenLimits};
pub use episode::{EpisodeRunner, RunSummary};
