//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `WEBPILOT__*` 覆盖（双下划线表示嵌套，如 `WEBPILOT__AGENT__MODE=image`）。
//! 预言机密钥只从进程环境变量（GEMINI_API_KEY / OPENAI_API_KEY）读取，不进入配置结构。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::decision::{ObservationMode, ParseFailurePolicy};
use crate::episode::RunnerConfig;
use crate::llm::RetryConfig;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub env: EnvSection,
    pub agent: AgentSection,
}

/// [llm] 段：后端选择、超时与重试
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：gemini / openai / mock
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeouts: LlmTimeoutsSection,
    pub retry: LlmRetrySection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            base_url: None,
            timeouts: LlmTimeoutsSection::default(),
            retry: LlmRetrySection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    /// 单次请求超时（秒）
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmRetrySection {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for LlmRetrySection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8000,
        }
    }
}

/// [env] 段：环境桥接地址与环境选择
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvSection {
    pub base_url: String,
    pub env_id: String,
    pub request_timeout_secs: u64,
}

impl Default for EnvSection {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8765".to_string(),
            env_id: "miniwob/click-test-2-v1".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// 决策者种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// 由预言机决策
    #[default]
    Oracle,
    /// 规则：点击文本等于 target_text 的元素
    TargetText,
}

/// [agent] 段：决策模式、解析失败策略、历史上限、步数预算
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    pub kind: AgentKind,
    pub target_text: String,
    pub mode: ObservationMode,
    /// 未设置时按 mode 取默认（text -> abort，image -> no_op）
    pub on_parse_failure: Option<ParseFailurePolicy>,
    /// 0 表示不限
    pub history_limit: usize,
    pub max_steps: u64,
    pub seed: Option<u64>,
    pub reset_on_truncated: bool,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            kind: AgentKind::Oracle,
            target_text: "ONE".to_string(),
            mode: ObservationMode::Text,
            on_parse_failure: None,
            history_limit: 20,
            max_steps: 100,
            seed: Some(41),
            reset_on_truncated: true,
        }
    }
}

impl AgentSection {
    pub fn parse_failure_policy(&self) -> ParseFailurePolicy {
        self.on_parse_failure
            .unwrap_or_else(|| self.mode.default_parse_failure_policy())
    }
}

impl AppConfig {
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            max_steps: self.agent.max_steps,
            seed: self.agent.seed,
            history_limit: self.agent.history_limit,
            reset_on_truncated: self.agent.reset_on_truncated,
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.llm.retry.max_attempts,
            initial_backoff: Duration::from_millis(self.llm.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.llm.retry.max_backoff_ms),
            request_timeout: Duration::from_secs(self.llm.timeouts.request),
        }
    }
}

/// 从 config 目录加载配置，环境变量 WEBPILOT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 WEBPILOT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("WEBPILOT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
