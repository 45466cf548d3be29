//! 组件装配：按配置创建预言机与决策者
//!
//! create_oracle_from_config 根据 provider 与进程环境中的 API Key 选择后端，缺少密钥时回退到 Mock；
//! create_agent_from_config 返回 EpisodeRunner 使用的决策者。

use std::sync::Arc;

use crate::config::{AgentKind, AppConfig};
use crate::decision::{Agent, DecisionEngine, TargetTextAgent};
use crate::llm::{create_gemini_oracle, MockOracle, OpenAiOracle, Oracle, RetryingOracle};

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

pub fn create_oracle_from_config(cfg: &AppConfig) -> Arc<dyn Oracle> {
    let provider = cfg.llm.provider.to_lowercase();
    match provider.as_str() {
        "gemini" => match create_gemini_oracle(Some(&cfg.llm.model)) {
            Some(oracle) => {
                tracing::info!("Using Gemini oracle ({})", oracle.model());
                Arc::new(oracle)
            }
            None => {
                tracing::warn!("GEMINI_API_KEY not set, using Mock oracle");
                Arc::new(MockOracle::default())
            }
        },
        "openai" => match std::env::var(OPENAI_API_KEY_VAR) {
            Ok(key) => {
                tracing::info!("Using OpenAI-compatible oracle ({})", cfg.llm.model);
                Arc::new(OpenAiOracle::new(
                    cfg.llm.base_url.as_deref(),
                    &cfg.llm.model,
                    &key,
                ))
            }
            Err(_) => {
                tracing::warn!("OPENAI_API_KEY not set, using Mock oracle");
                Arc::new(MockOracle::default())
            }
        },
        "mock" => Arc::new(MockOracle::default()),
        other => {
            tracing::warn!("Unknown oracle provider '{}', using Mock oracle", other);
            Arc::new(MockOracle::default())
        }
    }
}

pub fn create_agent_from_config(cfg: &AppConfig) -> Box<dyn Agent> {
    match cfg.agent.kind {
        AgentKind::Oracle => {
            let policy = cfg.agent.parse_failure_policy();
            tracing::info!(mode = ?cfg.agent.mode, on_parse_failure = ?policy, "Oracle agent");
            let oracle = RetryingOracle::new(create_oracle_from_config(cfg), cfg.retry_config());
            Box::new(DecisionEngine::new(oracle, cfg.agent.mode, policy))
        }
        AgentKind::TargetText => {
            tracing::info!(target_text = %cfg.agent.target_text, "Target-text agent");
            Box::new(TargetTextAgent::new(cfg.agent.target_text.clone()))
        }
    }
}
