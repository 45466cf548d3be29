//! 错误恢复引擎
//!
//! 解析失败按配置的 ParseFailurePolicy 处理：降级为 NONE 或终止。
//! 预言机与环境错误不经过这里，由 EpisodeRunner 直接作为致命错误返回（预言机的重试已在 RetryingOracle 内完成）。

use crate::core::{DecisionError, RecoveryAction};
use crate::decision::ParseFailurePolicy;

#[derive(Debug, Clone, Copy)]
pub struct RecoveryEngine {
    on_parse_failure: ParseFailurePolicy,
}

impl RecoveryEngine {
    pub fn new(on_parse_failure: ParseFailurePolicy) -> Self {
        Self { on_parse_failure }
    }

    pub fn handle(&self, err: &DecisionError) -> RecoveryAction {
        tracing::debug!(error = %err, policy = ?self.on_parse_failure, "Recovering from parse failure");
        match self.on_parse_failure {
            ParseFailurePolicy::NoOp => RecoveryAction::FallbackToNone,
            ParseFailurePolicy::Abort => RecoveryAction::Abort,
        }
    }
}
