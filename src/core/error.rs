//! 错误类型与恢复动作
//!
//! DecisionError 只来自动作解析（模型回复不可信）；AgentError 覆盖整个循环（解析、预言机、环境）。
//! 与 RecoveryEngine 配合：根据 DecisionError 与策略决定 FallbackToNone / Abort。

use thiserror::Error;

use crate::action::ActionKind;

/// 动作解析失败：模型回复无法映射为合法动作
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionError {
    /// 首个 token 不是已知关键字（含空回复）
    #[error("Unknown action kind: {0:?}")]
    UnknownActionKind(String),

    /// 关键字已识别，但参数个数不对、不是整数或越界
    #[error("Malformed arguments for {kind}: {reason}")]
    MalformedArguments { kind: ActionKind, reason: String },
}

/// 循环运行过程中可能出现的错误（预言机与环境错误一律致命）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Decision error: {0}")]
    Decision(#[from] DecisionError),

    /// 预言机在重试耗尽后仍不可用（网络 / 鉴权 / 配额 / 超时）
    #[error("Oracle unavailable after {attempts} attempt(s): {reason}")]
    OracleUnavailable { attempts: u32, reason: String },

    #[error("Environment failure: {0}")]
    EnvironmentFailure(String),
}

/// 恢复引擎根据错误类型给出的建议动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// 本步降级为 NONE 动作，循环继续
    FallbackToNone,
    /// 终止循环，把错误交给调用方
    Abort,
}
