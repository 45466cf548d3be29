//! 回合过程事件：供日志之外的观察者（测试、前端）订阅

use serde::Serialize;

use crate::episode::RunSummary;

/// 回合重置原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    Terminated,
    /// 仅因 truncated 重置（terminated 为 false）
    Truncated,
}

/// 单步过程事件（可序列化为 JSON）
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EpisodeEvent {
    /// 回合开始（首个回合带 seed）
    EpisodeStarted { episode: u64, seeded: bool },
    /// 一次决策：提交的动作与模型原始回复
    Decision {
        episode: u64,
        step: u64,
        action: String,
        raw_reply: String,
        /// 解析失败降级为 NONE 时的原因
        fallback: Option<String>,
    },
    /// 一次环境 step 的结果
    Step {
        episode: u64,
        step: u64,
        reward: f64,
        terminated: bool,
        truncated: bool,
    },
    /// 回合重置，episode 为新回合编号
    EpisodeReset { episode: u64, reason: ResetReason },
    /// 运行结束（步数用尽或被中断）
    Finished { summary: RunSummary },
}
