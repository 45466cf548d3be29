//! 回合主循环
//!
//! reset(seed) -> [decide -> 写入历史 -> step -> 终止则 reset(None) 并清空历史] x max_steps。
//! 只在两步之间检查取消；无论正常结束、被中断还是出错，环境都恰好 close 一次。

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::core::AgentError;
use crate::decision::{Agent, History};
use crate::env::{Environment, StepOutcome};
use crate::episode::{EpisodeEvent, EpisodeState, ResetReason};

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// 总迭代次数，跨回合累计
    pub max_steps: u64,
    /// 只用于首次 reset
    pub seed: Option<u64>,
    /// History 上限，0 表示不限
    pub history_limit: usize,
    /// truncated 时是否也重置回合
    pub reset_on_truncated: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            seed: Some(41),
            history_limit: 20,
            reset_on_truncated: true,
        }
    }
}

/// 运行结果统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// 已完成（触发重置）的回合数
    pub episodes_completed: u64,
    pub steps: u64,
    pub total_reward: f64,
    /// 是否因外部中断提前结束
    pub interrupted: bool,
    /// 结束时的计数器
    pub state: EpisodeState,
}

pub struct EpisodeRunner<'a> {
    agent: &'a dyn Agent,
    config: RunnerConfig,
    cancel_token: CancellationToken,
    event_tx: Option<UnboundedSender<EpisodeEvent>>,
}

impl<'a> EpisodeRunner<'a> {
    pub fn new(agent: &'a dyn Agent, config: RunnerConfig) -> Self {
        Self {
            agent,
            config,
            cancel_token: CancellationToken::new(),
            event_tx: None,
        }
    }

    /// 设置取消令牌（外部中断）
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// 设置事件推送通道
    pub fn with_event_tx(mut self, tx: UnboundedSender<EpisodeEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn send_event(&self, ev: EpisodeEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(ev);
        }
    }

    /// 独占环境直到运行结束；所有退出路径都会 close 环境一次
    pub async fn run<E: Environment>(&self, mut env: E) -> Result<RunSummary, AgentError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);
        async move {
            let result = self.drive(&mut env).await;
            let closed = env.close().await;
            match (result, closed) {
                (Ok(summary), Ok(())) => Ok(summary),
                (Ok(_), Err(e)) => Err(AgentError::EnvironmentFailure(format!("close: {e}"))),
                (Err(e), Ok(())) => Err(e),
                (Err(e), Err(close_err)) => {
                    tracing::warn!(error = %close_err, "Environment close failed after error");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn drive<E: Environment>(&self, env: &mut E) -> Result<RunSummary, AgentError> {
        let limits = env.limits();
        let mut history = History::new(self.config.history_limit);
        let mut state = EpisodeState::default();
        let mut summary = RunSummary::default();

        let (mut observation, _info) = env
            .reset(self.config.seed)
            .await
            .map_err(AgentError::EnvironmentFailure)?;
        tracing::info!(seed = ?self.config.seed, max_steps = self.config.max_steps, "Environment reset");
        self.send_event(EpisodeEvent::EpisodeStarted {
            episode: state.episode_index,
            seeded: self.config.seed.is_some(),
        });

        for _ in 0..self.config.max_steps {
            if self.cancel_token.is_cancelled() {
                tracing::info!(episode = state.episode_index, step = state.step_index, "Interrupted");
                summary.interrupted = true;
                break;
            }

            let decision = self.agent.decide(&observation, &history, limits).await?;
            tracing::info!(
                episode = state.episode_index,
                step = state.step_index,
                action = %decision.action,
                reply = %decision.raw_reply.trim(),
                "Decision"
            );
            self.send_event(EpisodeEvent::Decision {
                episode: state.episode_index,
                step: state.step_index,
                action: decision.action.to_string(),
                raw_reply: decision.raw_reply.clone(),
                fallback: decision.fallback.as_ref().map(|e| e.to_string()),
            });
            history.push(decision.raw_reply);

            let StepOutcome {
                observation: next,
                reward,
                terminated,
                truncated,
                ..
            } = env
                .step(&decision.action)
                .await
                .map_err(AgentError::EnvironmentFailure)?;

            tracing::info!(
                episode = state.episode_index,
                step = state.step_index,
                reward,
                terminated,
                truncated,
                "Step"
            );
            self.send_event(EpisodeEvent::Step {
                episode: state.episode_index,
                step: state.step_index,
                reward,
                terminated,
                truncated,
            });
            summary.steps += 1;
            summary.total_reward += reward;
            state.advance_step();
            observation = next;

            // truncated 单独触发重置是可配置的偏离：关闭 reset_on_truncated 即只在 terminated 时重置
            let reason = if terminated {
                Some(ResetReason::Terminated)
            } else if truncated && self.config.reset_on_truncated {
                Some(ResetReason::Truncated)
            } else {
                None
            };

            if let Some(reason) = reason {
                let (next, _info) = env
                    .reset(None)
                    .await
                    .map_err(AgentError::EnvironmentFailure)?;
                observation = next;
                history.clear();
                state.start_next_episode();
                summary.episodes_completed += 1;
                tracing::info!(episode = state.episode_index, reason = ?reason, "Resetting env");
                self.send_event(EpisodeEvent::EpisodeReset {
                    episode: state.episode_index,
                    reason,
                });
            }
        }

        summary.state = state;
        tracing::info!(
            steps = summary.steps,
            episodes_completed = summary.episodes_completed,
            total_reward = summary.total_reward,
            interrupted = summary.interrupted,
            "Run finished"
        );
        self.send_event(EpisodeEvent::Finished {
            summary: summary.clone(),
        });
        Ok(summary)
    }
}
