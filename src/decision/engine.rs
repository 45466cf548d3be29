//! DecisionEngine：提示词 -> 预言机 -> 解析
//!
//! 预言机调用经 RetryingOracle（超时 + 有限退避重试）；解析失败交给 RecoveryEngine，
//! 按 ParseFailurePolicy 决定终止还是降级为 NONE。

use async_trait::async_trait;

use crate::action::{parse_action, Action, ScreenLimits};
use crate::core::{AgentError, DecisionError, RecoveryAction, RecoveryEngine};
use crate::decision::{Agent, Decision, History, ObservationMode, ParseFailurePolicy, PromptBuilder};
use crate::env::Observation;
use crate::llm::RetryingOracle;

/// 回复日志最大字符数
const REPLY_PREVIEW_CHARS: usize = 300;

pub struct DecisionEngine {
    oracle: RetryingOracle,
    prompt: PromptBuilder,
    recovery: RecoveryEngine,
}

impl DecisionEngine {
    pub fn new(oracle: RetryingOracle, mode: ObservationMode, on_parse_failure: ParseFailurePolicy) -> Self {
        Self {
            oracle,
            prompt: PromptBuilder::new(mode),
            recovery: RecoveryEngine::new(on_parse_failure),
        }
    }

    pub fn mode(&self) -> ObservationMode {
        self.prompt.mode()
    }

    /// 解析回复并做屏幕范围检查
    fn interpret(reply: &str, limits: Option<&ScreenLimits>) -> Result<Action, DecisionError> {
        let action = parse_action(reply)?;
        if let Some(l) = limits {
            action.check_bounds(l)?;
        }
        Ok(action)
    }
}

#[async_trait]
impl Agent for DecisionEngine {
    async fn decide(
        &self,
        observation: &Observation,
        history: &History,
        limits: Option<ScreenLimits>,
    ) -> Result<Decision, AgentError> {
        let image = match self.mode() {
            ObservationMode::Text => None,
            ObservationMode::Image => {
                let frame = observation.screenshot.as_ref().ok_or_else(|| {
                    AgentError::EnvironmentFailure(
                        "image mode requires a screenshot in the observation".to_string(),
                    )
                })?;
                // 畸形帧在调用预言机之前拒绝
                frame
                    .validate()
                    .map_err(|e| AgentError::EnvironmentFailure(e.to_string()))?;
                Some(frame)
            }
        };

        let prompt = self.prompt.build(observation, history, limits.as_ref());
        let raw_reply = self.oracle.generate(&prompt, image).await?;

        let preview: String = raw_reply.trim().chars().take(REPLY_PREVIEW_CHARS).collect();
        tracing::debug!(reply = %preview, "Oracle response");

        match Self::interpret(&raw_reply, limits.as_ref()) {
            Ok(action) => Ok(Decision {
                action,
                raw_reply,
                fallback: None,
            }),
            Err(e) => match self.recovery.handle(&e) {
                RecoveryAction::FallbackToNone => {
                    tracing::warn!(error = %e, "Unparseable reply, falling back to NONE");
                    Ok(Decision {
                        action: Action::None,
                        raw_reply,
                        fallback: Some(e),
                    })
                }
                RecoveryAction::Abort => Err(AgentError::Decision(e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::env::{DomElement, Frame};
    use crate::llm::{MockOracle, RetryConfig};

    fn engine(mock: Arc<MockOracle>, mode: ObservationMode, policy: ParseFailurePolicy) -> DecisionEngine {
        let retry = RetryConfig {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
            request_timeout: Duration::from_secs(5),
        };
        DecisionEngine::new(RetryingOracle::new(mock, retry), mode, policy)
    }

    fn observation() -> Observation {
        Observation {
            utterance: "Click ONE".to_string(),
            dom_elements: vec![DomElement::new(5, "button", "ONE")],
            screenshot: Some(Frame::new(1, 1, vec![0, 0, 0])),
        }
    }

    #[tokio::test]
    async fn test_decide_returns_action_and_raw_reply() {
        let mock = Arc::new(MockOracle::fixed("CLICK_ELEMENT 5\n"));
        let engine = engine(mock.clone(), ObservationMode::Text, ParseFailurePolicy::Abort);
        let decision = engine
            .decide(&observation(), &History::new(5), None)
            .await
            .unwrap();
        assert_eq!(decision.action, Action::ClickElement { element_ref: 5 });
        assert_eq!(decision.raw_reply, "CLICK_ELEMENT 5\n");
        assert!(decision.fallback.is_none());
        assert!(!mock.calls()[0].had_image);
    }

    #[tokio::test]
    async fn test_noop_policy_degrades_to_none() {
        let mock = Arc::new(MockOracle::fixed("gibberish"));
        let engine = engine(mock, ObservationMode::Image, ParseFailurePolicy::NoOp);
        let decision = engine
            .decide(&observation(), &History::new(5), None)
            .await
            .unwrap();
        assert_eq!(decision.action, Action::None);
        assert_eq!(decision.raw_reply, "gibberish");
        assert_eq!(
            decision.fallback,
            Some(DecisionError::UnknownActionKind("gibberish".to_string()))
        );
    }

    #[tokio::test]
    async fn test_abort_policy_surfaces_parse_error() {
        let mock = Arc::new(MockOracle::fixed("gibberish"));
        let engine = engine(mock, ObservationMode::Text, ParseFailurePolicy::Abort);
        let err = engine
            .decide(&observation(), &History::new(5), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Decision(DecisionError::UnknownActionKind(_))));
    }

    #[tokio::test]
    async fn test_out_of_bounds_is_malformed() {
        let mock = Arc::new(MockOracle::fixed("CLICK_COORDS 500 10"));
        let engine = engine(mock, ObservationMode::Image, ParseFailurePolicy::Abort);
        let limits = ScreenLimits {
            screen_width: 160,
            screen_height: 210,
        };
        let err = engine
            .decide(&observation(), &History::new(5), Some(limits))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::Decision(DecisionError::MalformedArguments { .. })
        ));
    }

    #[tokio::test]
    async fn test_image_mode_sends_frame() {
        let mock = Arc::new(MockOracle::fixed("NONE"));
        let engine = engine(mock.clone(), ObservationMode::Image, ParseFailurePolicy::NoOp);
        engine
            .decide(&observation(), &History::new(5), None)
            .await
            .unwrap();
        assert!(mock.calls()[0].had_image);
    }

    #[tokio::test]
    async fn test_image_mode_without_screenshot_fails() {
        let mock = Arc::new(MockOracle::fixed("NONE"));
        let engine = engine(mock.clone(), ObservationMode::Image, ParseFailurePolicy::NoOp);
        let obs = Observation {
            screenshot: None,
            ..observation()
        };
        let err = engine.decide(&obs, &History::new(5), None).await.unwrap_err();
        assert!(matches!(err, AgentError::EnvironmentFailure(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_image_mode_rejects_malformed_frame_before_oracle() {
        let mock = Arc::new(MockOracle::fixed("NONE"));
        let engine = engine(mock.clone(), ObservationMode::Image, ParseFailurePolicy::NoOp);
        let obs = Observation {
            screenshot: Some(Frame::new(4, 4, vec![0; 10])),
            ..observation()
        };
        let err = engine.decide(&obs, &History::new(5), None).await.unwrap_err();
        match err {
            AgentError::EnvironmentFailure(msg) => assert!(msg.contains("expected 48"), "{msg}"),
            other => panic!("expected EnvironmentFailure, got {other:?}"),
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_text_mode_ignores_malformed_frame() {
        let mock = Arc::new(MockOracle::fixed("NONE"));
        let engine = engine(mock.clone(), ObservationMode::Text, ParseFailurePolicy::Abort);
        let obs = Observation {
            screenshot: Some(Frame::new(4, 4, vec![0; 10])),
            ..observation()
        };
        let decision = engine.decide(&obs, &History::new(5), None).await.unwrap();
        assert_eq!(decision.action, Action::None);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_oracle_failure_is_not_downgraded() {
        let mock = Arc::new(MockOracle::scripted(vec![Err("401".to_string())]));
        let engine = engine(mock, ObservationMode::Image, ParseFailurePolicy::NoOp);
        let err = engine
            .decide(&observation(), &History::new(5), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::OracleUnavailable { attempts: 1, .. }));
    }
}
