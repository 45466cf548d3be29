//! 规则型决策者：点击文本等于目标标签的第一个元素，不调用预言机
//!
//! 适合 click-test 一类任务的基线；找不到目标时本步输出 NONE。

use async_trait::async_trait;

use crate::action::{Action, ScreenLimits};
use crate::core::AgentError;
use crate::decision::{Agent, Decision, History};
use crate::env::Observation;

#[derive(Debug, Clone)]
pub struct TargetTextAgent {
    target: String,
}

impl TargetTextAgent {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl Agent for TargetTextAgent {
    async fn decide(
        &self,
        observation: &Observation,
        _history: &History,
        _limits: Option<ScreenLimits>,
    ) -> Result<Decision, AgentError> {
        let action = match observation
            .dom_elements
            .iter()
            .find(|e| e.text == self.target)
        {
            Some(element) => Action::ClickElement {
                element_ref: element.element_ref,
            },
            None => {
                tracing::warn!(target_text = %self.target, "No element with target text");
                Action::None
            }
        };
        Ok(Decision {
            raw_reply: action.to_string(),
            action,
            fallback: None,
        })
    }
}
