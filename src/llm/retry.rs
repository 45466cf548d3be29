//! 预言机调用的超时与有限重试
//!
//! 每次尝试施加超时；失败后按指数退避重试，重试耗尽才上报 OracleUnavailable。
//! 调用仍是顺序阻塞的：一次决策内的所有尝试完成后才进入环境 step。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::core::AgentError;
use crate::env::Frame;
use crate::llm::Oracle;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 总尝试次数（含首次），至少为 1
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// 单次尝试超时
    pub request_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// 第 attempt 次失败后的等待时间（attempt 从 1 开始）
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

pub struct RetryingOracle {
    inner: Arc<dyn Oracle>,
    config: RetryConfig,
}

impl RetryingOracle {
    pub fn new(inner: Arc<dyn Oracle>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub async fn generate(&self, prompt: &str, image: Option<&Frame>) -> Result<String, AgentError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match timeout(self.config.request_timeout, self.inner.generate(prompt, image)).await {
                Ok(Ok(text)) => return Ok(text),
                Ok(Err(e)) => last_error = e,
                Err(_) => {
                    last_error = format!(
                        "timed out after {}ms",
                        self.config.request_timeout.as_millis()
                    )
                }
            }
            if attempt < max_attempts {
                let wait = self.config.backoff_for(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    wait_ms = wait.as_millis() as u64,
                    error = %last_error,
                    "Oracle call failed, retrying"
                );
                tokio::time::sleep(wait).await;
            }
        }

        Err(AgentError::OracleUnavailable {
            attempts: max_attempts,
            reason: last_error,
        })
    }
}
