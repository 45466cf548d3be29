//! Mock 预言机（用于测试与无 API Key 的本地运行）
//!
//! 按脚本依次返回回复；脚本用尽后重复最后一条。同时记录每次调用的提示词，便于断言。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::env::Frame;
use crate::llm::Oracle;

/// 一次调用的记录
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub had_image: bool,
}

#[derive(Debug)]
pub struct MockOracle {
    script: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Result<String, String>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockOracle {
    /// 每次都返回同一条回复
    pub fn fixed(reply: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(reply.into())])
    }

    /// 依次返回脚本中的结果（Err 模拟预言机调用失败）
    pub fn scripted(script: Vec<Result<String, String>>) -> Self {
        let last = script
            .last()
            .cloned()
            .unwrap_or_else(|| Ok("NONE".to_string()));
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(last),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::fixed("NONE")
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn generate(&self, prompt: &str, image: Option<&Frame>) -> Result<String, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                prompt: prompt.to_string(),
                had_image: image.is_some(),
            });
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(reply) => reply,
            None => self
                .last
                .lock()
                .map(|l| l.clone())
                .unwrap_or_else(|_| Ok("NONE".to_string())),
        }
    }
}
