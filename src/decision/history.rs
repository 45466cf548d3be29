//! 决策历史：本回合内模型的原始回复，按时间顺序追加
//!
//! 只保留最近 limit 条（0 表示不设上限），超出时丢弃最旧的；回合重置时清空。

use std::collections::VecDeque;

#[derive(Clone, Debug, Default)]
pub struct History {
    replies: VecDeque<String>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            replies: VecDeque::new(),
            limit,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn push(&mut self, reply: impl Into<String>) {
        self.replies.push_back(reply.into());
        if self.limit > 0 {
            while self.replies.len() > self.limit {
                self.replies.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        self.replies.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.replies.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    /// 换行拼接，最近的在最后
    pub fn render(&self) -> String {
        self.iter().collect::<Vec<_>>().join("\n")
    }
}
