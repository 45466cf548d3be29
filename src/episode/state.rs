//! 回合计数器，由 EpisodeRunner 独占

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EpisodeState {
    pub episode_index: u64,
    /// 当前回合内已执行的步数
    pub step_index: u64,
}

impl EpisodeState {
    pub fn advance_step(&mut self) {
        self.step_index += 1;
    }

    /// 回合结束：episode_index + 1，step_index 归零
    pub fn start_next_episode(&mut self) {
        self.episode_index += 1;
        self.step_index = 0;
    }
}
