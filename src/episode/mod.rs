//! 回合层：重复决策 -> 执行 -> 观察，终止时重置，直到步数预算用尽

pub mod events;
pub mod loop_;
pub mod state;

pub use events::{EpisodeEvent, ResetReason};
pub use loop_::{EpisodeRunner, RunSummary, RunnerConfig};
pub use state::EpisodeState;
