//! 核心层：错误类型、错误恢复、外部中断

pub mod error;
pub mod recovery;
pub mod shutdown;

pub use error::{AgentError, DecisionError, RecoveryAction};
pub use recovery::RecoveryEngine;
pub use shutdown::{ShutdownManager, ShutdownReason};
