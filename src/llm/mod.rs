//! 预言机层：抽象与实现（OpenAI 兼容 / Gemini / Mock）及超时重试包装

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod retry;
pub mod traits;

pub use gemini::{create_gemini_oracle, GEMINI_API_KEY_VAR, GEMINI_BASE_URL, GEMINI_FLASH};
pub use mock::{MockCall, MockOracle};
pub use openai::OpenAiOracle;
pub use retry::{RetryConfig, RetryingOracle};
pub use traits::Oracle;
