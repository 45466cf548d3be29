//! WebPilot 入口：初始化日志、加载配置、连接环境并运行回合循环。
//!
//! 用法：`webpilot [config.toml]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use webpilot::{
    agent::create_agent_from_config,
    config::load_config,
    core::ShutdownManager,
    env::HttpEnvironment,
    episode::EpisodeRunner,
    observability,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;

    let agent = create_agent_from_config(&cfg);
    let env = HttpEnvironment::connect(
        &cfg.env.base_url,
        &cfg.env.env_id,
        cfg.env.request_timeout_secs,
    )
    .await
    .map_err(anyhow::Error::msg)
    .context("Failed to connect to environment")?;

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    let summary = EpisodeRunner::new(agent.as_ref(), cfg.runner_config())
        .with_cancel_token(shutdown.token())
        .run(env)
        .await
        .context("Episode loop failed")?;

    tracing::info!(
        steps = summary.steps,
        episodes = summary.episodes_completed,
        total_reward = summary.total_reward,
        interrupted = summary.interrupted,
        "Done"
    );
    if shutdown.is_shutdown() {
        tracing::info!(reason = ?shutdown.reason(), "Run stopped by shutdown request");
    }
    Ok(())
}
