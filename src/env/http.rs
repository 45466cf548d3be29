//! HTTP 环境桥接：通过 JSON 与进程外的模拟器通信
//!
//! - `GET  /limits` -> `{screen_width, screen_height}`（可选，404 表示未知）
//! - `POST /reset`  `{env_id, seed}` -> `{observation, info}`
//! - `POST /step`   `{action}` -> `{observation, reward, terminated, truncated, info}`
//! - `POST /close`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::action::{Action, ScreenLimits};
use crate::env::{Environment, Info, Observation, StepOutcome};

#[derive(Debug, Deserialize)]
struct ResetResponse {
    observation: Observation,
    #[serde(default)]
    info: Info,
}

pub struct HttpEnvironment {
    client: reqwest::Client,
    base_url: String,
    env_id: String,
    limits: Option<ScreenLimits>,
}

impl HttpEnvironment {
    /// 建立连接并读取屏幕尺寸
    pub async fn connect(
        base_url: &str,
        env_id: &str,
        timeout_secs: u64,
    ) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| e.to_string())?;
        let mut env = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            env_id: env_id.to_string(),
            limits: None,
        };
        env.limits = env.fetch_limits().await?;
        tracing::info!(env_id = %env.env_id, limits = ?env.limits, "Connected to environment bridge");
        Ok(env)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch_limits(&self) -> Result<Option<ScreenLimits>, String> {
        let resp = self
            .client
            .get(self.url("/limits"))
            .send()
            .await
            .map_err(|e| format!("GET /limits: {e}"))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let limits = resp
            .error_for_status()
            .map_err(|e| format!("GET /limits: {e}"))?
            .json::<ScreenLimits>()
            .await
            .map_err(|e| format!("GET /limits: {e}"))?;
        Ok(Some(limits))
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, String> {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("POST {path}: {e}"))?
            .json::<T>()
            .await
            .map_err(|e| format!("POST {path}: {e}"))
    }
}

fn reset_body(env_id: &str, seed: Option<u64>) -> serde_json::Value {
    serde_json::json!({ "env_id": env_id, "seed": seed })
}

fn step_body(action: &Action) -> serde_json::Value {
    serde_json::json!({ "action": action })
}

#[async_trait]
impl Environment for HttpEnvironment {
    async fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, Info), String> {
        let resp: ResetResponse = self
            .post("/reset", reset_body(&self.env_id, seed))
            .await?;
        Ok((resp.observation, resp.info))
    }

    async fn step(&mut self, action: &Action) -> Result<StepOutcome, String> {
        self.post("/step", step_body(action)).await
    }

    async fn close(&mut self) -> Result<(), String> {
        self.client
            .post(self.url("/close"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map(|_| ())
            .map_err(|e| format!("POST /close: {e}"))
    }

    fn limits(&self) -> Option<ScreenLimits> {
        self.limits
    }
}
