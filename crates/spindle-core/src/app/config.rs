//! PoolConfig - プールの設定値
//!
//! # 読み込み順
//! 1. `PoolConfig::default()`
//! 2. 環境変数 (`from_env`)
//! 3. 呼び出し側での上書き（CLI フラグなど）
//!
//! 検証は `validate()` に集約し、`PoolBuilder::build()` が必ず通す。

use serde::{Deserialize, Serialize};

use crate::domain::ActorModel;
use crate::error::{ConfigError, PoolError};

pub const DEFAULT_THREAD_NUMBER: usize = 8;
pub const DEFAULT_MAX_REQUESTS: usize = 10_000;
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "spindle-worker";

pub const ENV_ACTOR_MODEL: &str = "SPINDLE_ACTOR_MODEL";
pub const ENV_THREADS: &str = "SPINDLE_THREADS";
pub const ENV_MAX_REQUESTS: &str = "SPINDLE_MAX_REQUESTS";
pub const ENV_THREAD_NAME_PREFIX: &str = "SPINDLE_THREAD_NAME_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub actor_model: ActorModel,
    /// ワーカースレッド数
    pub thread_number: usize,
    /// キューに同時に置ける最大リクエスト数
    pub max_requests: usize,
    /// スレッド名は `{prefix}-{index}`
    pub thread_name_prefix: String,
    /// `None` なら std のデフォルト
    pub stack_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            actor_model: ActorModel::default(),
            thread_number: DEFAULT_THREAD_NUMBER,
            max_requests: DEFAULT_MAX_REQUESTS,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
        }
    }
}

impl PoolConfig {
    /// Read overrides from `SPINDLE_*` environment variables.
    ///
    /// 未設定の変数はデフォルト値のまま。値が読めない場合はエラー。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_ACTOR_MODEL) {
            config.actor_model = raw.parse().map_err(|message| ConfigError::InvalidVar {
                var: ENV_ACTOR_MODEL,
                message,
            })?;
        }
        if let Some(raw) = lookup(ENV_THREADS) {
            config.thread_number = parse_count(ENV_THREADS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_REQUESTS) {
            config.max_requests = parse_count(ENV_MAX_REQUESTS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_THREAD_NAME_PREFIX) {
            let raw = raw.trim();
            if !raw.is_empty() {
                config.thread_name_prefix = raw.to_string();
            }
        }

        Ok(config)
    }

    /// Fail-fast check run before any thread is spawned.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.thread_number == 0 {
            return Err(PoolError::InvalidConfig(
                "thread_number must be greater than 0".into(),
            ));
        }
        if self.max_requests == 0 {
            return Err(PoolError::InvalidConfig(
                "max_requests must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn parse_count(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidVar {
            var,
            message: format!("expected a non-negative integer, got {raw:?} ({e})"),
        })
}
