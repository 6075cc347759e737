//! 設定管理
//!
//! ServiceConfig等の設定構造体

use crate::error::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// サービスレイヤー設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// ベースURL (デフォルト: "http://localhost:8000")
    ///
    /// 相対パスのエンドポイントURLすべてに前置される。
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// リクエストタイムアウト（秒）(デフォルト: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// モジュール記述子ディレクトリ (デフォルト: なし)
    ///
    /// 設定時はこのディレクトリ直下の `*.json` を起動時に読み込む。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            module_dir: None,
        }
    }
}

impl ServiceConfig {
    /// 設定ファイルと環境変数から設定を読み込む
    ///
    /// カレントディレクトリの `svclayer.toml`（任意）を読み、
    /// `SVCLAYER_*` 環境変数で上書きする。
    pub fn load() -> CommonResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("svclayer").required(false))
            .add_source(config::Environment::with_prefix("SVCLAYER").try_parsing(true))
            .build()
            .map_err(|e| CommonError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| CommonError::Config(e.to_string()))
    }

    /// 指定パスの設定ファイルから読み込む
    pub fn from_file(path: impl Into<PathBuf>) -> CommonResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.into()))
            .build()
            .map_err(|e| CommonError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| CommonError::Config(e.to_string()))
    }
}
