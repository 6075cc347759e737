//! エラー型定義
//!
//! 統一エラー型（thiserror使用）と、ディスパッチ結果に載せる
//! 正規化済みエラーペイロード

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Common層Result型
pub type CommonResult<T> = Result<T, CommonError>;

/// 呼び出し失敗ペイロード
///
/// ディスパッチ失敗時に呼び出し元へ返す正規化済みエラー。
/// レスポンスが得られなかった失敗（接続エラー・タイムアウト等）では
/// status_code が None になる。シリアライズ形は
/// `{"statusCode": number|null, "message": string}`。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallError {
    /// HTTPステータスコード（レスポンス無しの場合はNone）
    pub status_code: Option<u16>,
    /// エラーメッセージ
    pub message: String,
}

impl CallError {
    /// サーバーがステータスを返した失敗を生成
    pub fn from_status(code: u16) -> Self {
        Self {
            status_code: Some(code),
            message: format!("service error: {}", code),
        }
    }

    /// レスポンスが得られなかった失敗を生成
    pub fn no_response(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (status {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}
