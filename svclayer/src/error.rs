//! エラー型定義
//!
//! 起動フェーズの統一エラー型（thiserror使用）。
//! 呼び出し単位の失敗は `CallError` で扱い、ここには含めない。

use std::path::PathBuf;
use svclayer_common::error::CommonError;
use thiserror::Error;

/// サービスレイヤーエラー型
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// モジュール名の重複
    #[error("Duplicate module name '{name}' ({first} and {second})")]
    DuplicateModule {
        /// 衝突したモジュール名
        name: String,
        /// 先に登録された側の登録元
        first: String,
        /// 後から登録された側の登録元
        second: String,
    },

    /// 記述子ファイルの読み込み失敗
    #[error("Failed to read descriptor {}: {message}", path.display())]
    DescriptorRead {
        /// 対象パス
        path: PathBuf,
        /// 失敗内容
        message: String,
    },

    /// 不正なベースURL
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// サービスレイヤーResult型
pub type ServiceResult<T> = Result<T, ServiceError>;
