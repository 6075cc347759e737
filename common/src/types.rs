//! 共通型定義
//!
//! EndpointDescriptor, ModuleFile等のコアデータ型

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// HTTPメソッド
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GETリクエスト
    Get,
    /// POSTリクエスト（記述子省略時のデフォルト）
    #[default]
    Post,
    /// PUTリクエスト
    Put,
    /// DELETEリクエスト
    Delete,
    /// PATCHリクエスト
    Patch,
    /// HEADリクエスト
    Head,
}

impl HttpMethod {
    /// メソッドを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
        }
    }

    /// GETかどうか（ペイロード配置の分岐に使用）
    pub fn is_get(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "delete" => Ok(Self::Delete),
            "patch" => Ok(Self::Patch),
            "head" => Ok(Self::Head),
            other => Err(CommonError::Validation(format!(
                "Unknown HTTP method: {}",
                other
            ))),
        }
    }
}

/// エンドポイント記述子
///
/// URL文字列のみの省略形（メソッドはPOST固定）か、
/// URLとメソッドを明示するレコードのどちらか。読み込み後は不変。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EndpointDescriptor {
    /// URLのみの省略形
    Url(String),
    /// URLとメソッドを明示する形
    Detailed {
        /// リクエスト先URL（相対パスまたは絶対URL）
        url: String,
        /// HTTPメソッド（省略時はPOST）
        #[serde(default)]
        method: HttpMethod,
    },
}

impl EndpointDescriptor {
    /// URLテンプレートを返す
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) => url,
            Self::Detailed { url, .. } => url,
        }
    }

    /// 使用するHTTPメソッドを返す
    pub fn method(&self) -> HttpMethod {
        match self {
            Self::Url(_) => HttpMethod::Post,
            Self::Detailed { method, .. } => *method,
        }
    }
}

/// モジュール内のエンドポイント表（エンドポイント名 → 記述子）
pub type ModuleTable = HashMap<String, EndpointDescriptor>;

/// モジュール記述子ファイル
///
/// 1ファイル = 1モジュール。module_name未指定時はファイル名
/// （拡張子抜き）がモジュール名になる。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModuleFile {
    /// モジュール名の上書き
    #[serde(default, alias = "moduleName", skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    /// エンドポイント表
    pub endpoints: ModuleTable,
}
