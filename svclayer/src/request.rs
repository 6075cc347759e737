//! リクエストファクトリ
//!
//! (module, endpoint) ごとに生成される `BoundEndpoint` を提供する。
//! 単一実行ガード・オプションマージ・メソッド別ペイロード配置・
//! 結果正規化をここで行う。

use crate::transport::Transport;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use svclayer_common::error::CallError;
use svclayer_common::types::HttpMethod;
use tracing::{debug, warn};
use uuid::Uuid;

/// URLテンプレート中のパスパラメータ（`{id}` 等）
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\w+\}").expect("placeholder regex"));

/// ディスパッチ結果
///
/// 成功時はレスポンスボディ、失敗時は正規化済み `CallError`。
pub type CallResult = Result<Value, CallError>;

/// 呼び出し単位の追加設定
///
/// バインド済みの `{url, method}` に同名フィールドで上書きマージされる。
#[derive(Debug, Clone, Default)]
pub struct CallOverrides {
    /// URLの上書き
    pub url: Option<String>,
    /// メソッドの上書き
    pub method: Option<HttpMethod>,
    /// 追加ヘッダー
    pub headers: Vec<(String, String)>,
    /// このリクエストのみのタイムアウト
    pub timeout: Option<Duration>,
}

/// バインド済みエンドポイント
///
/// URLテンプレートとHTTPメソッドに束縛された呼び出し口。
/// 実行中フラグはこのインスタンスに固有で、他のエンドポイントや
/// 他の呼び出しと共有されない。Cloneは提供しない（ガードが分岐するため）。
pub struct BoundEndpoint {
    transport: Transport,
    url: String,
    method: HttpMethod,
    in_flight: AtomicBool,
}

/// 実行中フラグのリセットガード
///
/// 成否に関わらずDropで必ずフラグを戻す。
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl BoundEndpoint {
    /// エンドポイントを生成する
    pub fn new(transport: Transport, url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            transport,
            url: url.into(),
            method,
            in_flight: AtomicBool::new(false),
        }
    }

    /// URLテンプレートを返す
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTPメソッドを返す
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// 呼び出しが実行中かどうか
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// エンドポイントを呼び出す
    ///
    /// 同一エンドポイントの呼び出しが実行中の間に届いた呼び出しは
    /// 破棄され `None` を返す（キューイングもエラー通知もしない）。
    /// 完了後（成功・失敗とも）は次の呼び出しを受け付ける。
    pub async fn dispatch(&self, data: Value) -> Option<CallResult> {
        self.dispatch_with(data, CallOverrides::default()).await
    }

    /// 追加設定付きでエンドポイントを呼び出す
    pub async fn dispatch_with(&self, data: Value, overrides: CallOverrides) -> Option<CallResult> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!(url = %self.url, "Dropped duplicate in-flight call");
            return None;
        }
        let _guard = FlightGuard {
            flag: &self.in_flight,
        };
        Some(self.execute(data, overrides).await)
    }

    /// ガード取得後の実処理
    async fn execute(&self, data: Value, overrides: CallOverrides) -> CallResult {
        let request_id = Uuid::new_v4();

        // 同名フィールドはオーバーライド側を優先
        let url = overrides.url.as_deref().unwrap_or(&self.url);
        let method = overrides.method.unwrap_or(self.method);

        let (url, query) = place_payload(url, method, &data);
        let resolved = self.transport.resolve_url(&url);

        debug!(%request_id, method = %method, url = %resolved, "Dispatching request");

        let mut builder = self.transport.request(to_reqwest(method), &resolved);
        if let Some(pairs) = &query {
            builder = builder.query(pairs);
        }
        if !method.is_get() {
            builder = builder.json(&data);
        }
        for (name, value) in &overrides.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = overrides.timeout {
            builder = builder.timeout(timeout);
        }

        match self.transport.execute(builder).await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    warn!(%request_id, status = status.as_u16(), "Request failed");
                    return Err(CallError::from_status(status.as_u16()));
                }
                let payload = read_payload(response).await?;
                debug!(%request_id, "Request completed");
                Ok(payload)
            }
            Err(err) => {
                warn!(%request_id, error = %err, "Request failed in transport");
                Err(transport_error(err))
            }
        }
    }
}

/// メソッドに応じてdataをURL・クエリ・ボディに振り分ける
///
/// - GETかつURLに `{token}` を含む: dataの各キーでURLを置換し、クエリは生成しない
/// - GETでプレースホルダ無し: dataをクエリパラメータにする
/// - GET以外: dataはJSONボディに載る（呼び出し側で設定）
fn place_payload(url: &str, method: HttpMethod, data: &Value) -> (String, Option<Vec<(String, String)>>) {
    if !method.is_get() {
        return (url.to_string(), None);
    }
    if PLACEHOLDER.is_match(url) {
        return (substitute_path_params(url, data), None);
    }
    (url.to_string(), query_pairs(data))
}

/// `{key}` トークンをdataの同名キーの値で置換する
///
/// dataに対応キーが無いトークンはそのまま残し、
/// URLに現れないdataのキーは無視する。
fn substitute_path_params(url: &str, data: &Value) -> String {
    let Some(map) = data.as_object() else {
        return url.to_string();
    };
    let mut result = url.to_string();
    for (key, value) in map {
        result = result.replace(&format!("{{{}}}", key), &scalar_text(value));
    }
    result
}

/// dataオブジェクトをクエリパラメータ対に変換する
fn query_pairs(data: &Value) -> Option<Vec<(String, String)>> {
    let map = data.as_object()?;
    if map.is_empty() {
        return None;
    }
    Some(
        map.iter()
            .map(|(key, value)| (key.clone(), scalar_text(value)))
            .collect(),
    )
}

/// JSON値をURL埋め込み用の素の文字列にする
///
/// 文字列は引用符無しで、その他はJSON表現のまま使う。
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 成功レスポンスのボディを読み取る
///
/// JSONとして解釈できないボディは文字列値としてそのまま返す。
async fn read_payload(response: reqwest::Response) -> CallResult {
    let text = response.text().await.map_err(transport_error)?;
    if text.is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::String(text)),
    }
}

/// reqwestの失敗を正規化済みエラーへ変換する
///
/// レスポンスが無い失敗（接続不能・タイムアウト等）は
/// ステータス無しのエラーとして返す。
fn transport_error(err: reqwest::Error) -> CallError {
    match err.status() {
        Some(status) => CallError::from_status(status.as_u16()),
        None => CallError::no_response(err.to_string()),
    }
}

/// HttpMethodをreqwestのMethodへ変換する
fn to_reqwest(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Head => Method::HEAD,
    }
}
