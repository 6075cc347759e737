//! HTTPトランスポート
//!
//! プロセス内で共有するHTTPクライアント。ベースURLの付与と
//! リクエスト/レスポンスインターセプターを提供する。

use crate::error::{ServiceError, ServiceResult};
use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;
use svclayer_common::config::ServiceConfig;
use tracing::debug;

/// クライアント既定タイムアウト（秒）
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// リクエストインターセプター
///
/// 送信直前のRequestBuilderを加工して返す。未設定時は素通し。
pub type RequestInterceptor = Arc<dyn Fn(RequestBuilder) -> RequestBuilder + Send + Sync>;

/// レスポンスインターセプター
///
/// 受信直後のResponseを加工して返す。未設定時は素通し。
pub type ResponseInterceptor = Arc<dyn Fn(Response) -> Response + Send + Sync>;

/// HTTPトランスポート
///
/// 全エンドポイントで共有される（接続プーリング有効）。
/// クローンは同じ下層クライアントを共有する。
#[derive(Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
    request_interceptor: Option<RequestInterceptor>,
    response_interceptor: Option<ResponseInterceptor>,
}

impl Transport {
    /// 設定からトランスポートを生成する
    pub fn new(config: &ServiceConfig) -> ServiceResult<Self> {
        Self::builder(config.base_url.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
    }

    /// ビルダーを生成する
    pub fn builder(base_url: impl Into<String>) -> TransportBuilder {
        TransportBuilder {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            request_interceptor: None,
            response_interceptor: None,
        }
    }

    /// ベースURLを返す
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 相対パスをベースURLに連結する
    ///
    /// 絶対URL（http/https）はそのまま返す。
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }

    /// メソッドとURLからRequestBuilderを作る
    pub(crate) fn request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// リクエストを送信する
    ///
    /// リクエスト側インターセプターを適用して送信し、
    /// レスポンス側インターセプターを通した結果を返す。
    /// 送信の失敗はそのまま呼び出し元へ伝播する。
    pub async fn execute(&self, builder: RequestBuilder) -> reqwest::Result<Response> {
        let builder = match &self.request_interceptor {
            Some(interceptor) => interceptor(builder),
            None => builder,
        };
        let response = builder.send().await?;
        Ok(match &self.response_interceptor {
            Some(interceptor) => interceptor(response),
            None => response,
        })
    }
}

/// トランスポートビルダー
pub struct TransportBuilder {
    base_url: String,
    timeout: Duration,
    request_interceptor: Option<RequestInterceptor>,
    response_interceptor: Option<ResponseInterceptor>,
}

impl TransportBuilder {
    /// クライアント全体のタイムアウトを設定する
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// リクエストインターセプターを設定する
    pub fn request_interceptor(
        mut self,
        interceptor: impl Fn(RequestBuilder) -> RequestBuilder + Send + Sync + 'static,
    ) -> Self {
        self.request_interceptor = Some(Arc::new(interceptor));
        self
    }

    /// レスポンスインターセプターを設定する
    pub fn response_interceptor(
        mut self,
        interceptor: impl Fn(Response) -> Response + Send + Sync + 'static,
    ) -> Self {
        self.response_interceptor = Some(Arc::new(interceptor));
        self
    }

    /// トランスポートを構築する
    pub fn build(self) -> ServiceResult<Transport> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ServiceError::InvalidBaseUrl(self.base_url));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ServiceError::Http(format!("Failed to create HTTP client: {}", e)))?;

        debug!(base_url = %self.base_url, "Created transport");

        Ok(Transport {
            client,
            base_url: self.base_url,
            request_interceptor: self.request_interceptor,
            response_interceptor: self.response_interceptor,
        })
    }
}
