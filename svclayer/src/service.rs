//! サービスファサード
//!
//! レジストリとリクエストファクトリを束ね、
//! `service[module][endpoint]` のツリーを構築する。

use crate::error::ServiceResult;
use crate::registry::ModuleRegistry;
use crate::request::BoundEndpoint;
use crate::transport::Transport;
use std::collections::HashMap;
use svclayer_common::config::ServiceConfig;
use tracing::info;

/// サービスツリー
///
/// 起動時に一度だけ構築され、以後は読み取り専用。
/// 実行時の動的登録は提供しない。
pub struct Service {
    modules: HashMap<String, HashMap<String, BoundEndpoint>>,
}

impl Service {
    /// レジストリとトランスポートからサービスツリーを構築する
    ///
    /// 文字列のみの記述子はPOSTに、レコードは宣言どおりのメソッドと
    /// URLにバインドされる。
    pub fn build(registry: &ModuleRegistry, transport: &Transport) -> Self {
        let mut modules = HashMap::new();

        for (module, table) in registry.iter() {
            let mut endpoints = HashMap::new();
            for (name, descriptor) in table {
                let endpoint = BoundEndpoint::new(
                    transport.clone(),
                    descriptor.url(),
                    descriptor.method(),
                );
                endpoints.insert(name.clone(), endpoint);
            }
            modules.insert(module.clone(), endpoints);
        }

        let total: usize = modules.values().map(HashMap::len).sum();
        info!(modules = modules.len(), endpoints = total, "Service tree built");

        Self { modules }
    }

    /// 設定からサービスを構築する
    ///
    /// `module_dir` が設定されていればそのディレクトリの記述子を
    /// 読み込み、無ければ空のサービスを返す。
    pub fn from_config(config: &ServiceConfig) -> ServiceResult<Self> {
        let transport = Transport::new(config)?;
        let registry = match &config.module_dir {
            Some(dir) => ModuleRegistry::from_dir(dir)?,
            None => ModuleRegistry::default(),
        };
        Ok(Self::build(&registry, &transport))
    }

    /// エンドポイントを取得する
    pub fn endpoint(&self, module: &str, name: &str) -> Option<&BoundEndpoint> {
        self.modules.get(module)?.get(name)
    }

    /// モジュール内のエンドポイント表を取得する
    pub fn module(&self, name: &str) -> Option<&HashMap<String, BoundEndpoint>> {
        self.modules.get(name)
    }

    /// モジュール名のイテレータ
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// モジュール数
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// 総エンドポイント数
    pub fn endpoint_count(&self) -> usize {
        self.modules.values().map(HashMap::len).sum()
    }
}
