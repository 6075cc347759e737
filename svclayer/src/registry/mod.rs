//! モジュールレジストリ
//!
//! モジュール記述子を収集し、モジュール名 → エンドポイント表の
//! 対応を構築する。構築後は不変。

use crate::error::{ServiceError, ServiceResult};
use std::collections::HashMap;
use std::path::Path;
use svclayer_common::types::{ModuleFile, ModuleTable};
use tracing::debug;

/// モジュールレジストリ
///
/// モジュール名からエンドポイント表への読み取り専用マッピング。
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, ModuleTable>,
}

impl ModuleRegistry {
    /// ビルダーを生成
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// ディレクトリ直下の `*.json` 記述子からレジストリを構築する
    ///
    /// サブディレクトリには降りない。`.json` 以外の拡張子は無視する。
    /// 読めない・パースできない記述子と、モジュール名の重複は即エラー。
    pub fn from_dir(dir: impl AsRef<Path>) -> ServiceResult<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| ServiceError::DescriptorRead {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ServiceError::DescriptorRead {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        // 読み込み順をファイル名順に固定する
        paths.sort();

        let mut builder = Self::builder();
        for path in paths {
            let text =
                std::fs::read_to_string(&path).map_err(|e| ServiceError::DescriptorRead {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            let file: ModuleFile =
                serde_json::from_str(&text).map_err(|e| ServiceError::DescriptorRead {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            builder = builder.module_file(&stem, file, path.display().to_string());
        }
        builder.build()
    }

    /// モジュール表を取得する
    pub fn module(&self, name: &str) -> Option<&ModuleTable> {
        self.modules.get(name)
    }

    /// (モジュール名, エンドポイント表) のイテレータ
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ModuleTable)> {
        self.modules.iter()
    }

    /// モジュール数
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// モジュールが1件も無いかどうか
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// レジストリビルダー
///
/// 登録順を保持し、`build()` でモジュール名の重複を検出する。
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<(String, String, ModuleTable)>,
}

impl RegistryBuilder {
    /// モジュールを名前指定で登録する
    pub fn module(mut self, name: impl Into<String>, table: ModuleTable) -> Self {
        self.entries
            .push((name.into(), "builder".to_string(), table));
        self
    }

    /// 記述子ファイル1件分を登録する
    ///
    /// `module_name` 上書きがあればそれを、無ければファイル名
    /// （拡張子抜き）をモジュール名に使う。
    pub fn module_file(mut self, stem: &str, file: ModuleFile, origin: String) -> Self {
        let name = file.module_name.unwrap_or_else(|| stem.to_string());
        self.entries.push((name, origin, file.endpoints));
        self
    }

    /// レジストリを構築する
    ///
    /// モジュール名が重複した場合は `DuplicateModule` で即失敗する
    /// （後勝ちでの黙殺はしない）。
    pub fn build(self) -> ServiceResult<ModuleRegistry> {
        let mut modules = HashMap::new();
        let mut origins: HashMap<String, String> = HashMap::new();

        for (name, origin, table) in self.entries {
            if let Some(first) = origins.get(&name) {
                return Err(ServiceError::DuplicateModule {
                    name,
                    first: first.clone(),
                    second: origin,
                });
            }
            debug!(module = %name, endpoints = table.len(), "Registered API module");
            origins.insert(name.clone(), origin);
            modules.insert(name, table);
        }

        Ok(ModuleRegistry { modules })
    }
}
