//! スタック定義
//!
//! 1つのデプロイ環境に対応するトップレベルの設定

use super::{CloudFrontConfig, FunctionConfig, KmsConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// デフォルトのスタック名
pub const DEFAULT_STACK_NAME: &str = "CdnStack";

/// トップレベルの設定
///
/// 一度読み込まれた後は変更されない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// スタック名（テンプレートのファイル名にも使われる）
    #[serde(default = "default_stack_name")]
    pub stack_name: String,

    /// オリジンとなるバケット名
    pub bucket_name: String,

    /// CloudFront の設定
    #[serde(default)]
    pub cloudfront: CloudFrontConfig,

    /// サーバーサイド暗号化の設定
    #[serde(default)]
    pub kms: Option<KmsConfig>,

    /// 環境名（リソース名のプレフィックス）
    #[serde(default)]
    pub environment: Option<String>,

    /// 全リソースに付与するタグ
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// デプロイ先アカウントID（未指定時は AWS::AccountId を参照）
    #[serde(default)]
    pub account: Option<String>,

    /// デプロイ先リージョン
    #[serde(default)]
    pub region: Option<String>,

    /// キーエイリアス → キーARN のルックアップ結果
    #[serde(default)]
    pub key_alias_lookups: BTreeMap<String, String>,
}

fn default_stack_name() -> String {
    DEFAULT_STACK_NAME.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stack_name: default_stack_name(),
            bucket_name: String::new(),
            cloudfront: CloudFrontConfig::default(),
            kms: None,
            environment: None,
            tags: Vec::new(),
            account: None,
            region: None,
            key_alias_lookups: BTreeMap::new(),
        }
    }
}

impl Config {
    /// origin-access-control に紐づく function 設定
    pub fn function_config(&self) -> Option<&FunctionConfig> {
        self.cloudfront
            .origin_access_control
            .as_ref()
            .and_then(|oac| oac.function_config.as_ref())
    }

    /// 環境プレフィックス
    pub fn environment_prefix(&self) -> Option<&str> {
        self.environment.as_deref().filter(|e| !e.is_empty())
    }
}

/// リソースに付与するタグ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 環境プレフィックスを付与した名前
///
/// `prefix` があれば `{prefix}-{base}`、なければ `base` をそのまま返す。
pub fn qualified_name(prefix: Option<&str>, base: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}-{}", p, base),
        _ => base.to_string(),
    }
}
