//! CloudFront 関連の設定モデル

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// function ソースのデフォルトディレクトリ
pub const DEFAULT_FUNCTION_DIR: &str = "function";

/// CloudFront ディストリビューションの設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontConfig {
    /// ディストリビューションのコメント
    #[serde(default)]
    pub comment: String,

    /// オリジンアクセスコントロール（未指定時はウェブサイトホスティング）
    #[serde(default)]
    pub origin_access_control: Option<OriginAccessControlConfig>,
}

/// オリジンアクセスコントロールの設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginAccessControlConfig {
    /// OACリソース名
    pub name: String,

    /// viewer-request に関連付ける function
    #[serde(default)]
    pub function_config: Option<FunctionConfig>,
}

/// CloudFront Function の設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfig {
    /// 関数名（環境プレフィックスなし）
    pub name: String,

    /// 既存関数のARN（指定時はビルドしない）
    #[serde(default)]
    pub arn: Option<String>,

    /// ソースディレクトリ（プロジェクトルートからの相対パス）
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
}

impl FunctionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// ソースディレクトリ（未指定時は `function`）
    pub fn source_dir(&self) -> PathBuf {
        self.source_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FUNCTION_DIR))
    }
}
