//! KDLパーサー
//!
//! cdnflowのKDL設定ファイルをパースします。
//! 環境ごとに `stack` ノードを1つ記述し、`env` プロパティで区別します。
//!
//! ```kdl
//! stack "CdnStack" env="dev" {
//!     bucket "dev-site"
//!     cloudfront {
//!         comment "dev site"
//!         origin-access-control "dev-site-oac" {
//!             function "index-forward"
//!         }
//!     }
//!     kms {
//!         create-key #true
//!     }
//!     tag "Project" "site"
//! }
//! ```

mod stack;

use stack::parse_stack;

use crate::error::{FlowError, Result};
use crate::model::Config;
use kdl::{KdlDocument, KdlNode};

/// env 未指定時に選択される環境名
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// KDL文字列をパース
///
/// `env` に一致する `stack` ノードを選択する。`env` が未指定の場合は
/// `env="default"` または `env` プロパティのない `stack` ノードを選択する。
pub fn parse_kdl_string(content: &str, env: Option<&str>) -> Result<Config> {
    let doc: KdlDocument = content.parse()?;
    let target = env.unwrap_or(DEFAULT_ENVIRONMENT);

    for node in doc.nodes() {
        match node.name().value() {
            "stack" => {
                let stack_env = prop_string(node, "env").unwrap_or(DEFAULT_ENVIRONMENT);
                if stack_env != target {
                    tracing::debug!(env = stack_env, "Skipping stack for another environment");
                    continue;
                }
                let mut config = parse_stack(node)?;
                if let Some(env) = env {
                    config.environment = Some(env.to_string());
                }
                return Ok(config);
            }
            _ => {
                // 不明なノードはスキップ
            }
        }
    }

    Err(FlowError::EnvironmentNotFound(target.to_string()))
}

/// 最初の引数を文字列として取得
fn first_string(node: &KdlNode) -> Option<&str> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
}

/// 名前付きプロパティを文字列として取得
fn prop_string<'a>(node: &'a KdlNode, key: &str) -> Option<&'a str> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(key))
        .and_then(|e| e.value().as_string())
}

/// 位置引数を文字列として全て取得
fn positional_strings(node: &KdlNode) -> Vec<&str> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .collect()
}

/// 必須の文字列引数を取得
fn required_string(node: &KdlNode, what: &str) -> Result<String> {
    first_string(node)
        .map(|s| s.to_string())
        .ok_or_else(|| FlowError::InvalidConfig(format!("{} requires a name", what)))
}
