//! KMS 暗号化の設定モデル

use serde::{Deserialize, Serialize};

/// サーバーサイド暗号化の指定
///
/// `arn` / `alias` / `create_key` のうち1つだけを指定する。
/// どれも指定されていない場合は S3 管理の暗号化として扱う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KmsConfig {
    /// 既存キーのARN
    #[serde(default)]
    pub arn: Option<String>,

    /// 既存キーのエイリアス（create_key 時は作成するキーのエイリアス）
    #[serde(default)]
    pub alias: Option<String>,

    /// スタックでキーを作成する
    #[serde(default)]
    pub create_key: bool,
}

impl KmsConfig {
    /// いずれかの指定があるか
    pub fn is_effective(&self) -> bool {
        self.arn.is_some() || self.alias.is_some() || self.create_key
    }

    /// 指定されているフィールド名
    ///
    /// `create_key` と併用された `alias` は作成キーのエイリアスなので数えない。
    pub fn selected_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.arn.is_some() {
            fields.push("arn");
        }
        if self.create_key {
            fields.push("createKey");
        } else if self.alias.is_some() {
            fields.push("alias");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_kms_is_not_effective() {
        assert!(!KmsConfig::default().is_effective());
        assert!(KmsConfig::default().selected_fields().is_empty());
    }

    #[test]
    fn test_create_key_with_alias_is_single_selection() {
        let kms = KmsConfig {
            alias: Some("alias/site".to_string()),
            create_key: true,
            ..Default::default()
        };
        assert_eq!(kms.selected_fields(), vec!["createKey"]);
    }

    #[test]
    fn test_arn_and_alias_are_both_selected() {
        let kms = KmsConfig {
            arn: Some("arn:aws:kms:ap-northeast-1:123456789012:key/abc".to_string()),
            alias: Some("alias/site".to_string()),
            create_key: false,
        };
        assert_eq!(kms.selected_fields(), vec!["arn", "alias"]);
    }
}
