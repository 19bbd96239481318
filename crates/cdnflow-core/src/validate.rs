//! 設定の検証
//!
//! リソース構築の前に、曖昧な指定や不足しているフィールド、
//! 形式が不正な外部識別子を検出する。

use crate::error::{FlowError, IdentifierKind, Result};
use crate::model::{Config, qualified_name};
use regex::Regex;
use std::sync::LazyLock;

static BUCKET_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").expect("valid regex"));

static KEY_ARN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:aws[a-z-]*:kms:[a-z0-9-]+:\d{12}:key/(mrk-)?[0-9a-fA-F-]+$")
        .expect("valid regex")
});

static KEY_ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^alias/[a-zA-Z0-9/_-]{1,250}$").expect("valid regex"));

static FUNCTION_ARN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:aws[a-z-]*:cloudfront::\d{12}:function/[a-zA-Z0-9_-]{1,64}$")
        .expect("valid regex")
});

static FUNCTION_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").expect("valid regex"));

static ACCOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{12}$").expect("valid regex"));

/// 設定を検証
pub fn validate(config: &Config) -> Result<()> {
    if config.stack_name.trim().is_empty() {
        return Err(FlowError::InvalidConfig("stackName が空です".to_string()));
    }
    check(IdentifierKind::BucketName, &config.bucket_name, is_valid_bucket_name)?;

    if let Some(account) = &config.account
        && !ACCOUNT_RE.is_match(account)
    {
        return Err(FlowError::InvalidConfig(format!(
            "account は12桁の数字で指定してください: {}",
            account
        )));
    }

    if let Some(kms) = &config.kms {
        if !kms.is_effective() {
            tracing::warn!("kms ブロックに arn / alias / createKey がありません。S3管理の暗号化を使用します");
        } else {
            let selected = kms.selected_fields();
            if selected.len() > 1 {
                return Err(FlowError::AmbiguousEncryption(selected.join(", ")));
            }
            if config.cloudfront.origin_access_control.is_none() {
                return Err(FlowError::EncryptionWithoutAccessControl);
            }
            if let Some(arn) = &kms.arn {
                check(IdentifierKind::KeyArn, arn, is_valid_key_arn)?;
            }
            if let Some(alias) = &kms.alias {
                check(IdentifierKind::KeyAlias, &normalize_alias(alias), is_valid_key_alias)?;
            }
        }
    }

    if let Some(oac) = &config.cloudfront.origin_access_control {
        if oac.name.trim().is_empty() {
            return Err(FlowError::InvalidConfig(
                "origin-access-control の名前が空です".to_string(),
            ));
        }
        let function = oac
            .function_config
            .as_ref()
            .ok_or_else(|| FlowError::MissingFunctionConfig(oac.name.clone()))?;

        let name = qualified_name(config.environment_prefix(), &function.name);
        check(IdentifierKind::FunctionName, &name, is_valid_function_name)?;
        if let Some(arn) = &function.arn {
            check(IdentifierKind::FunctionArn, arn, is_valid_function_arn)?;
        }
    }

    if let Some(tag) = config.tags.iter().find(|t| t.name.trim().is_empty()) {
        return Err(FlowError::InvalidConfig(format!(
            "タグ名が空です (value: {})",
            tag.value
        )));
    }

    Ok(())
}

fn check(kind: IdentifierKind, value: &str, is_valid: fn(&str) -> bool) -> Result<()> {
    if is_valid(value) {
        Ok(())
    } else {
        Err(FlowError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

/// `alias/` プレフィックスを補完
pub fn normalize_alias(alias: &str) -> String {
    if alias.starts_with("alias/") {
        alias.to_string()
    } else {
        format!("alias/{}", alias)
    }
}

pub fn is_valid_bucket_name(name: &str) -> bool {
    BUCKET_NAME_RE.is_match(name) && !name.contains("..")
}

pub fn is_valid_key_arn(arn: &str) -> bool {
    KEY_ARN_RE.is_match(arn)
}

/// `alias/aws/` はAWSマネージドキー用に予約されている
pub fn is_valid_key_alias(alias: &str) -> bool {
    KEY_ALIAS_RE.is_match(alias) && !alias.starts_with("alias/aws/")
}

pub fn is_valid_function_arn(arn: &str) -> bool {
    FUNCTION_ARN_RE.is_match(arn)
}

pub fn is_valid_function_name(name: &str) -> bool {
    FUNCTION_NAME_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CloudFrontConfig, FunctionConfig, KmsConfig, OriginAccessControlConfig, Tag,
    };

    const KEY_ARN: &str =
        "arn:aws:kms:ap-northeast-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab";

    fn base_config() -> Config {
        Config {
            bucket_name: "site".to_string(),
            ..Default::default()
        }
    }

    fn with_oac(mut config: Config) -> Config {
        config.cloudfront = CloudFrontConfig {
            comment: String::new(),
            origin_access_control: Some(OriginAccessControlConfig {
                name: "site-oac".to_string(),
                function_config: Some(FunctionConfig::new("index-forward")),
            }),
        };
        config
    }

    #[test]
    fn test_minimal_config_is_valid() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_invalid_bucket_name() {
        let config = Config {
            bucket_name: "Invalid_Bucket".to_string(),
            ..Default::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(matches!(
            err,
            FlowError::InvalidIdentifier {
                kind: IdentifierKind::BucketName,
                ..
            }
        ));
        assert!(!err.is_resolution());
    }

    #[test]
    fn test_kms_requires_origin_access_control() {
        let mut config = base_config();
        config.kms = Some(KmsConfig {
            create_key: true,
            ..Default::default()
        });

        let result = validate(&config);
        assert!(matches!(result, Err(FlowError::EncryptionWithoutAccessControl)));
    }

    #[test]
    fn test_empty_kms_block_is_tolerated() {
        let mut config = base_config();
        config.kms = Some(KmsConfig::default());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_conflicting_kms_fields() {
        let mut config = with_oac(base_config());
        config.kms = Some(KmsConfig {
            arn: Some(KEY_ARN.to_string()),
            alias: None,
            create_key: true,
        });

        let result = validate(&config);
        assert!(matches!(result, Err(FlowError::AmbiguousEncryption(fields)) if fields == "arn, createKey"));
    }

    #[test]
    fn test_oac_requires_function() {
        let mut config = base_config();
        config.cloudfront.origin_access_control = Some(OriginAccessControlConfig {
            name: "site-oac".to_string(),
            function_config: None,
        });

        let result = validate(&config);
        assert!(matches!(result, Err(FlowError::MissingFunctionConfig(name)) if name == "site-oac"));
    }

    #[test]
    fn test_invalid_key_arn_is_resolution_error() {
        let mut config = with_oac(base_config());
        config.kms = Some(KmsConfig {
            arn: Some("arn:aws:s3:::not-a-key".to_string()),
            ..Default::default()
        });

        let err = validate(&config).unwrap_err();
        assert!(matches!(
            err,
            FlowError::InvalidIdentifier {
                kind: IdentifierKind::KeyArn,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_function_arn() {
        let mut config = with_oac(base_config());
        if let Some(oac) = config.cloudfront.origin_access_control.as_mut() {
            oac.function_config = Some(FunctionConfig {
                arn: Some("arn:aws:lambda:us-east-1:123456789012:function:edge".to_string()),
                ..FunctionConfig::new("index-forward")
            });
        }

        let err = validate(&config).unwrap_err();
        assert!(err.is_resolution());
    }

    #[test]
    fn test_qualified_function_name_too_long() {
        let mut config = with_oac(base_config());
        config.environment = Some("x".repeat(60));

        let err = validate(&config).unwrap_err();
        assert!(matches!(
            err,
            FlowError::InvalidIdentifier {
                kind: IdentifierKind::FunctionName,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_tag_name() {
        let mut config = base_config();
        config.tags.push(Tag::new("", "value"));
        assert!(matches!(validate(&config), Err(FlowError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_account() {
        let mut config = base_config();
        config.account = Some("1234".to_string());
        assert!(matches!(validate(&config), Err(FlowError::InvalidConfig(_))));
    }

    #[test]
    fn test_alias_format() {
        assert_eq!(normalize_alias("site"), "alias/site");
        assert_eq!(normalize_alias("alias/site"), "alias/site");
        assert!(is_valid_key_alias("alias/site-key"));
        assert!(!is_valid_key_alias("alias/aws/s3"));
        assert!(!is_valid_key_alias("alias/has space"));
    }

    #[test]
    fn test_identifier_formats() {
        assert!(is_valid_key_arn(KEY_ARN));
        assert!(is_valid_key_arn(
            "arn:aws:kms:us-east-1:123456789012:key/mrk-1234abcd12ab34cd56ef1234567890ab"
        ));
        assert!(!is_valid_key_arn("1234abcd-12ab-34cd-56ef-1234567890ab"));
        assert!(is_valid_function_arn(
            "arn:aws:cloudfront::123456789012:function/index-forward"
        ));
        assert!(is_valid_bucket_name("my.site-bucket"));
        assert!(!is_valid_bucket_name("ab"));
        assert!(!is_valid_bucket_name("my..site"));
    }
}
