//! 統合ローダー
//!
//! 設定ファイルの形式判定、環境の選択、パースを統合

use crate::error::{FlowError, Result};
use crate::model::Config;
use crate::parser::{DEFAULT_ENVIRONMENT, parse_kdl_string};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// 設定ファイルをロード
///
/// 拡張子で形式を判定する（`.kdl` / `.json`）。
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_config(path: &Path, env: Option<&str>) -> Result<Config> {
    let content = fs::read_to_string(path)?;

    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("kdl") => {
            debug!("Parsing KDL config");
            parse_kdl_string(&content, env)?
        }
        Some("json") => {
            debug!("Parsing JSON context");
            parse_json_string(&content, env)?
        }
        _ => return Err(FlowError::UnsupportedFormat(path.to_path_buf())),
    };

    info!(
        stack = %config.stack_name,
        bucket = %config.bucket_name,
        environment = config.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT),
        "Config loaded"
    );
    Ok(config)
}

/// JSONコンテキストをパース
///
/// `cdk.json` 形式（`{"context": {"<env>": {...}}}`）と、
/// 環境名をキーとしたオブジェクトの両方を受け付ける。
pub fn parse_json_string(content: &str, env: Option<&str>) -> Result<Config> {
    let root: Value = serde_json::from_str(content)?;
    let environments = root.get("context").unwrap_or(&root);
    let target = env.unwrap_or(DEFAULT_ENVIRONMENT);

    let section = environments
        .get(target)
        .cloned()
        .ok_or_else(|| FlowError::EnvironmentNotFound(target.to_string()))?;

    let mut config: Config = serde_json::from_value(section)?;
    if let Some(env) = env {
        config.environment = Some(env.to_string());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CDK_JSON: &str = r#"{
        "app": "cdnflow synth",
        "context": {
            "default": {
                "stackName": "SiteStack",
                "bucketName": "site",
                "cloudfront": { "comment": "" }
            },
            "dev": {
                "stackName": "DevSiteStack",
                "bucketName": "dev-site",
                "cloudfront": {
                    "comment": "dev",
                    "originAccessControl": {
                        "name": "dev-site-oac",
                        "functionConfig": { "name": "index-forward" }
                    }
                },
                "kms": { "createKey": true },
                "tags": [{ "name": "Project", "value": "site" }]
            }
        }
    }"#;

    #[test]
    fn test_parse_json_default_environment() {
        let config = parse_json_string(CDK_JSON, None).unwrap();
        assert_eq!(config.stack_name, "SiteStack");
        assert_eq!(config.bucket_name, "site");
        assert!(config.environment.is_none());
    }

    #[test]
    fn test_parse_json_named_environment() {
        let config = parse_json_string(CDK_JSON, Some("dev")).unwrap();
        assert_eq!(config.bucket_name, "dev-site");
        assert_eq!(config.environment.as_deref(), Some("dev"));
        assert!(config.kms.unwrap().create_key);
        assert_eq!(config.tags.len(), 1);
    }

    #[test]
    fn test_parse_json_bare_environments() {
        let json = r#"{ "default": { "bucketName": "site" } }"#;
        let config = parse_json_string(json, None).unwrap();
        assert_eq!(config.bucket_name, "site");
    }

    #[test]
    fn test_parse_json_missing_environment() {
        let result = parse_json_string(CDK_JSON, Some("prod"));
        assert!(matches!(result, Err(FlowError::EnvironmentNotFound(_))));
    }

    #[test]
    fn test_load_config_dispatches_on_extension() {
        let temp_dir = tempdir().unwrap();

        let json_path = temp_dir.path().join("cdk.json");
        fs::write(&json_path, CDK_JSON).unwrap();
        let config = load_config(&json_path, Some("dev")).unwrap();
        assert_eq!(config.stack_name, "DevSiteStack");

        let kdl_path = temp_dir.path().join("cdnflow.kdl");
        fs::write(&kdl_path, r#"stack "KdlStack" { bucket "site" }"#).unwrap();
        let config = load_config(&kdl_path, None).unwrap();
        assert_eq!(config.stack_name, "KdlStack");
    }

    #[test]
    fn test_load_config_unsupported_format() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("cdnflow.yaml");
        fs::write(&path, "bucketName: site").unwrap();

        let result = load_config(&path, None);
        assert!(matches!(result, Err(FlowError::UnsupportedFormat(_))));
    }
}
