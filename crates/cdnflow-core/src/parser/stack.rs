//! stack ノードのパース

use super::{first_string, positional_strings, prop_string, required_string};
use crate::error::{FlowError, Result};
use crate::model::{
    CloudFrontConfig, Config, FunctionConfig, KmsConfig, OriginAccessControlConfig, Tag,
};
use kdl::KdlNode;
use std::path::PathBuf;

/// stack ノードをパース
pub fn parse_stack(node: &KdlNode) -> Result<Config> {
    let mut config = Config::default();
    if let Some(name) = first_string(node) {
        config.stack_name = name.to_string();
    }

    let Some(children) = node.children() else {
        return Ok(config);
    };

    for child in children.nodes() {
        match child.name().value() {
            "bucket" | "bucket-name" | "bucket_name" => {
                config.bucket_name = required_string(child, "bucket")?;
            }
            "account" => {
                config.account = first_string(child).map(|s| s.to_string());
            }
            "region" => {
                config.region = first_string(child).map(|s| s.to_string());
            }
            "cloudfront" => {
                config.cloudfront = parse_cloudfront(child)?;
            }
            "kms" => {
                config.kms = Some(parse_kms(child)?);
            }
            "tag" => {
                // 例: tag "Project" "site"
                let args = positional_strings(child);
                match args.as_slice() {
                    [name, value] => config.tags.push(Tag::new(*name, *value)),
                    _ => {
                        return Err(FlowError::InvalidConfig(
                            "tag requires a name and a value".to_string(),
                        ));
                    }
                }
            }
            "lookups" => {
                if let Some(lookups) = child.children() {
                    for lookup in lookups.nodes() {
                        if lookup.name().value() != "key-alias" {
                            continue;
                        }
                        if let [alias, arn] = positional_strings(lookup).as_slice() {
                            config
                                .key_alias_lookups
                                .insert(alias.to_string(), arn.to_string());
                        }
                    }
                }
            }
            other => {
                tracing::debug!(node = other, "Ignoring unknown stack node");
            }
        }
    }

    Ok(config)
}

/// cloudfront ノードをパース
fn parse_cloudfront(node: &KdlNode) -> Result<CloudFrontConfig> {
    let mut cloudfront = CloudFrontConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "comment" => {
                    cloudfront.comment = first_string(child).unwrap_or("").to_string();
                }
                "origin-access-control" | "origin_access_control" | "oac" => {
                    cloudfront.origin_access_control = Some(parse_origin_access_control(child)?);
                }
                _ => {}
            }
        }
    }

    Ok(cloudfront)
}

/// origin-access-control ノードをパース
fn parse_origin_access_control(node: &KdlNode) -> Result<OriginAccessControlConfig> {
    let mut oac = OriginAccessControlConfig {
        name: required_string(node, "origin-access-control")?,
        function_config: None,
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() == "function" {
                oac.function_config = Some(FunctionConfig {
                    name: required_string(child, "function")?,
                    arn: prop_string(child, "arn").map(|s| s.to_string()),
                    source_dir: prop_string(child, "source-dir").map(PathBuf::from),
                });
            }
        }
    }

    Ok(oac)
}

/// kms ノードをパース
///
/// `kms arn="..."` のようなプロパティ形式と子ノード形式の両方を受け付ける。
fn parse_kms(node: &KdlNode) -> Result<KmsConfig> {
    let mut kms = KmsConfig {
        arn: prop_string(node, "arn").map(|s| s.to_string()),
        alias: prop_string(node, "alias").map(|s| s.to_string()),
        create_key: false,
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "arn" => kms.arn = first_string(child).map(|s| s.to_string()),
                "alias" => kms.alias = first_string(child).map(|s| s.to_string()),
                "create-key" | "create_key" => {
                    // 引数なしの `create-key` は true とみなす
                    kms.create_key = child
                        .entries()
                        .first()
                        .map(|e| e.value().as_bool())
                        .unwrap_or(Some(true))
                        .ok_or_else(|| {
                            FlowError::InvalidConfig("create-key expects a boolean".to_string())
                        })?;
                }
                _ => {}
            }
        }
    }

    Ok(kms)
}
