//! Bucket encryption resolution

use crate::error::{CloudError, Result};
use crate::logical_id;
use crate::template::intrinsic;
use cdnflow_core::{Config, KmsConfig, is_valid_key_alias, is_valid_key_arn, normalize_alias};
use serde_json::Value;
use std::collections::BTreeMap;

/// How objects in the bucket are encrypted at rest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedEncryption {
    /// Platform-managed keys (SSE-S3)
    DefaultManaged,
    /// A KMS key (SSE-KMS)
    KeyManaged { key: KeyRef },
}

impl ResolvedEncryption {
    pub fn key(&self) -> Option<&KeyRef> {
        match self {
            ResolvedEncryption::DefaultManaged => None,
            ResolvedEncryption::KeyManaged { key } => Some(key),
        }
    }

    pub fn is_key_managed(&self) -> bool {
        self.key().is_some()
    }
}

/// Key used for bucket encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRef {
    /// Created by this stack and destroyed with it
    Owned { alias: Option<String> },
    /// Existing key. The stack holds no lifecycle rights over it.
    Referenced { arn: String, via_alias: Option<String> },
}

impl KeyRef {
    pub fn is_owned(&self) -> bool {
        matches!(self, KeyRef::Owned { .. })
    }

    /// ARN of the key, as a template value
    pub fn arn(&self) -> Value {
        match self {
            KeyRef::Owned { .. } => intrinsic::get_att(logical_id::KEY, "Arn"),
            KeyRef::Referenced { arn, .. } => Value::String(arn.clone()),
        }
    }
}

/// Resolves key aliases to key ARNs
pub trait KeyLookup {
    fn lookup_alias(&self, alias: &str) -> Result<String>;
}

/// Alias lookups served from the `lookups` table of the config
#[derive(Debug, Clone, Default)]
pub struct ContextKeyLookup {
    aliases: BTreeMap<String, String>,
}

impl ContextKeyLookup {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|(alias, arn)| (normalize_alias(&alias), arn))
            .collect();
        Self { aliases }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.key_alias_lookups.clone())
    }
}

impl KeyLookup for ContextKeyLookup {
    fn lookup_alias(&self, alias: &str) -> Result<String> {
        self.aliases.get(alias).cloned().ok_or_else(|| {
            CloudError::Resolution(format!(
                "no key found for {} (add it to the lookups table)",
                alias
            ))
        })
    }
}

/// Decide the bucket encryption mode.
///
/// When several fields are set, `arn` wins over `createKey`, which wins over `alias`.
pub fn resolve_encryption(
    kms: Option<&KmsConfig>,
    lookup: &dyn KeyLookup,
) -> Result<ResolvedEncryption> {
    let Some(kms) = kms else {
        tracing::debug!("No kms block, using default-managed encryption");
        return Ok(ResolvedEncryption::DefaultManaged);
    };

    if let Some(arn) = &kms.arn {
        let arn = checked_arn(arn)?;
        tracing::debug!("Referencing key {}", arn);
        return Ok(ResolvedEncryption::KeyManaged {
            key: KeyRef::Referenced {
                arn,
                via_alias: None,
            },
        });
    }

    if kms.create_key {
        let alias = kms.alias.as_deref().map(normalize_alias);
        if let Some(alias) = &alias
            && !is_valid_key_alias(alias)
        {
            return Err(CloudError::Resolution(format!("invalid key alias: {}", alias)));
        }
        tracing::debug!("Creating a new key (alias: {:?})", alias);
        return Ok(ResolvedEncryption::KeyManaged {
            key: KeyRef::Owned { alias },
        });
    }

    if let Some(alias) = &kms.alias {
        let alias = normalize_alias(alias);
        if !is_valid_key_alias(&alias) {
            return Err(CloudError::Resolution(format!("invalid key alias: {}", alias)));
        }
        let arn = checked_arn(&lookup.lookup_alias(&alias)?)?;
        tracing::debug!("Resolved {} to {}", alias, arn);
        return Ok(ResolvedEncryption::KeyManaged {
            key: KeyRef::Referenced {
                arn,
                via_alias: Some(alias),
            },
        });
    }

    tracing::debug!("Empty kms block, using default-managed encryption");
    Ok(ResolvedEncryption::DefaultManaged)
}

fn checked_arn(arn: &str) -> Result<String> {
    if is_valid_key_arn(arn) {
        Ok(arn.to_string())
    } else {
        Err(CloudError::Resolution(format!("invalid key ARN: {}", arn)))
    }
}
