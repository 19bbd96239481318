//! Bucket and key policy assembly

use crate::error::Result;
use crate::policy::{AccountRef, PolicyDocument, PolicyStatement, Principal};
use crate::resolve::ResolvedEncryption;
use serde_json::{Value, json};

pub const SID_DISTRIBUTION_READ: &str = "AllowCloudFrontServicePrincipalReadOnly";
pub const SID_IDENTITY_READ: &str = "AllowOriginAccessIdentityReadOnly";
pub const SID_KEY_ADMIN: &str = "EnableRootAccountKeyAdministration";
pub const SID_KEY_USE: &str = "AllowCloudFrontServicePrincipalKeyUse";
pub const SID_DENY_UNENCRYPTED: &str = "DenyUnencryptedObjectUploads";
pub const SID_DENY_WRONG_KEY: &str = "DenyObjectUploadsWithoutStackKey";

pub const SSE_HEADER: &str = "s3:x-amz-server-side-encryption";
pub const SSE_KEY_ID_HEADER: &str = "s3:x-amz-server-side-encryption-aws-kms-key-id";
pub const SOURCE_ARN: &str = "AWS:SourceArn";

pub const KEY_USE_ACTIONS: [&str; 3] = ["kms:Decrypt", "kms:Encrypt", "kms:GenerateDataKey*"];

/// Who reads objects from the origin on behalf of the distribution
#[derive(Debug, Clone, PartialEq)]
pub enum OriginReader {
    /// Requests signed through origin access control; `distribution_id` is the id, not the ARN
    Distribution { distribution_id: Value },
    /// Legacy origin access identity, granted by its canonical user id
    Identity { canonical_user: Value },
}

/// Template values the policies point at
#[derive(Debug, Clone)]
pub struct PolicyTargets {
    /// ARN of the bucket
    pub bucket_arn: Value,
    pub reader: OriginReader,
    pub account: AccountRef,
}

impl PolicyTargets {
    fn objects(&self) -> Value {
        crate::template::intrinsic::join(vec![self.bucket_arn.clone(), json!("/*")])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPolicies {
    pub bucket: PolicyDocument,
    /// Present only for a key owned by the stack
    pub key: Option<PolicyDocument>,
}

/// Policy granting the account root full administration of a key
pub fn key_admin_policy(account: &AccountRef) -> Result<PolicyDocument> {
    let mut doc = PolicyDocument::new();
    doc.add(
        PolicyStatement::allow(SID_KEY_ADMIN, Principal::account_root(account))
            .action("kms:*")
            .any_resource(),
    )?;
    Ok(doc)
}

/// Compose the bucket policy and, for an owned key, the key policy.
pub fn assemble(encryption: &ResolvedEncryption, targets: &PolicyTargets) -> Result<AssembledPolicies> {
    let mut bucket = PolicyDocument::new();
    let objects = targets.objects();

    let read = match &targets.reader {
        OriginReader::Distribution { distribution_id } => {
            PolicyStatement::allow(SID_DISTRIBUTION_READ, Principal::cloudfront()).condition(
                "StringEquals",
                SOURCE_ARN,
                targets.account.distribution_arn(distribution_id.clone()),
            )
        }
        OriginReader::Identity { canonical_user } => PolicyStatement::allow(
            SID_IDENTITY_READ,
            Principal::CanonicalUser(canonical_user.clone()),
        ),
    };
    bucket.add(read.action("s3:GetObject").resource(objects.clone()))?;

    let key = match encryption.key() {
        Some(key) if key.is_owned() => {
            let mut doc = key_admin_policy(&targets.account)?;
            let statement = KEY_USE_ACTIONS.iter().fold(
                PolicyStatement::allow(SID_KEY_USE, Principal::cloudfront()),
                |s, action| s.action(*action),
            );
            // Scoped to any distribution in the account: the key exists before the distribution id.
            doc.add(statement.any_resource().condition(
                "StringLike",
                SOURCE_ARN,
                targets.account.distribution_arn(json!("*")),
            ))?;
            Some(doc)
        }
        _ => None,
    };

    let deny = match encryption.key() {
        None => PolicyStatement::deny(SID_DENY_UNENCRYPTED, Principal::Any)
            .action("s3:PutObject")
            .resource(objects)
            .condition("StringNotEquals", SSE_HEADER, json!("aws:kms")),
        Some(key) => PolicyStatement::deny(SID_DENY_WRONG_KEY, Principal::Any)
            .action("s3:PutObject")
            .resource(objects)
            .condition("StringNotEquals", SSE_KEY_ID_HEADER, key.arn()),
    };
    bucket.add(deny)?;

    tracing::debug!(
        "Assembled {} bucket statement(s), key policy: {}",
        bucket.statements().len(),
        key.is_some()
    );
    Ok(AssembledPolicies { bucket, key })
}
