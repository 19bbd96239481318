//! Stack orchestration
//!
//! [`synthesize`] runs the resolvers in a fixed order and materializes their
//! decisions into a [`Template`] through [`StackBuilder`].

use crate::action::{Action, Plan};
use crate::assemble::{
    AssembledPolicies, OriginReader, PolicyTargets, assemble, key_admin_policy,
};
use crate::edge::INDEX_DOCUMENT;
use crate::error::Result;
use crate::logical_id;
use crate::policy::AccountRef;
use crate::resolve::{
    KeyLookup, KeyRef, ResolvedAccessControl, ResolvedEncryption, ResolvedFunction,
    plan_function, prepare_function, resolve_access_control, resolve_encryption,
    resolve_function,
};
use crate::template::{Output, Resource, Template, intrinsic, tag_list};
use cdnflow_build::ArtifactBuilder;
use cdnflow_core::{Config, validate};
use serde::Serialize;
use serde_json::{Value, json};

pub const BUCKET_TYPE: &str = "AWS::S3::Bucket";
pub const BUCKET_POLICY_TYPE: &str = "AWS::S3::BucketPolicy";
pub const KEY_TYPE: &str = "AWS::KMS::Key";
pub const KEY_ALIAS_TYPE: &str = "AWS::KMS::Alias";
pub const FUNCTION_TYPE: &str = "AWS::CloudFront::Function";
pub const ACCESS_CONTROL_TYPE: &str = "AWS::CloudFront::OriginAccessControl";
pub const ORIGIN_IDENTITY_TYPE: &str = "AWS::CloudFront::CloudFrontOriginAccessIdentity";
pub const DISTRIBUTION_TYPE: &str = "AWS::CloudFront::Distribution";

pub const FUNCTION_RUNTIME: &str = "cloudfront-js-1.0";
pub const FUNCTION_EVENT_TYPE: &str = "viewer-request";

/// Tag telling the deployment engine to empty the bucket before deleting it
pub const AUTO_DELETE_TAG: (&str, &str) = ("cdnflow:auto-delete-objects", "true");

/// Orchestration steps, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Validated,
    Built,
    EncryptionResolved,
    StorageCreated,
    FunctionResolved,
    DistributionCreated,
    AccessControlAttached,
    PoliciesAttached,
    OutputEmitted,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Step::Validated => "validate",
            Step::Built => "build",
            Step::EncryptionResolved => "resolve encryption",
            Step::StorageCreated => "create storage",
            Step::FunctionResolved => "resolve function",
            Step::DistributionCreated => "create distribution",
            Step::AccessControlAttached => "attach access control",
            Step::PoliciesAttached => "attach policies",
            Step::OutputEmitted => "emit output",
        };
        write!(f, "{}", label)
    }
}

/// Result of a synthesis pass
#[derive(Debug, Clone)]
pub struct SynthesizedStack {
    pub stack_name: String,
    pub template: Template,
    pub encryption: ResolvedEncryption,
    pub function: Option<ResolvedFunction>,
    pub access_control: Option<ResolvedAccessControl>,
    pub policies: AssembledPolicies,
    /// Steps that ran, in order
    pub steps: Vec<Step>,
}

impl SynthesizedStack {
    /// Access URL, with unresolved attributes rendered as `${Id.Attr}`
    pub fn access_url(&self) -> String {
        self.template
            .outputs
            .get(logical_id::ACCESS_URL_OUTPUT)
            .map(Output::render)
            .unwrap_or_default()
    }

    pub fn template_file_name(&self) -> String {
        format!("{}.template.json", self.stack_name)
    }

    pub fn step_index(&self, step: Step) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }

    /// Resources this stack creates or references
    pub fn plan(&self) -> Plan {
        let mut actions: Vec<Action> = self
            .template
            .resources
            .iter()
            .map(|(id, resource)| Action::create(id, &resource.resource_type, describe(id)))
            .collect();

        if let Some(KeyRef::Referenced { arn, via_alias }) = self.encryption.key() {
            let description = match via_alias {
                Some(alias) => format!("Encrypt objects with existing key {} ({})", alias, arn),
                None => format!("Encrypt objects with existing key {}", arn),
            };
            actions.push(
                Action::reference(logical_id::KEY, KEY_TYPE, description)
                    .with_detail("arn", json!(arn)),
            );
        }
        if let Some(ResolvedFunction::Referenced { name, arn }) = &self.function {
            actions.push(
                Action::reference(
                    logical_id::FUNCTION,
                    FUNCTION_TYPE,
                    format!("Associate existing function {}", name),
                )
                .with_detail("arn", json!(arn)),
            );
        }

        Plan::new(actions)
    }
}

fn describe(id: &str) -> String {
    match id {
        logical_id::BUCKET => "Origin bucket".to_string(),
        logical_id::BUCKET_POLICY => "Bucket policy".to_string(),
        logical_id::KEY => "Encryption key".to_string(),
        logical_id::KEY_ALIAS => "Encryption key alias".to_string(),
        logical_id::FUNCTION => "Viewer-request edge function".to_string(),
        logical_id::ACCESS_CONTROL => "Origin access control".to_string(),
        logical_id::ORIGIN_IDENTITY => "Origin access identity".to_string(),
        logical_id::DISTRIBUTION => "Distribution".to_string(),
        other => other.to_string(),
    }
}

/// Materializes resolver decisions into template resources
pub struct StackBuilder {
    template: Template,
    account: AccountRef,
    tags: Vec<(String, String)>,
}

impl StackBuilder {
    pub fn new(config: &Config) -> Self {
        let tags = config
            .tags
            .iter()
            .map(|t| (t.name.clone(), t.value.clone()))
            .collect();
        Self {
            template: Template::new(),
            account: AccountRef::from_config(config.account.as_deref()),
            tags,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    fn tagged(&self, mut properties: Value, extra: &[(&str, &str)]) -> Value {
        let mut tags: Vec<(String, String)> = extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        tags.extend(self.tags.iter().cloned());
        if !tags.is_empty() {
            properties["Tags"] = tag_list(&tags);
        }
        properties
    }

    /// Add the key when it is owned by the stack. Referenced keys add nothing.
    pub fn add_key(&mut self, key: &KeyRef) -> Result<()> {
        let KeyRef::Owned { alias } = key else {
            return Ok(());
        };

        let properties = self.tagged(
            json!({
                "Description": "Origin bucket encryption key",
                "EnableKeyRotation": true,
                "KeyPolicy": key_admin_policy(&self.account)?.to_value()?,
            }),
            &[],
        );
        self.template.add_resource(
            logical_id::KEY,
            Resource::new(KEY_TYPE, properties).destroy_with_stack(),
        )?;

        if let Some(alias) = alias {
            self.template.add_resource(
                logical_id::KEY_ALIAS,
                Resource::new(
                    KEY_ALIAS_TYPE,
                    json!({
                        "AliasName": alias,
                        "TargetKeyId": intrinsic::reference(logical_id::KEY),
                    }),
                )
                .destroy_with_stack(),
            )?;
        }
        Ok(())
    }

    /// Add the origin bucket. `website` serves `index.html` as the index document.
    pub fn add_bucket(
        &mut self,
        bucket_name: &str,
        encryption: &ResolvedEncryption,
        website: bool,
    ) -> Result<()> {
        let rule = match encryption {
            ResolvedEncryption::DefaultManaged => json!({
                "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" }
            }),
            ResolvedEncryption::KeyManaged { key } => json!({
                "ServerSideEncryptionByDefault": {
                    "SSEAlgorithm": "aws:kms",
                    "KMSMasterKeyID": key.arn(),
                },
                "BucketKeyEnabled": true
            }),
        };

        let mut properties = json!({
            "BucketName": bucket_name,
            "AccessControl": "Private",
            "BucketEncryption": { "ServerSideEncryptionConfiguration": [rule] },
            "PublicAccessBlockConfiguration": {
                "BlockPublicAcls": true,
                "BlockPublicPolicy": true,
                "IgnorePublicAcls": true,
                "RestrictPublicBuckets": true
            }
        });
        if website {
            properties["WebsiteConfiguration"] = json!({ "IndexDocument": INDEX_DOCUMENT });
        }
        let properties = self.tagged(properties, &[AUTO_DELETE_TAG]);

        self.template.add_resource(
            logical_id::BUCKET,
            Resource::new(BUCKET_TYPE, properties).destroy_with_stack(),
        )
    }

    /// Register an owned function. Referenced functions add nothing.
    pub fn add_function(&mut self, function: &ResolvedFunction) -> Result<()> {
        let ResolvedFunction::Owned { name, code } = function else {
            return Ok(());
        };
        self.template.add_resource(
            logical_id::FUNCTION,
            Resource::new(
                FUNCTION_TYPE,
                json!({
                    "Name": name,
                    "AutoPublish": true,
                    "FunctionCode": code,
                    "FunctionConfig": {
                        "Comment": name,
                        "Runtime": FUNCTION_RUNTIME
                    }
                }),
            ),
        )
    }

    pub fn add_distribution(
        &mut self,
        comment: &str,
        function: Option<&ResolvedFunction>,
    ) -> Result<()> {
        let mut behavior = json!({
            "TargetOriginId": logical_id::ORIGIN_ID,
            "ViewerProtocolPolicy": "redirect-to-https",
            "AllowedMethods": ["GET", "HEAD"],
            "CachedMethods": ["GET", "HEAD"],
            "Compress": true,
            "MinTTL": 0,
            "DefaultTTL": 3600,
            "MaxTTL": 86400,
            "ForwardedValues": {
                "QueryString": false,
                "Cookies": { "Forward": "none" }
            }
        });
        if let Some(function) = function {
            behavior["FunctionAssociations"] = json!([{
                "EventType": FUNCTION_EVENT_TYPE,
                "FunctionARN": function.arn(),
            }]);
        }

        let properties = self.tagged(
            json!({
                "DistributionConfig": {
                    "Comment": comment,
                    "Enabled": true,
                    "DefaultRootObject": INDEX_DOCUMENT,
                    "HttpVersion": "http2and3",
                    "IPV6Enabled": true,
                    "PriceClass": "PriceClass_100",
                    "ViewerCertificate": { "CloudFrontDefaultCertificate": true },
                    "Origins": [{
                        "Id": logical_id::ORIGIN_ID,
                        "DomainName": intrinsic::get_att(logical_id::BUCKET, "RegionalDomainName"),
                        "ConnectionAttempts": 3,
                        "ConnectionTimeout": 10,
                        "S3OriginConfig": {}
                    }],
                    "DefaultCacheBehavior": behavior
                }
            }),
            &[],
        );

        self.template.add_resource(
            logical_id::DISTRIBUTION,
            Resource::new(DISTRIBUTION_TYPE, properties),
        )
    }

    /// Add the access control record and point the distribution origin at it
    pub fn attach_access_control(&mut self, access: &ResolvedAccessControl) -> Result<()> {
        self.template.add_resource(
            logical_id::ACCESS_CONTROL,
            Resource::new(ACCESS_CONTROL_TYPE, access.properties()),
        )?;

        let distribution = self.template.resource_mut(logical_id::DISTRIBUTION)?;
        distribution.add_property_override(
            "DistributionConfig.Origins.0.OriginAccessControlId",
            intrinsic::get_att(logical_id::ACCESS_CONTROL, "Id"),
        )?;
        distribution.add_property_override(
            "DistributionConfig.Origins.0.S3OriginConfig.OriginAccessIdentity",
            json!(""),
        )
    }

    /// Read the bucket through a legacy origin access identity
    pub fn attach_origin_identity(&mut self, bucket_name: &str) -> Result<()> {
        self.template.add_resource(
            logical_id::ORIGIN_IDENTITY,
            Resource::new(
                ORIGIN_IDENTITY_TYPE,
                json!({
                    "CloudFrontOriginAccessIdentityConfig": {
                        "Comment": format!("Identity for {}", bucket_name)
                    }
                }),
            ),
        )?;

        self.template
            .resource_mut(logical_id::DISTRIBUTION)?
            .add_property_override(
                "DistributionConfig.Origins.0.S3OriginConfig.OriginAccessIdentity",
                intrinsic::join(vec![
                    json!("origin-access-identity/cloudfront/"),
                    intrinsic::reference(logical_id::ORIGIN_IDENTITY),
                ]),
            )
    }

    /// Policy targets, reading through whichever origin access was attached
    pub fn policy_targets(&self) -> PolicyTargets {
        let reader = if self.template.resource(logical_id::ACCESS_CONTROL).is_some() {
            OriginReader::Distribution {
                distribution_id: intrinsic::reference(logical_id::DISTRIBUTION),
            }
        } else {
            OriginReader::Identity {
                canonical_user: intrinsic::get_att(logical_id::ORIGIN_IDENTITY, "S3CanonicalUserId"),
            }
        };
        PolicyTargets {
            bucket_arn: intrinsic::get_att(logical_id::BUCKET, "Arn"),
            reader,
            account: self.account.clone(),
        }
    }

    /// Attach the bucket policy, and replace the key policy of an owned key
    pub fn attach_policies(&mut self, policies: &AssembledPolicies) -> Result<()> {
        self.template.add_resource(
            logical_id::BUCKET_POLICY,
            Resource::new(
                BUCKET_POLICY_TYPE,
                json!({
                    "Bucket": intrinsic::reference(logical_id::BUCKET),
                    "PolicyDocument": policies.bucket.to_value()?,
                }),
            ),
        )?;

        if let Some(key_policy) = &policies.key {
            self.template
                .resource_mut(logical_id::KEY)?
                .add_property_override("KeyPolicy", key_policy.to_value()?)?;
        }
        Ok(())
    }

    /// `AccessURLOutput = https://<distribution domain>`
    pub fn emit_output(&mut self) {
        let mut output = Output::new(intrinsic::join(vec![
            json!("https://"),
            intrinsic::get_att(logical_id::DISTRIBUTION, "DomainName"),
        ]));
        output.description = Some("Distribution access URL".to_string());
        self.template
            .add_output(logical_id::ACCESS_URL_OUTPUT, output);
    }

    pub fn finish(self) -> Template {
        self.template
    }
}

/// Turn a config into a stack template in a single pass.
///
/// The build runs before any resource is described; any failure aborts the pass.
#[tracing::instrument(skip_all, fields(stack = %config.stack_name))]
pub fn synthesize(
    config: &Config,
    builder: &dyn ArtifactBuilder,
    lookup: &dyn KeyLookup,
) -> Result<SynthesizedStack> {
    let mut steps = Vec::new();

    validate(config)?;
    steps.push(Step::Validated);

    let function_plan = plan_function(config.function_config(), config.environment_prefix())?;
    if let Some(plan) = &function_plan
        && prepare_function(plan, builder)?
    {
        tracing::info!("Built edge function {}", plan.name);
        steps.push(Step::Built);
    }

    let encryption = resolve_encryption(config.kms.as_ref(), lookup)?;
    steps.push(Step::EncryptionResolved);

    let mut stack = StackBuilder::new(config);
    if let Some(key) = encryption.key() {
        stack.add_key(key)?;
    }
    stack.add_bucket(&config.bucket_name, &encryption, function_plan.is_none())?;
    steps.push(Step::StorageCreated);

    let function = function_plan
        .map(|plan| resolve_function(plan, builder))
        .transpose()?;
    if let Some(function) = &function {
        stack.add_function(function)?;
        steps.push(Step::FunctionResolved);
    }

    stack.add_distribution(&config.cloudfront.comment, function.as_ref())?;
    steps.push(Step::DistributionCreated);

    let access_control = resolve_access_control(
        config.cloudfront.origin_access_control.as_ref(),
        encryption.is_key_managed(),
        &config.bucket_name,
    );
    match &access_control {
        Some(access) => stack.attach_access_control(access)?,
        None => stack.attach_origin_identity(&config.bucket_name)?,
    }
    steps.push(Step::AccessControlAttached);

    let policies = assemble(&encryption, &stack.policy_targets())?;
    stack.attach_policies(&policies)?;
    steps.push(Step::PoliciesAttached);

    stack.emit_output();
    steps.push(Step::OutputEmitted);

    tracing::info!(
        "Synthesized {} resource(s)",
        stack.template().resources.len()
    );

    Ok(SynthesizedStack {
        stack_name: config.stack_name.clone(),
        template: stack.finish(),
        encryption,
        function,
        access_control,
        policies,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdnflow_core::Tag;

    fn config() -> Config {
        Config {
            bucket_name: "site".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_owned_key_with_alias() {
        let mut stack = StackBuilder::new(&config());
        stack
            .add_key(&KeyRef::Owned {
                alias: Some("alias/site".to_string()),
            })
            .unwrap();

        let template = stack.finish();
        let key = template.resource(logical_id::KEY).unwrap();
        assert_eq!(key.property("EnableKeyRotation"), Some(&json!(true)));
        assert_eq!(
            key.deletion_policy,
            Some(crate::template::DeletionPolicy::Delete)
        );
        let alias = template.resource(logical_id::KEY_ALIAS).unwrap();
        assert_eq!(alias.property("AliasName"), Some(&json!("alias/site")));
    }

    #[test]
    fn test_referenced_key_adds_nothing() {
        let mut stack = StackBuilder::new(&config());
        stack
            .add_key(&KeyRef::Referenced {
                arn: "arn:aws:kms:us-east-1:123456789012:key/abcd".to_string(),
                via_alias: None,
            })
            .unwrap();
        assert!(stack.finish().resources.is_empty());
    }

    #[test]
    fn test_tags_applied_to_bucket() {
        let config = Config {
            tags: vec![Tag::new("team", "web")],
            ..config()
        };
        let mut stack = StackBuilder::new(&config);
        stack
            .add_bucket("site", &ResolvedEncryption::DefaultManaged, true)
            .unwrap();

        let template = stack.finish();
        let bucket = template.resource(logical_id::BUCKET).unwrap();
        assert_eq!(
            bucket.property("Tags"),
            Some(&json!([
                { "Key": "cdnflow:auto-delete-objects", "Value": "true" },
                { "Key": "team", "Value": "web" }
            ]))
        );
    }

    #[test]
    fn test_access_control_requires_distribution() {
        let mut stack = StackBuilder::new(&config());
        let result = stack.attach_access_control(&ResolvedAccessControl {
            name: "site-oac".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_origin_identity_points_origin_and_policy_at_identity() {
        let mut stack = StackBuilder::new(&config());
        stack.add_distribution("", None).unwrap();
        stack.attach_origin_identity("site").unwrap();

        match stack.policy_targets().reader {
            OriginReader::Identity { canonical_user } => assert_eq!(
                canonical_user,
                intrinsic::get_att(logical_id::ORIGIN_IDENTITY, "S3CanonicalUserId")
            ),
            other => panic!("expected identity reader, got {:?}", other),
        }

        let template = stack.finish();
        let identity = template.resource(logical_id::ORIGIN_IDENTITY).unwrap();
        assert_eq!(identity.resource_type, ORIGIN_IDENTITY_TYPE);
        let distribution = template.resource(logical_id::DISTRIBUTION).unwrap();
        assert_eq!(
            distribution.property("DistributionConfig.Origins.0.S3OriginConfig.OriginAccessIdentity"),
            Some(&json!({ "Fn::Join": ["", [
                "origin-access-identity/cloudfront/",
                { "Ref": "OriginAccessIdentity" }
            ]]}))
        );
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::Built.to_string(), "build");
        assert_eq!(Step::PoliciesAttached.to_string(), "attach policies");
    }
}
