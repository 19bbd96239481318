//! Logical ids of the resources a stack can contain

pub const BUCKET: &str = "S3Bucket";
pub const BUCKET_POLICY: &str = "S3BucketPolicy";
pub const KEY: &str = "KmsKey";
pub const KEY_ALIAS: &str = "KmsKeyAlias";
pub const FUNCTION: &str = "WebsiteIndexPageForwardFunction";
pub const ACCESS_CONTROL: &str = "OriginAccessControl";
pub const ORIGIN_IDENTITY: &str = "OriginAccessIdentity";
pub const DISTRIBUTION: &str = "CloudFront";

pub const ACCESS_URL_OUTPUT: &str = "AccessURLOutput";

/// Id of the single distribution origin
pub const ORIGIN_ID: &str = "origin1";
