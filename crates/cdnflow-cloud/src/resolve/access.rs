//! Origin access control resolution

use cdnflow_core::OriginAccessControlConfig;
use serde_json::{Value, json};

pub const ORIGIN_TYPE: &str = "s3";
pub const SIGNING_BEHAVIOR: &str = "no-override";
pub const SIGNING_PROTOCOL: &str = "sigv4";

/// Signed access-control record binding the distribution to the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccessControl {
    pub name: String,
}

impl ResolvedAccessControl {
    pub fn properties(&self) -> Value {
        json!({
            "OriginAccessControlConfig": {
                "Name": self.name,
                "OriginAccessControlOriginType": ORIGIN_TYPE,
                "SigningBehavior": SIGNING_BEHAVIOR,
                "SigningProtocol": SIGNING_PROTOCOL,
            }
        })
    }
}

/// Decide whether origin access is restricted to the distribution.
///
/// A key in play forces restriction even without an explicit config. Through
/// [`synthesize`](crate::synthesize) that branch is unreachable, since
/// `cdnflow_core::validate` rejects a kms block without origin access control.
///
/// `None` leaves the stack to read the bucket through an origin access identity.
pub fn resolve_access_control(
    access: Option<&OriginAccessControlConfig>,
    key_in_play: bool,
    bucket_name: &str,
) -> Option<ResolvedAccessControl> {
    match access {
        Some(access) => Some(ResolvedAccessControl {
            name: access.name.clone(),
        }),
        None if key_in_play => {
            let name = format!("{}-oac", bucket_name);
            tracing::debug!("Key in play without origin access control, adding {}", name);
            Some(ResolvedAccessControl { name })
        }
        None => None,
    }
}
