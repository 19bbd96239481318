//! IAM-style policy documents
//!
//! Statements are checked when they are inserted into a [`PolicyDocument`]:
//! a wildcard resource or a wildcard principal is only accepted together
//! with a condition, unless the principal is the account root.

use crate::error::{CloudError, Result};
use crate::template::intrinsic;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const POLICY_VERSION: &str = "2012-10-17";
pub const CLOUDFRONT_SERVICE: &str = "cloudfront.amazonaws.com";

/// Account the stack is deployed into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    /// Account id given in the config
    Literal(String),
    /// Resolved by the deployment engine (`AWS::AccountId`)
    Deployment,
}

impl AccountRef {
    pub fn from_config(account: Option<&str>) -> Self {
        match account {
            Some(id) => AccountRef::Literal(id.to_string()),
            None => AccountRef::Deployment,
        }
    }

    pub fn value(&self) -> Value {
        match self {
            AccountRef::Literal(id) => Value::String(id.clone()),
            AccountRef::Deployment => intrinsic::reference(intrinsic::ACCOUNT_ID),
        }
    }

    /// `arn:aws:iam::<account>:root`
    pub fn root_arn(&self) -> Value {
        intrinsic::join(vec![json!("arn:aws:iam::"), self.value(), json!(":root")])
    }

    /// `arn:aws:cloudfront::<account>:distribution/<suffix>`
    pub fn distribution_arn(&self, suffix: Value) -> Value {
        intrinsic::join(vec![
            json!("arn:aws:cloudfront::"),
            self.value(),
            json!(":distribution/"),
            suffix,
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    /// `"*"`
    Any,
    /// `{"Service": "..."}`
    Service(String),
    /// `{"AWS": "arn:aws:iam::<account>:root"}`
    AccountRoot(Value),
    /// `{"CanonicalUser": "<id>"}`, used by origin access identities
    CanonicalUser(Value),
}

impl Principal {
    pub fn cloudfront() -> Self {
        Principal::Service(CLOUDFRONT_SERVICE.to_string())
    }

    pub fn account_root(account: &AccountRef) -> Self {
        Principal::AccountRoot(account.root_arn())
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Principal::Any => serializer.serialize_str("*"),
            Principal::Service(service) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Service", service)?;
                map.end()
            }
            Principal::AccountRoot(arn) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("AWS", arn)?;
                map.end()
            }
            Principal::CanonicalUser(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("CanonicalUser", id)?;
                map.end()
            }
        }
    }
}

/// Condition block: operator -> key -> value
pub type Conditions = BTreeMap<String, BTreeMap<String, Value>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyStatement {
    #[serde(rename = "Sid")]
    pub sid: String,

    #[serde(rename = "Effect")]
    pub effect: Effect,

    #[serde(rename = "Principal")]
    pub principal: Principal,

    #[serde(rename = "Action")]
    pub actions: Vec<String>,

    #[serde(rename = "Resource")]
    pub resources: Vec<Value>,

    #[serde(rename = "Condition", skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: Conditions,
}

impl PolicyStatement {
    fn new(sid: impl Into<String>, effect: Effect, principal: Principal) -> Self {
        Self {
            sid: sid.into(),
            effect,
            principal,
            actions: Vec::new(),
            resources: Vec::new(),
            conditions: BTreeMap::new(),
        }
    }

    pub fn allow(sid: impl Into<String>, principal: Principal) -> Self {
        Self::new(sid, Effect::Allow, principal)
    }

    pub fn deny(sid: impl Into<String>, principal: Principal) -> Self {
        Self::new(sid, Effect::Deny, principal)
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn resource(mut self, resource: Value) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn any_resource(self) -> Self {
        self.resource(json!("*"))
    }

    pub fn condition(mut self, operator: &str, key: &str, value: Value) -> Self {
        self.conditions
            .entry(operator.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self
    }

    pub fn has_wildcard_resource(&self) -> bool {
        self.resources.iter().any(|r| r.as_str() == Some("*"))
    }

    /// Value of a condition, if set
    pub fn condition_value(&self, operator: &str, key: &str) -> Option<&Value> {
        self.conditions.get(operator).and_then(|c| c.get(key))
    }

    fn check(&self) -> Result<()> {
        let reject = |reason: &str| {
            Err(CloudError::PolicyAssembly(format!(
                "statement '{}' {}",
                self.sid, reason
            )))
        };

        if self.actions.is_empty() {
            return reject("has no actions");
        }
        if self.resources.is_empty() {
            return reject("has no resources");
        }
        if self.effect == Effect::Allow && self.principal == Principal::Any {
            return reject("allows any principal");
        }

        let is_root = matches!(self.principal, Principal::AccountRoot(_));
        let is_wildcard = self.has_wildcard_resource() || self.principal == Principal::Any;
        if is_wildcard && !is_root && self.conditions.is_empty() {
            return reject("uses a wildcard without a condition");
        }
        Ok(())
    }
}

/// Ordered set of checked statements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    version: &'static str,

    #[serde(rename = "Statement")]
    statements: Vec<PolicyStatement>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self {
            version: POLICY_VERSION,
            statements: Vec::new(),
        }
    }

    /// Insert a statement after checking it. Sids must be unique.
    pub fn add(&mut self, statement: PolicyStatement) -> Result<()> {
        statement.check()?;
        if self.statements.iter().any(|s| s.sid == statement.sid) {
            return Err(CloudError::PolicyAssembly(format!(
                "duplicate statement id '{}'",
                statement.sid
            )));
        }
        self.statements.push(statement);
        Ok(())
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn statement(&self, sid: &str) -> Option<&PolicyStatement> {
        self.statements.iter().find(|s| s.sid == sid)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
