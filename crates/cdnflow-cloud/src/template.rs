//! Deployment template model
//!
//! A template is a write-once description of the resources a stack needs,
//! serialized in the CloudFormation JSON layout and handed to a
//! deployment engine for materialization.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Full stack template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    /// Resources indexed by logical id
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, Resource>,

    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty", default)]
    pub outputs: BTreeMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

impl Template {
    pub fn new() -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: None,
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Add a resource. Logical ids are write-once.
    pub fn add_resource(&mut self, logical_id: impl Into<String>, resource: Resource) -> Result<()> {
        let logical_id = logical_id.into();
        if self.resources.contains_key(&logical_id) {
            return Err(CloudError::Template(format!(
                "duplicate logical id: {}",
                logical_id
            )));
        }
        self.resources.insert(logical_id, resource);
        Ok(())
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resource_mut(&mut self, logical_id: &str) -> Result<&mut Resource> {
        self.resources
            .get_mut(logical_id)
            .ok_or_else(|| CloudError::Template(format!("unknown logical id: {}", logical_id)))
    }

    pub fn add_output(&mut self, name: impl Into<String>, output: Output) {
        self.outputs.insert(name.into(), output);
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What happens to a resource when the stack is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionPolicy {
    Delete,
}

/// A single resource description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    #[serde(rename = "Properties")]
    pub properties: Value,

    #[serde(rename = "DeletionPolicy", skip_serializing_if = "Option::is_none", default)]
    pub deletion_policy: Option<DeletionPolicy>,

    #[serde(rename = "UpdateReplacePolicy", skip_serializing_if = "Option::is_none", default)]
    pub update_replace_policy: Option<DeletionPolicy>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    /// Destroy the resource together with the stack
    pub fn destroy_with_stack(mut self) -> Self {
        self.deletion_policy = Some(DeletionPolicy::Delete);
        self.update_replace_policy = Some(DeletionPolicy::Delete);
        self
    }

    /// Look up a property by dotted path (`A.B.0.C`)
    pub fn property(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.properties, |current, segment| match current {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Value::Object(map) => map.get(segment),
            _ => None,
        })
    }

    /// Overwrite a property by dotted path, creating intermediate objects.
    ///
    /// Numeric segments index into existing arrays; indexing past the end is an error.
    pub fn add_property_override(&mut self, path: &str, value: Value) -> Result<()> {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| CloudError::Template("empty override path".to_string()))?;

        let mut current = &mut self.properties;
        for segment in parents {
            current = step_into(current, segment, path)?;
        }

        match current {
            Value::Array(items) => {
                let slot = last
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get_mut(i))
                    .ok_or_else(|| bad_override(path))?;
                *slot = value;
            }
            Value::Object(map) => {
                map.insert(last.to_string(), value);
            }
            _ => return Err(bad_override(path)),
        }
        Ok(())
    }
}

fn step_into<'a>(current: &'a mut Value, segment: &str, path: &str) -> Result<&'a mut Value> {
    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get_mut(i))
            .ok_or_else(|| bad_override(path)),
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))),
        _ => Err(bad_override(path)),
    }
}

fn bad_override(path: &str) -> CloudError {
    CloudError::Template(format!("cannot apply property override at {}", path))
}

/// Stack output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    #[serde(rename = "Value")]
    pub value: Value,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

impl Output {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            description: None,
        }
    }

    /// Human-readable rendering, with intrinsics shown as `${Id.Attr}`
    pub fn render(&self) -> String {
        intrinsic::render(&self.value)
    }
}

/// Helpers for building intrinsic function values
pub mod intrinsic {
    use serde_json::{Value, json};

    pub const ACCOUNT_ID: &str = "AWS::AccountId";

    pub fn reference(logical_id: &str) -> Value {
        json!({ "Ref": logical_id })
    }

    pub fn get_att(logical_id: &str, attribute: &str) -> Value {
        json!({ "Fn::GetAtt": [logical_id, attribute] })
    }

    /// Join values, collapsing to a plain string when every part is literal
    pub fn join(parts: Vec<Value>) -> Value {
        if parts.iter().all(Value::is_string) {
            let joined: String = parts.iter().filter_map(Value::as_str).collect();
            return Value::String(joined);
        }
        json!({ "Fn::Join": ["", parts] })
    }

    pub fn render(value: &Value) -> String {
        if let Some(s) = value.as_str() {
            return s.to_string();
        }
        if let Some(id) = value.get("Ref").and_then(Value::as_str) {
            return format!("${{{}}}", id);
        }
        if let Some([id, attr]) = value
            .get("Fn::GetAtt")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
        {
            return format!(
                "${{{}.{}}}",
                id.as_str().unwrap_or_default(),
                attr.as_str().unwrap_or_default()
            );
        }
        if let Some(parts) = value
            .get("Fn::Join")
            .and_then(|j| j.get(1))
            .and_then(Value::as_array)
        {
            return parts.iter().map(render).collect();
        }
        value.to_string()
    }
}

/// `[{Key, Value}]` tag list
pub fn tag_list(tags: &[(String, String)]) -> Value {
    Value::Array(
        tags.iter()
            .map(|(k, v)| json!({ "Key": k, "Value": v }))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution() -> Resource {
        Resource::new(
            "AWS::CloudFront::Distribution",
            json!({
                "DistributionConfig": {
                    "Origins": [{ "Id": "origin1", "S3OriginConfig": {} }]
                }
            }),
        )
    }

    #[test]
    fn test_property_override_into_array() {
        let mut resource = distribution();
        resource
            .add_property_override(
                "DistributionConfig.Origins.0.OriginAccessControlId",
                json!("oac-id"),
            )
            .unwrap();
        resource
            .add_property_override(
                "DistributionConfig.Origins.0.S3OriginConfig.OriginAccessIdentity",
                json!(""),
            )
            .unwrap();

        assert_eq!(
            resource.property("DistributionConfig.Origins.0.OriginAccessControlId"),
            Some(&json!("oac-id"))
        );
        assert_eq!(
            resource.property("DistributionConfig.Origins.0.S3OriginConfig.OriginAccessIdentity"),
            Some(&json!(""))
        );
        assert_eq!(
            resource.property("DistributionConfig.Origins.0.Id"),
            Some(&json!("origin1"))
        );
    }

    #[test]
    fn test_property_override_creates_objects() {
        let mut resource = Resource::new("AWS::S3::Bucket", json!({}));
        resource
            .add_property_override("WebsiteConfiguration.IndexDocument", json!("index.html"))
            .unwrap();
        assert_eq!(
            resource.property("WebsiteConfiguration.IndexDocument"),
            Some(&json!("index.html"))
        );
    }

    #[test]
    fn test_property_override_out_of_range() {
        let mut resource = distribution();
        let result = resource.add_property_override("DistributionConfig.Origins.3.Id", json!("x"));
        assert!(matches!(result, Err(CloudError::Template(_))));
    }

    #[test]
    fn test_duplicate_logical_id() {
        let mut template = Template::new();
        template
            .add_resource("S3Bucket", Resource::new("AWS::S3::Bucket", json!({})))
            .unwrap();
        let result = template.add_resource("S3Bucket", Resource::new("AWS::S3::Bucket", json!({})));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialized_layout() {
        let mut template = Template::new();
        template
            .add_resource(
                "S3Bucket",
                Resource::new("AWS::S3::Bucket", json!({ "BucketName": "site" })).destroy_with_stack(),
            )
            .unwrap();

        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(value["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(value["Resources"]["S3Bucket"]["Type"], "AWS::S3::Bucket");
        assert_eq!(value["Resources"]["S3Bucket"]["DeletionPolicy"], "Delete");
        assert!(value.get("Outputs").is_none());
    }

    #[test]
    fn test_render_output() {
        let output = Output::new(intrinsic::join(vec![
            json!("https://"),
            intrinsic::get_att("CloudFront", "DomainName"),
        ]));
        assert_eq!(output.render(), "https://${CloudFront.DomainName}");
    }

    #[test]
    fn test_join_collapses_literals() {
        assert_eq!(
            intrinsic::join(vec![json!("arn:"), json!("aws")]),
            json!("arn:aws")
        );
    }
}
