use crate::error::ResolveError;
use indexmap::IndexMap;
use serde_json::Value;

/// Nesting limit used unless overridden.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Settings for one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    /// Region for `AWS::Region` and `Fn::GetAZs ""`. Must not be empty.
    pub default_region: String,
    /// Bound on nested explosion and on output conversion.
    pub max_depth: usize,
    /// Values for template `Parameters`, returned by `Ref`.
    pub parameters: IndexMap<String, Value>,
    /// Extra or overriding pseudo-parameters, e.g. `AWS::AccountId`.
    pub pseudo_parameters: IndexMap<String, String>,
}

impl ResolveOptions {
    pub fn new(default_region: impl Into<String>) -> Self {
        ResolveOptions {
            default_region: default_region.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            parameters: IndexMap::new(),
            pseudo_parameters: IndexMap::new(),
        }
    }

    /// Takes the region from `AWS_REGION`, then `AWS_DEFAULT_REGION`.
    pub fn from_env() -> Result<Self, ResolveError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ResolveError> {
        ["AWS_REGION", "AWS_DEFAULT_REGION"]
            .into_iter()
            .filter_map(lookup)
            .find(|region| !region.trim().is_empty())
            .map(Self::new)
            .ok_or(ResolveError::MissingDefaultRegion)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn with_pseudo_parameter(mut self, name: &str, value: &str) -> Self {
        self.pseudo_parameters.insert(name.to_string(), value.to_string());
        self
    }

    /// Rejects an empty region before any traversal starts.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.default_region.trim().is_empty() {
            return Err(ResolveError::MissingDefaultRegion);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_lookup_order() {
        let options = ResolveOptions::from_lookup(|name| match name {
            "AWS_REGION" => Some("eu-west-1".to_string()),
            "AWS_DEFAULT_REGION" => Some("us-east-1".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(options.default_region, "eu-west-1");

        let options = ResolveOptions::from_lookup(|name| match name {
            "AWS_REGION" => Some(String::new()),
            "AWS_DEFAULT_REGION" => Some("us-east-1".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(options.default_region, "us-east-1");
    }

    #[test]
    fn test_missing_region() {
        assert!(matches!(
            ResolveOptions::from_lookup(|_| None),
            Err(ResolveError::MissingDefaultRegion)
        ));
        assert!(ResolveOptions::new("  ").validate().is_err());
        assert!(ResolveOptions::new("us-east-1").validate().is_ok());
    }
}
