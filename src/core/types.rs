//! Core data types shared across the crate: stack identity, resolved
//! deployer identity, resource kinds, and the typed configuration that
//! `trazar.yaml` deserializes into.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Stack identity
// ============================================================================

/// The pair that scopes every physical resource name in a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackContext {
    /// Deployment stage, e.g. `dev` or `prod`.
    pub stack: String,
    /// Project slug, e.g. `todos`.
    pub project: String,
}

impl StackContext {
    /// Build a context, rejecting empty or whitespace-only parts.
    pub fn new(stack: &str, project: &str) -> Result<Self, String> {
        if stack.trim().is_empty() {
            return Err("stack name must not be empty".to_string());
        }
        if project.trim().is_empty() {
            return Err("project name must not be empty".to_string());
        }
        Ok(StackContext {
            stack: stack.to_string(),
            project: project.to_string(),
        })
    }
}

impl fmt::Display for StackContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.stack, self.project)
    }
}

/// Account identity produced by an [`IdentityResolver`](crate::core::resolver::IdentityResolver).
///
/// Substituted into `{{account.id}}` / `{{account.region}}` placeholders when
/// a graph is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployerIdentity {
    pub account_id: String,
    pub region: String,
}

// ============================================================================
// Resource kinds
// ============================================================================

/// Every resource kind a graph node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Table,
    Role,
    RolePolicy,
    LayerVersion,
    Function,
    RestApi,
    ApiResource,
    Method,
    Integration,
    Deployment,
    Permission,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Table => "table",
            ResourceKind::Role => "role",
            ResourceKind::RolePolicy => "role_policy",
            ResourceKind::LayerVersion => "layer_version",
            ResourceKind::Function => "function",
            ResourceKind::RestApi => "rest_api",
            ResourceKind::ApiResource => "api_resource",
            ResourceKind::Method => "method",
            ResourceKind::Integration => "integration",
            ResourceKind::Deployment => "deployment",
            ResourceKind::Permission => "permission",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Stack configuration (trazar.yaml)
// ============================================================================

/// Root of `trazar.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Config schema version. Must be `"1.0"`.
    pub version: String,
    /// Deployment stage, e.g. `dev`.
    pub stack: String,
    /// Project slug, e.g. `todos`.
    pub project: String,
    /// Storage table settings.
    #[serde(default)]
    pub table: TableConfig,
    /// Packaged function settings.
    #[serde(default)]
    pub function: FunctionConfig,
    /// HTTP entry point settings.
    #[serde(default)]
    pub api: ApiConfig,
}

impl StackConfig {
    pub fn context(&self) -> Result<StackContext, String> {
        StackContext::new(&self.stack, &self.project)
    }
}

/// Storage table section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Partition key attribute name.
    #[serde(default = "default_hash_key")]
    pub hash_key: String,
    /// Provisioned read capacity units.
    #[serde(default = "default_capacity")]
    pub read_capacity: u32,
    /// Provisioned write capacity units.
    #[serde(default = "default_capacity")]
    pub write_capacity: u32,
}

fn default_hash_key() -> String {
    "id".to_string()
}

fn default_capacity() -> u32 {
    1
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            hash_key: default_hash_key(),
            read_capacity: default_capacity(),
            write_capacity: default_capacity(),
        }
    }
}

/// Packaged function section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionConfig {
    /// Handler entry point inside the code archive.
    #[serde(default = "default_handler")]
    pub handler: String,
    /// Provider runtime identifier.
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Memory size in MB.
    #[serde(default = "default_memory_size")]
    pub memory_size: u32,
    /// Code archive path, relative to the build root.
    #[serde(default = "default_code")]
    pub code: String,
    /// Dependency layer archive path, relative to the build root.
    #[serde(default = "default_layer")]
    pub layer: String,
}

fn default_handler() -> String {
    "functions/create.create".to_string()
}

fn default_runtime() -> String {
    "nodejs12.x".to_string()
}

fn default_memory_size() -> u32 {
    128
}

fn default_code() -> String {
    "build/archive.zip".to_string()
}

fn default_layer() -> String {
    "layers/archive.zip".to_string()
}

impl Default for FunctionConfig {
    fn default() -> Self {
        FunctionConfig {
            handler: default_handler(),
            runtime: default_runtime(),
            memory_size: default_memory_size(),
            code: default_code(),
            layer: default_layer(),
        }
    }
}

/// HTTP entry point section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Path part registered under the API root.
    #[serde(default = "default_path_part")]
    pub path_part: String,
}

fn default_path_part() -> String {
    "{new}".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            path_part: default_path_part(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_context_valid() {
        let ctx = StackContext::new("dev", "todos").unwrap();
        assert_eq!(ctx.stack, "dev");
        assert_eq!(ctx.project, "todos");
        assert_eq!(ctx.to_string(), "dev-todos");
    }

    #[test]
    fn stack_context_rejects_empty_stack() {
        let err = StackContext::new("", "todos").unwrap_err();
        assert!(err.contains("stack"));
    }

    #[test]
    fn stack_context_rejects_blank_project() {
        let err = StackContext::new("dev", "   ").unwrap_err();
        assert!(err.contains("project"));
    }

    #[test]
    fn config_parse_minimal() {
        let yaml = r#"
version: "1.0"
stack: dev
project: todos
"#;
        let config: StackConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.table.hash_key, "id");
        assert_eq!(config.table.read_capacity, 1);
        assert_eq!(config.function.memory_size, 128);
        assert_eq!(config.function.runtime, "nodejs12.x");
        assert_eq!(config.api.path_part, "{new}");
    }

    #[test]
    fn config_parse_overrides() {
        let yaml = r#"
version: "1.0"
stack: prod
project: todos
table:
  hash_key: pk
  read_capacity: 5
  write_capacity: 2
function:
  handler: functions/main.handler
  memory_size: 256
api:
  path_part: items
"#;
        let config: StackConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.table.hash_key, "pk");
        assert_eq!(config.table.read_capacity, 5);
        assert_eq!(config.table.write_capacity, 2);
        assert_eq!(config.function.handler, "functions/main.handler");
        assert_eq!(config.function.memory_size, 256);
        // unset fields keep their defaults
        assert_eq!(config.function.code, "build/archive.zip");
        assert_eq!(config.api.path_part, "items");
    }

    #[test]
    fn resource_kind_display() {
        assert_eq!(ResourceKind::Table.to_string(), "table");
        assert_eq!(ResourceKind::RolePolicy.to_string(), "role_policy");
        assert_eq!(ResourceKind::RestApi.to_string(), "rest_api");
        assert_eq!(ResourceKind::LayerVersion.to_string(), "layer_version");
    }

    #[test]
    fn resource_kind_serde_round_trip() {
        let yaml = serde_yaml_ng::to_string(&ResourceKind::ApiResource).unwrap();
        assert_eq!(yaml.trim(), "api_resource");
        let back: ResourceKind = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, ResourceKind::ApiResource);
    }
}
