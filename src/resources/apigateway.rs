//! HTTP entry point declarations (REST API surface).

use serde::{Deserialize, Serialize};

use crate::core::expr::Expr;

/// The REST API container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestApiSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RestApiSpec {
    pub(crate) fn exprs(&self) -> Vec<&Expr> {
        Vec::new()
    }
}

/// A path segment registered under the API root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResourceSpec {
    pub rest_api: Expr,
    /// Parent resource id; the root resource for a top-level segment.
    pub parent_id: Expr,
    pub path_part: String,
}

impl ApiResourceSpec {
    pub(crate) fn exprs(&self) -> Vec<&Expr> {
        vec![&self.rest_api, &self.parent_id]
    }
}

/// An HTTP method on an API resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    pub rest_api: Expr,
    pub resource_id: Expr,
    pub http_method: String,
    pub authorization: String,
}

impl MethodSpec {
    pub(crate) fn exprs(&self) -> Vec<&Expr> {
        vec![&self.rest_api, &self.resource_id]
    }
}

/// Proxy integration binding a method to the function's invoke ARN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSpec {
    pub rest_api: Expr,
    pub resource_id: Expr,
    pub http_method: String,
    pub integration_http_method: String,
    #[serde(rename = "type")]
    pub integration_type: String,
    pub uri: Expr,
}

impl IntegrationSpec {
    pub(crate) fn exprs(&self) -> Vec<&Expr> {
        vec![&self.rest_api, &self.resource_id, &self.uri]
    }
}

/// A deployment of the API to a named stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    pub rest_api: Expr,
    pub stage_name: String,
}

impl DeploymentSpec {
    pub(crate) fn exprs(&self) -> Vec<&Expr> {
        vec![&self.rest_api]
    }
}
