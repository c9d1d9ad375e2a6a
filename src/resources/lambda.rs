//! Packaged function, dependency layer, and invoke permission declarations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::expr::Expr;
use crate::resources::artifact::ArchiveArtifact;

/// Versioned dependency bundle shared by function deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerVersionSpec {
    pub compatible_runtimes: Vec<String>,
    pub code: ArchiveArtifact,
}

impl LayerVersionSpec {
    pub(crate) fn exprs(&self) -> Vec<&Expr> {
        Vec::new()
    }
}

/// Packaged function declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub runtime: String,
    pub handler: String,
    /// Reference to the execution role's ARN.
    pub role: Expr,
    pub code: ArchiveArtifact,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<Expr>,
    pub memory_size: u32,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub environment: IndexMap<String, Expr>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tags: IndexMap<String, String>,
}

impl FunctionSpec {
    pub(crate) fn exprs(&self) -> Vec<&Expr> {
        let mut exprs = vec![&self.role];
        exprs.extend(self.layers.iter());
        exprs.extend(self.environment.values());
        exprs
    }
}

/// Invoke grant from the HTTP entry point to the function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionSpec {
    pub statement_id: String,
    pub action: String,
    /// Reference to the function being invoked.
    pub function: Expr,
    pub principal: String,
    /// ARN pattern the invocation must originate from.
    pub source_arn: Expr,
}

impl PermissionSpec {
    pub(crate) fn exprs(&self) -> Vec<&Expr> {
        vec![&self.function, &self.source_arn]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_exprs_cover_role_layers_and_environment() {
        let mut environment = IndexMap::new();
        environment.insert("DYNAMODB_TABLE".to_string(), Expr::literal("dev-todos"));
        let spec = FunctionSpec {
            runtime: "nodejs12.x".to_string(),
            handler: "functions/create.create".to_string(),
            role: Expr::output("execution-role", "arn"),
            code: ArchiveArtifact::unhashed("build/archive.zip"),
            layers: vec![Expr::output("layer", "arn")],
            memory_size: 128,
            environment,
            tags: IndexMap::new(),
        };
        let exprs = spec.exprs();
        assert_eq!(exprs.len(), 3);
        let refs: Vec<_> = exprs
            .iter()
            .flat_map(|e| e.references().unwrap())
            .map(|r| r.node)
            .collect();
        assert_eq!(refs, vec!["execution-role", "layer"]);
    }

    #[test]
    fn permission_exprs_cover_function_and_source_arn() {
        let spec = PermissionSpec {
            statement_id: "AllowAPIGatewayInvoke".to_string(),
            action: "lambda:InvokeFunction".to_string(),
            function: Expr::output("function", "name"),
            principal: "apigateway.amazonaws.com".to_string(),
            source_arn: Expr::template("{{out:rest-api.execution_arn}}/*/*"),
        };
        let refs: Vec<_> = spec
            .exprs()
            .iter()
            .flat_map(|e| e.references().unwrap())
            .map(|r| r.node)
            .collect();
        assert_eq!(refs, vec!["function", "rest-api"]);
    }
}
