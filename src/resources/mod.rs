//! Typed resource declarations, one module per provider service.

pub mod apigateway;
pub mod artifact;
pub mod iam;
pub mod lambda;
pub mod table;

use serde::{Deserialize, Serialize};

use crate::core::expr::{Expr, OutputReference};
use crate::core::types::{DeployerIdentity, ResourceKind};

use apigateway::{ApiResourceSpec, DeploymentSpec, IntegrationSpec, MethodSpec, RestApiSpec};
use iam::{RolePolicySpec, RoleSpec};
use lambda::{FunctionSpec, LayerVersionSpec, PermissionSpec};
use table::TableSpec;

/// The typed payload of a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeSpec {
    Table(TableSpec),
    Role(RoleSpec),
    RolePolicy(RolePolicySpec),
    LayerVersion(LayerVersionSpec),
    Function(FunctionSpec),
    RestApi(RestApiSpec),
    ApiResource(ApiResourceSpec),
    Method(MethodSpec),
    Integration(IntegrationSpec),
    Deployment(DeploymentSpec),
    Permission(PermissionSpec),
}

impl NodeSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            NodeSpec::Table(_) => ResourceKind::Table,
            NodeSpec::Role(_) => ResourceKind::Role,
            NodeSpec::RolePolicy(_) => ResourceKind::RolePolicy,
            NodeSpec::LayerVersion(_) => ResourceKind::LayerVersion,
            NodeSpec::Function(_) => ResourceKind::Function,
            NodeSpec::RestApi(_) => ResourceKind::RestApi,
            NodeSpec::ApiResource(_) => ResourceKind::ApiResource,
            NodeSpec::Method(_) => ResourceKind::Method,
            NodeSpec::Integration(_) => ResourceKind::Integration,
            NodeSpec::Deployment(_) => ResourceKind::Deployment,
            NodeSpec::Permission(_) => ResourceKind::Permission,
        }
    }

    /// Every expression attribute carried by the spec.
    pub fn exprs(&self) -> Vec<&Expr> {
        match self {
            NodeSpec::Table(s) => s.exprs(),
            NodeSpec::Role(s) => s.exprs(),
            NodeSpec::RolePolicy(s) => s.exprs(),
            NodeSpec::LayerVersion(s) => s.exprs(),
            NodeSpec::Function(s) => s.exprs(),
            NodeSpec::RestApi(s) => s.exprs(),
            NodeSpec::ApiResource(s) => s.exprs(),
            NodeSpec::Method(s) => s.exprs(),
            NodeSpec::Integration(s) => s.exprs(),
            NodeSpec::Deployment(s) => s.exprs(),
            NodeSpec::Permission(s) => s.exprs(),
        }
    }

    /// Every output reference carried by the spec's expressions.
    pub fn references(&self) -> Result<Vec<OutputReference>, String> {
        let mut refs = Vec::new();
        for expr in self.exprs() {
            refs.extend(expr.references()?);
        }
        Ok(refs)
    }

    /// Substitute resolved account identity into every expression attribute.
    pub fn resolve_account(&self, identity: &DeployerIdentity) -> Result<NodeSpec, String> {
        let mut resolved = self.clone();
        match &mut resolved {
            NodeSpec::Table(_)
            | NodeSpec::Role(_)
            | NodeSpec::RestApi(_)
            | NodeSpec::LayerVersion(_) => {}
            NodeSpec::RolePolicy(s) => {
                s.role = s.role.resolve_account(identity)?;
                for statement in &mut s.policy.statements {
                    statement.resource = statement.resource.resolve_account(identity)?;
                }
            }
            NodeSpec::Function(s) => {
                s.role = s.role.resolve_account(identity)?;
                for layer in &mut s.layers {
                    *layer = layer.resolve_account(identity)?;
                }
                for value in s.environment.values_mut() {
                    *value = value.resolve_account(identity)?;
                }
            }
            NodeSpec::ApiResource(s) => {
                s.rest_api = s.rest_api.resolve_account(identity)?;
                s.parent_id = s.parent_id.resolve_account(identity)?;
            }
            NodeSpec::Method(s) => {
                s.rest_api = s.rest_api.resolve_account(identity)?;
                s.resource_id = s.resource_id.resolve_account(identity)?;
            }
            NodeSpec::Integration(s) => {
                s.rest_api = s.rest_api.resolve_account(identity)?;
                s.resource_id = s.resource_id.resolve_account(identity)?;
                s.uri = s.uri.resolve_account(identity)?;
            }
            NodeSpec::Deployment(s) => {
                s.rest_api = s.rest_api.resolve_account(identity)?;
            }
            NodeSpec::Permission(s) => {
                s.function = s.function.resolve_account(identity)?;
                s.source_arn = s.source_arn.resolve_account(identity)?;
            }
        }
        Ok(resolved)
    }
}
