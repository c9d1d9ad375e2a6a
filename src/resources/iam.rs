//! Execution role and inline policy declarations.
//!
//! Policy documents serialize with the provider's JSON casing
//! (`Version` / `Statement` / `Effect` / `Action` / `Resource`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::expr::Expr;

pub const POLICY_VERSION: &str = "2012-10-17";

/// A single statement in an identity policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    #[serde(rename = "Effect")]
    pub effect: String,
    #[serde(rename = "Action")]
    pub actions: Vec<String>,
    #[serde(rename = "Resource")]
    pub resource: Expr,
}

impl PolicyStatement {
    pub fn allow(actions: &[&str], resource: Expr) -> Self {
        PolicyStatement {
            effect: "Allow".to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resource,
        }
    }
}

/// An identity policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statements,
        }
    }
}

/// The principal allowed to assume a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustPrincipal {
    #[serde(rename = "Service")]
    pub service: String,
}

/// One statement of a role's trust policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustStatement {
    #[serde(rename = "Effect")]
    pub effect: String,
    #[serde(rename = "Principal")]
    pub principal: TrustPrincipal,
    #[serde(rename = "Action")]
    pub action: String,
}

/// A role's trust policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustPolicy {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statements: Vec<TrustStatement>,
}

/// Trust policy granting assume-role to exactly one service principal.
pub fn assume_role_policy_for_service(service: &str) -> TrustPolicy {
    TrustPolicy {
        version: POLICY_VERSION.to_string(),
        statements: vec![TrustStatement {
            effect: "Allow".to_string(),
            principal: TrustPrincipal {
                service: service.to_string(),
            },
            action: "sts:AssumeRole".to_string(),
        }],
    }
}

/// Execution role declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub assume_role_policy: TrustPolicy,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tags: IndexMap<String, String>,
}

impl RoleSpec {
    pub(crate) fn exprs(&self) -> Vec<&Expr> {
        Vec::new()
    }
}

/// Inline policy attached to a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePolicySpec {
    /// Reference to the owning role.
    pub role: Expr,
    pub policy: PolicyDocument,
}

impl RolePolicySpec {
    pub(crate) fn exprs(&self) -> Vec<&Expr> {
        let mut exprs = vec![&self.role];
        exprs.extend(self.policy.statements.iter().map(|s| &s.resource));
        exprs
    }
}
