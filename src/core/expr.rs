//! String attributes with deferred placeholders.
//!
//! An [`Expr`] is either a plain literal or a template carrying two kinds of
//! placeholder: `{{account.id}}` / `{{account.region}}`, substituted in-build
//! once the deployer identity is resolved, and `{{out:<node>.<field>}}`,
//! a reference to another node's runtime output that only the external
//! reconciler can fill in during apply.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::DeployerIdentity;

/// Placeholder for the resolved account id.
pub const ACCOUNT_ID: &str = "{{account.id}}";
/// Placeholder for the resolved region.
pub const REGION: &str = "{{account.region}}";

/// A reference from one node's attribute to another node's runtime output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputReference {
    /// Graph id of the referenced node.
    pub node: String,
    /// Output field on that node, e.g. `arn` or `invoke_arn`.
    pub output: String,
}

/// A string attribute that may carry deferred placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expr(String);

impl Expr {
    /// A plain literal with no placeholders.
    pub fn literal(value: impl Into<String>) -> Self {
        Expr(value.into())
    }

    /// A template string; placeholders are validated lazily by [`Expr::references`].
    pub fn template(value: impl Into<String>) -> Self {
        Expr(value.into())
    }

    /// A bare reference to another node's output: `{{out:<node>.<field>}}`.
    pub fn output(node: &str, field: &str) -> Self {
        Expr(format!("{{{{out:{}.{}}}}}", node, field))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the value carries no placeholders at all.
    pub fn is_literal(&self) -> bool {
        !self.0.contains("{{")
    }

    /// Extract every output reference in the template.
    ///
    /// Account placeholders are skipped; anything else inside `{{...}}` is an
    /// error, as is an unclosed `{{`.
    pub fn references(&self) -> Result<Vec<OutputReference>, String> {
        let mut refs = Vec::new();
        let mut rest = self.0.as_str();
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| format!("unclosed placeholder in '{}'", self.0))?;
            let inner = &after[..end];
            if inner == "account.id" || inner == "account.region" {
                rest = &after[end + 2..];
                continue;
            }
            let target = inner.strip_prefix("out:").ok_or_else(|| {
                format!("unknown placeholder '{{{{{}}}}}' in '{}'", inner, self.0)
            })?;
            let (node, output) = target.split_once('.').ok_or_else(|| {
                format!(
                    "output reference '{{{{out:{}}}}}' must be '<node>.<field>'",
                    target
                )
            })?;
            if node.is_empty() || output.is_empty() {
                return Err(format!(
                    "output reference '{{{{out:{}}}}}' must be '<node>.<field>'",
                    target
                ));
            }
            refs.push(OutputReference {
                node: node.to_string(),
                output: output.to_string(),
            });
            rest = &after[end + 2..];
        }
        Ok(refs)
    }

    /// Substitute account placeholders with the resolved identity.
    ///
    /// Output references are left in place for the reconciler.
    pub fn resolve_account(&self, identity: &DeployerIdentity) -> Result<Expr, String> {
        let mut result = self.0.clone();
        let mut search_from = 0;
        while let Some(rel) = result[search_from..].find("{{") {
            let start = search_from + rel;
            let end = result[start..]
                .find("}}")
                .map(|e| start + e + 2)
                .ok_or_else(|| format!("unclosed placeholder in '{}'", self.0))?;
            let inner = &result[start + 2..end - 2];
            let replacement = match inner {
                "account.id" => Some(identity.account_id.clone()),
                "account.region" => Some(identity.region.clone()),
                _ => None,
            };
            match replacement {
                Some(value) => {
                    result.replace_range(start..end, &value);
                    search_from = start + value.len();
                }
                None => {
                    search_from = end;
                }
            }
        }
        Ok(Expr(result))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> DeployerIdentity {
        DeployerIdentity {
            account_id: "123456789012".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn literal_has_no_references() {
        let e = Expr::literal("dev-todos");
        assert!(e.is_literal());
        assert!(e.references().unwrap().is_empty());
    }

    #[test]
    fn output_constructor_formats_placeholder() {
        let e = Expr::output("table", "arn");
        assert_eq!(e.as_str(), "{{out:table.arn}}");
        assert!(!e.is_literal());
    }

    #[test]
    fn references_extracted_from_template() {
        let e = Expr::template("{{out:rest-api.execution_arn}}/*/*");
        let refs = e.references().unwrap();
        assert_eq!(
            refs,
            vec![OutputReference {
                node: "rest-api".to_string(),
                output: "execution_arn".to_string(),
            }]
        );
    }

    #[test]
    fn account_placeholders_are_not_references() {
        let e = Expr::template(format!(
            "arn:aws:dynamodb:{}:{}:table/dev-todos",
            REGION, ACCOUNT_ID
        ));
        assert!(e.references().unwrap().is_empty());
    }

    #[test]
    fn mixed_template_yields_only_output_refs() {
        let e = Expr::template(format!(
            "https://{}.execute-api.{}.amazonaws.com/dev",
            "{{out:rest-api.id}}", REGION
        ));
        let refs = e.references().unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].node, "rest-api");
        assert_eq!(refs[0].output, "id");
    }

    #[test]
    fn unknown_placeholder_rejected() {
        let e = Expr::template("{{bogus}}");
        assert!(e.references().unwrap_err().contains("unknown placeholder"));
    }

    #[test]
    fn unclosed_placeholder_rejected() {
        let e = Expr::template("{{out:table.arn");
        assert!(e.references().unwrap_err().contains("unclosed"));
    }

    #[test]
    fn malformed_output_reference_rejected() {
        let e = Expr::template("{{out:tablearn}}");
        assert!(e.references().unwrap_err().contains("<node>.<field>"));
    }

    #[test]
    fn resolve_account_substitutes_both_placeholders() {
        let e = Expr::template(format!(
            "arn:aws:logs:{}:{}:log-group:/aws/lambda/dev-todos-createTodo*",
            REGION, ACCOUNT_ID
        ));
        let resolved = e.resolve_account(&identity()).unwrap();
        assert_eq!(
            resolved.as_str(),
            "arn:aws:logs:us-east-1:123456789012:log-group:/aws/lambda/dev-todos-createTodo*"
        );
    }

    #[test]
    fn resolve_account_leaves_output_refs_in_place() {
        let e = Expr::template(format!("{}{}", "{{out:rest-api.execution_arn}}", "/*/*"));
        let resolved = e.resolve_account(&identity()).unwrap();
        assert_eq!(resolved.as_str(), "{{out:rest-api.execution_arn}}/*/*");
    }

    #[test]
    fn serde_is_transparent() {
        let e = Expr::output("function", "invoke_arn");
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, "\"{{out:function.invoke_arn}}\"");
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
