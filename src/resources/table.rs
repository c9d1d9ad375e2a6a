//! Storage table declaration (DynamoDB-style).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One attribute definition in the table's key schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    /// Provider scalar type, e.g. `S` for string.
    #[serde(rename = "type")]
    pub attr_type: String,
}

/// Single-table storage with a string partition key and fixed provisioned
/// capacity. No scaling policy is modeled; capacity is a static input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub attributes: Vec<AttributeDef>,
    pub hash_key: String,
    pub billing_mode: String,
    pub read_capacity: u32,
    pub write_capacity: u32,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tags: IndexMap<String, String>,
}

impl TableSpec {
    pub fn new(
        hash_key: &str,
        read_capacity: u32,
        write_capacity: u32,
        tags: IndexMap<String, String>,
    ) -> Self {
        TableSpec {
            attributes: vec![AttributeDef {
                name: hash_key.to_string(),
                attr_type: "S".to_string(),
            }],
            hash_key: hash_key.to_string(),
            billing_mode: "PROVISIONED".to_string(),
            read_capacity,
            write_capacity,
            tags,
        }
    }

    pub(crate) fn exprs(&self) -> Vec<&crate::core::expr::Expr> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_key_schema_from_hash_key() {
        let spec = TableSpec::new("id", 1, 1, IndexMap::new());
        assert_eq!(spec.attributes.len(), 1);
        assert_eq!(spec.attributes[0].name, "id");
        assert_eq!(spec.attributes[0].attr_type, "S");
        assert_eq!(spec.billing_mode, "PROVISIONED");
    }

    #[test]
    fn attribute_type_serializes_as_type() {
        let spec = TableSpec::new("id", 1, 1, IndexMap::new());
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["attributes"][0]["type"], "S");
    }
}
