//! YAML parsing and validation for trazar.yaml.
//!
//! Validates structural constraints:
//! - Version must be "1.0"
//! - Stack and project must be non-empty
//! - Table key and capacities must be usable
//! - Function handler, runtime, and archive paths must be non-empty

use super::types::StackConfig;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a trazar.yaml file from disk.
pub fn parse_config_file(path: &Path) -> Result<StackConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_config(&content)
}

/// Parse a trazar.yaml from a string.
pub fn parse_config(yaml: &str) -> Result<StackConfig, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &StackConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", config.version),
        });
    }

    if config.stack.trim().is_empty() {
        errors.push(ValidationError {
            message: "stack must not be empty".to_string(),
        });
    }
    if config.project.trim().is_empty() {
        errors.push(ValidationError {
            message: "project must not be empty".to_string(),
        });
    }

    if config.table.hash_key.trim().is_empty() {
        errors.push(ValidationError {
            message: "table.hash_key must not be empty".to_string(),
        });
    }
    if config.table.read_capacity == 0 {
        errors.push(ValidationError {
            message: "table.read_capacity must be at least 1".to_string(),
        });
    }
    if config.table.write_capacity == 0 {
        errors.push(ValidationError {
            message: "table.write_capacity must be at least 1".to_string(),
        });
    }

    if config.function.handler.trim().is_empty() {
        errors.push(ValidationError {
            message: "function.handler must not be empty".to_string(),
        });
    }
    if config.function.runtime.trim().is_empty() {
        errors.push(ValidationError {
            message: "function.runtime must not be empty".to_string(),
        });
    }
    if config.function.memory_size < 128 {
        errors.push(ValidationError {
            message: format!(
                "function.memory_size must be at least 128, got {}",
                config.function.memory_size
            ),
        });
    }
    if config.function.code.trim().is_empty() {
        errors.push(ValidationError {
            message: "function.code must not be empty".to_string(),
        });
    }
    if config.function.layer.trim().is_empty() {
        errors.push(ValidationError {
            message: "function.layer must not be empty".to_string(),
        });
    }

    if config.api.path_part.trim().is_empty() {
        errors.push(ValidationError {
            message: "api.path_part must not be empty".to_string(),
        });
    }

    errors
}

/// Parse and validate in one step, formatting all errors into one message.
pub fn load_config(path: &Path) -> Result<StackConfig, String> {
    let config = parse_config_file(path)?;
    let errors = validate_config(&config);
    if errors.is_empty() {
        Ok(config)
    } else {
        let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
        Err(format!(
            "invalid configuration ({} error{}):\n{}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            lines.join("\n")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
version: "1.0"
stack: dev
project: todos
"#;

    #[test]
    fn valid_config_has_no_errors() {
        let config = parse_config(VALID).unwrap();
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let config = parse_config(&VALID.replace("\"1.0\"", "\"2.0\"")).unwrap();
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("version"));
    }

    #[test]
    fn empty_stack_and_project_are_rejected() {
        let config = parse_config(
            r#"
version: "1.0"
stack: ""
project: "  "
"#,
        )
        .unwrap();
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = parse_config(
            r#"
version: "1.0"
stack: dev
project: todos
table:
  read_capacity: 0
"#,
        )
        .unwrap();
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.contains("read_capacity")));
    }

    #[test]
    fn undersized_memory_is_rejected() {
        let config = parse_config(
            r#"
version: "1.0"
stack: dev
project: todos
function:
  memory_size: 64
"#,
        )
        .unwrap();
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.contains("memory_size")));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_config("version: [").unwrap_err();
        assert!(err.contains("YAML parse error"));
    }

    #[test]
    fn load_config_collects_all_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trazar.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(
            br#"
version: "2.0"
stack: ""
project: todos
"#,
        )
        .unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.contains("2 errors"));
        assert!(err.contains("version"));
        assert!(err.contains("stack"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = parse_config_file(Path::new("/nonexistent/trazar.yaml")).unwrap_err();
        assert!(err.contains("failed to read"));
    }
}
