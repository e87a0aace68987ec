use thiserror::Error;

/// Errors raised by scoring and ranking calls.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    /// The requested ranking domain is not part of the schema.
    #[error("domain '{domain}' not found in schema")]
    SchemaLookup {
        /// Domain id passed by the caller.
        domain: String,
    },
}

/// Errors raised while loading a schema into the engine.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    /// One or more validation problems, all collected in one pass.
    #[error("invalid schema: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl SchemaError {
    pub fn problems(&self) -> &[String] {
        match self {
            SchemaError::Invalid(problems) => problems,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lookup_message() {
        let err = ScoringError::SchemaLookup {
            domain: "bakeries".to_string(),
        };
        assert_eq!(err.to_string(), "domain 'bakeries' not found in schema");
    }

    #[test]
    fn test_invalid_schema_joins_problems() {
        let err = SchemaError::Invalid(vec!["a: bad".to_string(), "b: worse".to_string()]);
        assert_eq!(err.to_string(), "invalid schema: a: bad; b: worse");
        assert_eq!(err.problems().len(), 2);
    }
}
