use thiserror::Error;

/// Root domain error type.
///
/// Domain errors are raised by pure logic (no I/O) and are:
/// - Cloneable
/// - Categorizable (for CLI display and exit codes)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid identifier '{input}': {reason}")]
    InvalidIdentifier { input: String, reason: String },

    #[error("Template variable '{name}' has no value")]
    MissingVariable { name: String },

    #[error("Malformed dependency '{raw}': {reason}")]
    MalformedDependency { raw: String, reason: String },

    #[error("Malformed registry file: {reason}")]
    MalformedRegistry { reason: String },

    #[error("Malformed manifest: {reason}")]
    MalformedManifest { reason: String },

    #[error("Unknown license '{license}'")]
    UnknownLicense { license: String },

    #[error("Invalid e-mail address '{email}'")]
    InvalidEmail { email: String },

    #[error("Invalid Python requirement '{requirement}': {reason}")]
    InvalidPythonRequirement { requirement: String, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidIdentifier { .. } => vec![
                "Names become Python identifiers: letters, digits and underscores only".into(),
                "Spaces and hyphens are converted to underscores".into(),
                "The name must not start with a digit or be a Python keyword".into(),
                "Examples: my-project, sales_pipeline, Customer Orders".into(),
            ],
            Self::MissingVariable { name } => vec![
                format!("The template references ${name} but no value was supplied"),
                "Check custom templates in your templates override directory".into(),
            ],
            Self::MalformedDependency { raw, .. } => vec![
                format!("Could not parse '{raw}'"),
                "Dependencies look like: name, name>=1.0, name==2.3.4, name~=1.2".into(),
                "Supported operators: >=, ==, ~=, <=, >, <".into(),
                "Edit DEPENDENCIES in dependencies.py and run sync-deps again".into(),
            ],
            Self::MalformedRegistry { .. } => vec![
                "The package __init__.py no longer matches the generated layout".into(),
                "Make sure it still contains an __all__ = [...] list".into(),
            ],
            Self::MalformedManifest { .. } => vec![
                "pyproject.toml could not be parsed as TOML".into(),
                "Fix the syntax error and try again".into(),
            ],
            Self::UnknownLicense { .. } => {
                let mut suggestions = vec!["Supported licenses:".to_string()];
                suggestions.extend(
                    crate::domain::License::ALL
                        .iter()
                        .map(|l| format!("  • {}", l.spdx_id())),
                );
                suggestions
            }
            Self::InvalidEmail { .. } => vec!["Use an address like jane@example.com".into()],
            Self::InvalidPythonRequirement { .. } => vec![
                "Set requires-python in pyproject.toml to something like \">=3.11\"".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedManifest { .. } => ErrorCategory::Configuration,
            Self::InvalidPythonRequirement { .. } => ErrorCategory::Configuration,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
}
