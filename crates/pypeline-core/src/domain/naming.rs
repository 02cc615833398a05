//! Name normalization for generated Python code.
//!
//! Every user-supplied name (project, pipeline, processor) ends up as a
//! directory, a module and part of a class name, so it has to survive as a
//! Python identifier on every platform.

use std::fmt;

use serde::Serialize;

use crate::domain::DomainError;

const MAX_IDENTIFIER_LEN: usize = 255;

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

const WINDOWS_RESERVED: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Trim, lower-case, and turn hyphens and spaces into underscores.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

/// `sales_daily` -> `SalesDaily`. Empty segments are dropped.
pub fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `SalesDaily` -> `sales_daily`.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Two names are equivalent if they match case-insensitively once
/// underscores are ignored.
pub fn equivalent(a: &str, b: &str) -> bool {
    let strip = |s: &str| -> String {
        s.chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect()
    };
    strip(a) == strip(b)
}

/// A validated, normalized Python identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Normalize `input` and validate the result.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let normalized = normalize(input);
        let invalid = |reason: &str| DomainError::InvalidIdentifier {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if normalized.is_empty() {
            return Err(invalid("name is empty"));
        }
        if normalized.len() > MAX_IDENTIFIER_LEN {
            return Err(invalid("name is longer than 255 characters"));
        }

        let first_ok = normalized
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !first_ok {
            return Err(invalid("must start with a letter or underscore"));
        }
        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(invalid(&format!("contains invalid character '{bad}'")));
        }
        if PYTHON_KEYWORDS.contains(&normalized.as_str()) {
            return Err(invalid("is a reserved Python keyword"));
        }
        if WINDOWS_RESERVED.contains(&normalized.as_str()) {
            return Err(invalid("is a reserved name on Windows"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn pascal_case(&self) -> String {
        to_pascal_case(&self.0)
    }

    /// PascalCase name with a role suffix, unless it already carries one.
    ///
    /// `my_pipeline` + `Pipeline` -> `MyPipeline`, `sales` + `Pipeline` -> `SalesPipeline`.
    pub fn class_name(&self, suffix: &str) -> String {
        let pascal = self.pascal_case();
        if pascal.ends_with(suffix) {
            pascal
        } else {
            format!("{pascal}{suffix}")
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
