//! Dependency strings and the merge rule for `[project].dependencies`.
//!
//! Raw strings follow `name [op version]` with `op` one of
//! `>=`, `==`, `~=`, `<=`, `>`, `<`. A bare name means any version.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::domain::DomainError;

static DEPENDENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:(?P<op>>=|==|~=|<=|>|<)\s*(?P<version>[A-Za-z0-9.*+!_-]+))?\s*$",
    )
    .expect("dependency pattern is a valid regex")
});

static LEADING_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)")
        .expect("leading-name pattern is a valid regex")
});

static DEPENDENCY_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^DEPENDENCIES\s*(?::[^=\n]*)?=\s*\[")
        .expect("dependency-list pattern is a valid regex")
});

/// Version comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VersionOp {
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "==")]
    Exactly,
    #[serde(rename = "~=")]
    Compatible,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
}

impl VersionOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AtLeast => ">=",
            Self::Exactly => "==",
            Self::Compatible => "~=",
            Self::AtMost => "<=",
            Self::Greater => ">",
            Self::Less => "<",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            ">=" => Self::AtLeast,
            "==" => Self::Exactly,
            "~=" => Self::Compatible,
            "<=" => Self::AtMost,
            ">" => Self::Greater,
            "<" => Self::Less,
            _ => return None,
        })
    }
}

impl fmt::Display for VersionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionSpec {
    pub op: VersionOp,
    pub version: String,
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// A parsed dependency. Identity is the lower-cased name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    pub name: String,
    pub spec: Option<VersionSpec>,
}

impl Dependency {
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.spec {
            Some(spec) => write!(f, "{}{}", self.name, spec),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for Dependency {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| DomainError::MalformedDependency {
            raw: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(malformed("empty dependency string"));
        }

        let caps = DEPENDENCY
            .captures(raw)
            .ok_or_else(|| malformed("expected 'name', or 'name' followed by an operator and a version"))?;

        let name = caps["name"].to_string();
        let spec = match (caps.name("op"), caps.name("version")) {
            (Some(op), Some(version)) => Some(VersionSpec {
                op: VersionOp::from_symbol(op.as_str())
                    .ok_or_else(|| malformed("unsupported operator"))?,
                version: version.as_str().to_string(),
            }),
            _ => None,
        };

        Ok(Self { name, spec })
    }
}

/// Parse every string, failing on the first malformed one.
pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Dependency>, DomainError> {
    raw.iter().map(|s| s.as_ref().parse()).collect()
}

/// Names added and updated by a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    /// Keys that appeared more than once in the existing list and were
    /// folded into a single entry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collapsed: Vec<String>,
}

impl MergeOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.collapsed.is_empty()
    }
}

/// Insertion-ordered dependency list keyed by lower-cased name.
///
/// Entries taken from an existing manifest keep their raw text; a later write
/// for the same key replaces the text but keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    entries: IndexMap<String, String>,
    collapsed: Vec<String>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the raw strings already in a manifest.
    ///
    /// Repeated keys keep the first position and the last text.
    pub fn from_existing<S: AsRef<str>>(raw: impl IntoIterator<Item = S>) -> Self {
        let mut set = Self::new();
        for entry in raw {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let key = leading_key(entry);
            if set.entries.insert(key.clone(), entry.to_string()).is_some()
                && !set.collapsed.contains(&key)
            {
                set.collapsed.push(key);
            }
        }
        set
    }

    /// Apply `incoming` in order; the last write for a key wins.
    ///
    /// The outcome also reports keys folded together by [`Self::from_existing`].
    pub fn merge(&mut self, incoming: &[Dependency]) -> MergeOutcome {
        let mut outcome = MergeOutcome {
            collapsed: self.collapsed.clone(),
            ..MergeOutcome::default()
        };
        for dep in incoming {
            let key = dep.key();
            let rendered = dep.to_string();
            match self.entries.get_mut(&key) {
                Some(existing) if *existing == rendered => {}
                Some(existing) => {
                    *existing = rendered;
                    if !outcome.added.contains(&dep.name) && !outcome.updated.contains(&dep.name)
                    {
                        outcome.updated.push(dep.name.clone());
                    }
                }
                None => {
                    self.entries.insert(key, rendered);
                    outcome.added.push(dep.name.clone());
                }
            }
        }
        outcome
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.values().cloned().collect()
    }

    pub fn collapsed(&self) -> &[String] {
        &self.collapsed
    }
}

fn leading_key(raw: &str) -> String {
    LEADING_NAME
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| raw.to_lowercase(), |m| m.as_str().to_lowercase())
}

/// Extract the string literals of `DEPENDENCIES = [...]` from a Python file.
///
/// `#` comments and both quote styles are accepted; anything else inside the
/// list is an error.
pub fn parse_dependency_file(source: &str) -> Result<Vec<Dependency>, DomainError> {
    let malformed = |reason: String| DomainError::MalformedDependency {
        raw: "DEPENDENCIES".to_string(),
        reason,
    };

    let start = DEPENDENCY_LIST
        .find(source)
        .ok_or_else(|| malformed("no 'DEPENDENCIES = [...]' list found".to_string()))?
        .end();

    let mut raw = Vec::new();
    let mut chars = source[start..].chars();
    loop {
        let Some(c) = chars.next() else {
            return Err(malformed("list is not closed with ']'".to_string()));
        };
        match c {
            ']' => break,
            ',' => {}
            c if c.is_whitespace() => {}
            '#' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '"' | '\'' => {
                let quote = c;
                let mut literal = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                literal.push(escaped);
                            }
                        }
                        '\n' => break,
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        c => literal.push(c),
                    }
                }
                if !closed {
                    return Err(malformed(format!("unterminated string '{literal}'")));
                }
                raw.push(literal);
            }
            other => {
                return Err(malformed(format!(
                    "unexpected '{other}' in list (only string literals are allowed)"
                )));
            }
        }
    }

    parse_all(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(raw: &[&str]) -> Vec<Dependency> {
        parse_all(raw).unwrap()
    }

    #[test]
    fn parses_operators_and_bare_names() {
        let dep: Dependency = "pandas >= 2.3.3".parse().unwrap();
        assert_eq!(dep.name, "pandas");
        assert_eq!(
            dep.spec,
            Some(VersionSpec {
                op: VersionOp::AtLeast,
                version: "2.3.3".into()
            })
        );
        assert_eq!(dep.to_string(), "pandas>=2.3.3");

        let bare: Dependency = "requests".parse().unwrap();
        assert!(bare.spec.is_none());

        for op in ["==", "~=", "<=", ">", "<"] {
            let dep: Dependency = format!("x{op}1.0").parse().unwrap();
            assert_eq!(dep.spec.unwrap().op.as_str(), op);
        }
    }

    #[test]
    fn rejects_malformed_strings() {
        for raw in ["", ">=1.0", "pandas >=", "pandas => 1.0", "pandas 1.0", "pan das"] {
            let err = raw.parse::<Dependency>().unwrap_err();
            assert!(
                matches!(err, DomainError::MalformedDependency { .. }),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn merge_into_empty_keeps_exact_specifiers() {
        let mut set = DependencySet::new();
        let outcome = set.merge(&deps(&["a>=1.0", "b==2.0"]));
        assert_eq!(set.to_vec(), vec!["a>=1.0", "b==2.0"]);
        assert_eq!(outcome.added, vec!["a", "b"]);
        assert!(outcome.updated.is_empty());
    }

    #[test]
    fn merge_last_write_wins() {
        let mut set = DependencySet::from_existing(["a>=1.0"]);
        let outcome = set.merge(&deps(&["a>=2.0"]));
        assert_eq!(set.to_vec(), vec!["a>=2.0"]);
        assert_eq!(outcome.updated, vec!["a"]);
    }

    #[test]
    fn merge_is_case_insensitive_and_keeps_position() {
        let mut set = DependencySet::from_existing(["NumPy>=1.0", "pandas"]);
        set.merge(&deps(&["numpy==2.3.4", "polars", "numpy>=2.0"]));
        assert_eq!(set.to_vec(), vec!["numpy>=2.0", "pandas", "polars"]);
        assert_eq!(set.get("NUMPY"), Some("numpy>=2.0"));
    }

    #[test]
    fn unchanged_entries_are_not_reported() {
        let mut set = DependencySet::from_existing(["a>=1.0"]);
        assert!(set.merge(&deps(&["a>=1.0"])).is_unchanged());
    }

    #[test]
    fn repeated_existing_keys_are_reported() {
        let mut set = DependencySet::from_existing(["a>=1.0", "b", "A==2.0", "a<3"]);
        assert_eq!(set.to_vec(), vec!["a<3", "b"]);
        assert_eq!(set.collapsed(), ["a".to_string()]);
        assert_eq!(set.merge(&[]).collapsed, vec!["a"]);
    }

    #[test]
    fn existing_entries_keep_raw_text() {
        let set = DependencySet::from_existing(["pyspark[sql] >= 4.0 ; python_version > '3.9'"]);
        assert_eq!(
            set.get("pyspark"),
            Some("pyspark[sql] >= 4.0 ; python_version > '3.9'")
        );
    }

    #[test]
    fn dependency_file_ignores_comments_and_quote_styles() {
        let source = r#"
# Edit this list, then run `pypeline sync-deps`
DEPENDENCIES = [
    "pandas>=2.3.3",  # dataframes
    'numpy>=2.3.4',
    # "ignored==1.0",
    "ruff==0.14.9",
]
"#;
        let parsed = parse_dependency_file(source).unwrap();
        let names: Vec<_> = parsed.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["pandas", "numpy", "ruff"]);
    }

    #[test]
    fn dependency_file_accepts_annotation_and_empty_list() {
        let parsed = parse_dependency_file("DEPENDENCIES: list[str] = []\n").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn dependency_file_without_list_is_malformed() {
        let err = parse_dependency_file("DEPS = []").unwrap_err();
        assert!(matches!(
            err,
            DomainError::MalformedDependency { ref raw, .. } if raw == "DEPENDENCIES"
        ));
        assert!(parse_dependency_file("DEPENDENCIES = [\"a\"").is_err());
        assert!(parse_dependency_file("DEPENDENCIES = [other]").is_err());
    }

    #[test]
    fn dependency_file_reports_bad_entry() {
        let err = parse_dependency_file("DEPENDENCIES = [\"pandas =>1\"]").unwrap_err();
        assert!(matches!(
            err,
            DomainError::MalformedDependency { ref raw, .. } if raw == "pandas =>1"
        ));
    }
}
