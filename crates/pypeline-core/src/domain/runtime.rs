//! `requires-python` handling.
//!
//! PEP 440 clauses are translated into `semver` requirements so interpreter
//! versions can be matched. `~=X.Y` becomes `>=X.Y, <X+1` and `~=X.Y.Z`
//! becomes `>=X.Y.Z, <X.Y+1`; `==X.Y` and `==X.*` match the whole series.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use semver::{Version, VersionReq};

use crate::domain::DomainError;

pub const DEFAULT_REQUIREMENT: &str = ">=3.9";

/// Interpreters tried by `install`, most specific first.
pub const INTERPRETER_CANDIDATES: &[&str] = &[
    "python3.13",
    "python3.12",
    "python3.11",
    "python3.10",
    "python3.9",
    "python3",
    "python",
];

static CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<op>>=|<=|==|!=|~=|>|<)\s*(?P<version>\d+(?:\.\d+){0,2})(?P<wild>\.\*)?$")
        .expect("requirement clause pattern is a valid regex")
});

static VERSION_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Python\s+(\d+)\.(\d+)(?:\.(\d+))?").expect("version pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonRequirement {
    raw: String,
    accept: VersionReq,
    exclude: Vec<VersionReq>,
}

impl PythonRequirement {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let invalid = |reason: String| DomainError::InvalidPythonRequirement {
            requirement: raw.to_string(),
            reason,
        };

        let mut accept = Vec::new();
        let mut exclude = Vec::new();

        for clause in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let caps = CLAUSE
                .captures(clause)
                .ok_or_else(|| invalid(format!("unsupported clause '{clause}'")))?;
            let version = &caps["version"];
            let wildcard = caps.name("wild").is_some();

            match &caps["op"] {
                "~=" => {
                    let parts: Vec<u64> = version
                        .split('.')
                        .map(|p| p.parse().unwrap_or_default())
                        .collect();
                    if parts.len() < 2 {
                        return Err(invalid("'~=' needs at least two version components".into()));
                    }
                    let mut upper = parts[..parts.len() - 1].to_vec();
                    if let Some(last) = upper.last_mut() {
                        *last += 1;
                    }
                    accept.push(format!(">={version}"));
                    accept.push(format!(
                        "<{}",
                        upper
                            .iter()
                            .map(u64::to_string)
                            .collect::<Vec<_>>()
                            .join(".")
                    ));
                }
                "==" => accept.push(format!("={version}")),
                "!=" if wildcard => exclude.push(format!("={version}")),
                "!=" => exclude.push(format!("={}", pad(version))),
                op @ (">" | "<=") => accept.push(format!("{op}{}", pad(version))),
                op => accept.push(format!("{op}{version}")),
            }
        }

        if accept.is_empty() && exclude.is_empty() {
            return Err(invalid("empty requirement".into()));
        }

        let to_req = |text: &str| {
            VersionReq::parse(text).map_err(|e| invalid(format!("{text}: {e}")))
        };
        let accept = if accept.is_empty() {
            VersionReq::STAR
        } else {
            to_req(&accept.join(", "))?
        };
        let exclude = exclude
            .iter()
            .map(|e| to_req(e))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.trim().to_string(),
            accept,
            exclude,
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.accept.matches(version) && !self.exclude.iter().any(|e| e.matches(version))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for PythonRequirement {
    fn default() -> Self {
        Self {
            raw: DEFAULT_REQUIREMENT.to_string(),
            accept: VersionReq {
                comparators: vec![semver::Comparator {
                    op: semver::Op::GreaterEq,
                    major: 3,
                    minor: Some(9),
                    patch: None,
                    pre: semver::Prerelease::EMPTY,
                }],
            },
            exclude: Vec::new(),
        }
    }
}

impl fmt::Display for PythonRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn pad(version: &str) -> String {
    match version.split('.').count() {
        1 => format!("{version}.0.0"),
        2 => format!("{version}.0"),
        _ => version.to_string(),
    }
}

/// Parse `python --version` output such as `Python 3.12.1`.
pub fn parse_python_version(output: &str) -> Option<Version> {
    let caps = VERSION_OUTPUT.captures(output)?;
    let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse().ok());
    Some(Version::new(part(1)?, part(2)?, part(3).unwrap_or(0)))
}
