//! Aggregator (`__init__.py`) maintenance.
//!
//! An aggregator is a Python module made of import statements plus an
//! explicit `__all__ = [...]` export list. Registering a generated class adds
//! one import and one export, each only when it is not already there.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::DomainError;

static ALL_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^__all__\s*(?::[^=\n]*)?=\s*\[(?s:(?P<body>.*?))\]")
        .expect("__all__ pattern is a valid regex")
});

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?P<double>[^"\n]*)"|'(?P<single>[^'\n]*)'"#)
        .expect("quoted-entry pattern is a valid regex")
});

const DEFAULT_INDENT: &str = "    ";

/// Result of a registry update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryUpdate {
    pub content: String,
    pub changed: bool,
}

/// Add `import_line` and `export` to an aggregator's source text.
///
/// The import is skipped when an equivalent one exists: same text after
/// whitespace normalization, or an import from the same module that already
/// brings in the same names. The export is skipped when `__all__` lists it.
///
/// # Errors
///
/// `MalformedRegistry` when the source has no `__all__ = [...]` literal.
pub fn update_registry(
    source: &str,
    import_line: &str,
    export: &str,
) -> Result<RegistryUpdate, DomainError> {
    if !ALL_LIST.is_match(source) {
        return Err(DomainError::MalformedRegistry {
            reason: "no '__all__ = [...]' export list found".into(),
        });
    }

    let with_import = add_import(source, import_line);
    let with_export = add_export(with_import.as_deref().unwrap_or(source), export)?;

    let changed = with_import.is_some() || with_export.is_some();
    let content = with_export.or(with_import).unwrap_or_else(|| source.to_string());
    Ok(RegistryUpdate { content, changed })
}

/// Names currently listed in `__all__`.
pub fn exports(source: &str) -> Result<Vec<String>, DomainError> {
    let body = all_body(source)?;
    Ok(entries(&source[body.0..body.1])
        .into_iter()
        .map(|(_, name)| name)
        .collect())
}

// ----------------------------------------------------------------------------
// Imports
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum ImportStmt {
    From { module: String, names: Vec<String> },
    Plain { modules: Vec<String> },
}

impl ImportStmt {
    fn parse(text: &str) -> Option<Self> {
        let flat = normalize_ws(&text.replace(['(', ')', '\\'], " "));
        if let Some(rest) = flat.strip_prefix("from ") {
            let (module, names) = rest.split_once(" import ")?;
            let names = split_names(names);
            if module.trim().is_empty() || names.is_empty() {
                return None;
            }
            Some(Self::From {
                module: module.trim().to_string(),
                names,
            })
        } else if let Some(rest) = flat.strip_prefix("import ") {
            let modules = split_names(rest);
            (!modules.is_empty()).then_some(Self::Plain { modules })
        } else {
            None
        }
    }

    /// `true` when this statement already imports everything `other` does.
    fn covers(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::From {
                    module: have_module,
                    names: have,
                },
                Self::From {
                    module: want_module,
                    names: want,
                },
            ) => have_module == want_module && want.iter().all(|n| have.contains(n)),
            (Self::Plain { modules: have }, Self::Plain { modules: want }) => {
                want.iter().all(|m| have.contains(m))
            }
            _ => false,
        }
    }
}

/// A top-level import statement, possibly spanning several lines.
#[derive(Debug)]
struct ImportSpan {
    end: usize,
    text: String,
}

fn add_import(source: &str, import_line: &str) -> Option<String> {
    let import_line = import_line.trim();
    let lines: Vec<&str> = source.split('\n').collect();
    let spans = top_level_imports(&lines);

    let wanted_text = normalize_ws(import_line);
    let wanted = ImportStmt::parse(import_line);
    let already_present = spans.iter().any(|span| {
        normalize_ws(&span.text) == wanted_text
            || match (&wanted, ImportStmt::parse(&span.text)) {
                (Some(wanted), Some(existing)) => existing.covers(wanted),
                _ => false,
            }
    });
    if already_present {
        return None;
    }

    let at = spans
        .last()
        .map_or_else(|| header_end(&lines), |span| span.end + 1);

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    out.extend_from_slice(&lines[..at]);
    out.push(import_line);
    out.extend_from_slice(&lines[at..]);
    Some(out.join("\n"))
}

fn top_level_imports(lines: &[&str]) -> Vec<ImportSpan> {
    let mut spans = Vec::new();
    let mut in_string: Option<&str> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(delim) = in_string {
            if line.contains(delim) {
                in_string = None;
            }
            i += 1;
            continue;
        }

        if line.starts_with("import ") || line.starts_with("from ") {
            let mut text = strip_comment(line).to_string();
            let mut depth = paren_delta(&text);
            let mut continued = text.trim_end().ends_with('\\');
            while (depth > 0 || continued) && i + 1 < lines.len() {
                i += 1;
                let next = strip_comment(lines[i]);
                text.push(' ');
                text.push_str(next);
                depth += paren_delta(next);
                continued = next.trim_end().ends_with('\\');
            }
            spans.push(ImportSpan { end: i, text });
        } else {
            in_string = opens_string(line);
        }
        i += 1;
    }
    spans
}

/// First line after leading comments and the module docstring.
fn header_end(lines: &[&str]) -> usize {
    let mut i = 0;
    while i < lines.len() && lines[i].trim_start().starts_with('#') {
        i += 1;
    }
    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }
    let Some(first) = lines.get(i) else {
        return i;
    };
    let trimmed = first.trim_start();
    let Some(delim) = ["\"\"\"", "'''"]
        .into_iter()
        .find(|d| trimmed.starts_with(d))
    else {
        return i;
    };
    if trimmed.matches(delim).count() >= 2 {
        return i + 1;
    }
    lines[i + 1..]
        .iter()
        .position(|l| l.contains(delim))
        .map_or(0, |offset| i + offset + 2)
}

fn opens_string(line: &str) -> Option<&'static str> {
    ["\"\"\"", "'''"]
        .into_iter()
        .find(|delim| line.matches(delim).count() % 2 == 1)
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(code, _)| code)
}

fn paren_delta(text: &str) -> i32 {
    text.chars().fold(0, |acc, c| match c {
        '(' => acc + 1,
        ')' => acc - 1,
        _ => acc,
    })
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(normalize_ws)
        .filter(|n| !n.is_empty())
        .collect()
}

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ----------------------------------------------------------------------------
// Exports
// ----------------------------------------------------------------------------

fn all_body(source: &str) -> Result<(usize, usize), DomainError> {
    ALL_LIST
        .captures(source)
        .and_then(|caps| caps.name("body"))
        .map(|m| (m.start(), m.end()))
        .ok_or_else(|| DomainError::MalformedRegistry {
            reason: "no '__all__ = [...]' export list found".into(),
        })
}

/// Quoted entries of an `__all__` body with their quote character.
fn entries(body: &str) -> Vec<(char, String)> {
    body.lines()
        .map(strip_comment)
        .flat_map(|line| {
            QUOTED
                .captures_iter(line)
                .filter_map(|caps| {
                    caps.name("double")
                        .map(|m| ('"', m.as_str().to_string()))
                        .or_else(|| caps.name("single").map(|m| ('\'', m.as_str().to_string())))
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn add_export(source: &str, export: &str) -> Result<Option<String>, DomainError> {
    let (start, end) = all_body(source)?;
    let body = &source[start..end];
    let existing = entries(body);

    if existing.iter().any(|(_, name)| name == export) {
        return Ok(None);
    }

    let quote = existing.first().map_or('"', |(q, _)| *q);
    let item = format!("{quote}{export}{quote}");

    let new_body = if body.contains('\n') {
        let content = body.trim_end();
        let trailing = &body[content.len()..];
        let indent = body
            .lines()
            .find(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
            .map_or(DEFAULT_INDENT, |l| &l[..l.len() - l.trim_start().len()]);
        if content.trim().is_empty() {
            format!("\n{indent}{item},{trailing}")
        } else {
            format!("{}\n{indent}{item},{trailing}", with_trailing_comma(content))
        }
    } else {
        let content = body.trim();
        if content.is_empty() {
            item
        } else if content.ends_with(',') {
            format!("{content} {item}")
        } else {
            format!("{content}, {item}")
        }
    };

    Ok(Some(format!(
        "{}{}{}",
        &source[..start],
        new_body,
        &source[end..]
    )))
}

/// Ensure the last entry is followed by a comma, keeping any trailing comment.
fn with_trailing_comma(content: &str) -> String {
    let mut offset = 0;
    let mut insert_at = None;
    for line in content.split('\n') {
        let code = strip_comment(line).trim_end();
        if !code.trim().is_empty() {
            insert_at = (!code.ends_with(',')).then_some(offset + code.len());
        }
        offset += line.len() + 1;
    }
    match insert_at {
        Some(at) => format!("{},{}", &content[..at], &content[at..]),
        None => content.to_string(),
    }
}
