use super::{PathSpec, StoreKind};
use crate::core::error::{Error, Result};
use glob::{MatchOptions, Pattern, PatternError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Expand a leading `~` to the given home directory.
///
/// Only `~` on its own or a `~/` prefix is expanded; a `~` anywhere else in
/// the path is left alone.
pub fn expand_home(path: &str, home_dir: &Path) -> PathBuf {
    if path == "~" {
        home_dir.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home_dir.join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Paths of `kind` in configuration order, first occurrence of each literal path only
pub fn unique_paths(specs: &[PathSpec], kind: StoreKind) -> Vec<&str> {
    let mut seen = HashSet::new();
    specs
        .iter()
        .filter(|spec| spec.store == kind)
        .map(|spec| spec.path.as_str())
        .filter(|path| seen.insert(*path))
        .collect()
}

/// Shell-style name pattern matched against a single path segment
#[derive(Debug, Clone)]
pub struct NamePattern {
    raw: String,
    pattern: Pattern,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl NamePattern {
    pub fn new(raw: &str) -> Result<Self> {
        let pattern = translate_pattern(raw)
            .and_then(|translated| Pattern::new(&translated))
            .map_err(|source| Error::InvalidPattern {
                pattern: raw.to_string(),
                source,
            })?;
        Ok(Self {
            raw: raw.to_string(),
            pattern,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches_with(name, MATCH_OPTIONS)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Rewrite `filepath.Match`-style syntax into `glob` syntax.
///
/// `[^...]` becomes `[!...]`, `\x` outside a class matches `x` literally,
/// and runs of `*` collapse into one since a pattern never spans segments.
fn translate_pattern(raw: &str) -> std::result::Result<String, PatternError> {
    let mut translated = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();
    let mut in_class = false;

    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    return Err(PatternError {
                        pos,
                        msg: "trailing backslash escapes nothing",
                    });
                };
                if !in_class && matches!(escaped, '*' | '?' | '[' | ']') {
                    translated.push('[');
                    translated.push(escaped);
                    translated.push(']');
                } else {
                    translated.push(escaped);
                }
            }
            '[' if !in_class => {
                in_class = true;
                translated.push('[');
                if chars.next_if(|&(_, next)| next == '^').is_some() {
                    translated.push('!');
                }
            }
            ']' if in_class => {
                in_class = false;
                translated.push(']');
            }
            '*' if !in_class => {
                translated.push('*');
                while chars.next_if(|&(_, next)| next == '*').is_some() {}
            }
            _ => translated.push(c),
        }
    }

    Ok(translated)
}
