//! Wildcard source patterns compiled to anchored regular expressions
//!
//! SPDX-FileCopyrightText: 2025 `Bedrockify` Contributors
//!
//! SPDX-License-Identifier: MIT

use regex::Regex;

use crate::error::{Error, Result};

/// A compiled `*` / `**` source pattern
#[derive(Debug, Clone)]
pub(crate) struct SourcePattern {
    regex: Regex,
    captures: usize,
}

impl SourcePattern {
    /// Compile a pattern. `**` matches across `/`, `*` stays within one segment.
    pub(crate) fn compile(pattern: &str) -> Result<Self> {
        let mut expr = String::with_capacity(pattern.len() * 2 + 2);
        expr.push('^');
        let mut captures = 0;
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '*' {
                literal.push(c);
                continue;
            }
            expr.push_str(&regex::escape(&literal));
            literal.clear();
            captures += 1;
            if chars.peek() == Some(&'*') {
                chars.next();
                expr.push_str("(.+)");
            } else {
                expr.push_str("([^/]+)");
            }
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        let regex = Regex::new(&expr)
            .map_err(|e| Error::invalid_table(format!("pattern {pattern:?}: {e}")))?;
        Ok(Self { regex, captures })
    }

    pub(crate) fn captures(&self) -> usize {
        self.captures
    }

    /// Match `path` and expand every target template with the captures
    pub(crate) fn expand(&self, path: &str, templates: &[String]) -> Option<Vec<String>> {
        let caps = self.regex.captures(path)?;
        Some(
            templates
                .iter()
                .map(|template| {
                    let mut out = String::with_capacity(template.len() + path.len());
                    caps.expand(template, &mut out);
                    out
                })
                .collect(),
        )
    }
}

/// Highest `${n}` capture index referenced by a template
///
/// Captures must be braced: the regex expander reads `$1_x` as a group
/// named `1_x`, which never exists. `$$` is a literal `$`.
pub(crate) fn max_template_capture(template: &str) -> Result<usize> {
    let mut max = 0;
    let mut rest = template;
    while let Some(at) = rest.find('$') {
        let after = &rest[at + 1..];
        if let Some(escaped) = after.strip_prefix('$') {
            rest = escaped;
            continue;
        }
        let index = after
            .strip_prefix('{')
            .and_then(|inner| inner.split_once('}'))
            .map(|(digits, tail)| (digits.parse::<usize>(), tail));
        match index {
            Some((Ok(n), tail)) => {
                max = max.max(n);
                rest = tail;
            }
            _ => {
                return Err(Error::invalid_table(format!(
                    "target {template:?}: captures must be written as ${{n}}"
                )));
            }
        }
    }
    Ok(max)
}
