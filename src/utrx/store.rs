// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! UTRX rule file parsing and the opcode-indexed rule table.
//!
//! The format has two block shapes: description blocks
//! (`/* OPCODE [language]` up to a closing `*/` line) and case blocks
//! (`OPCODE :: pattern-tokens {` up to a lone `}`). Parsing is two passes,
//! descriptions first, then case bodies appended in file order. The format
//! is permissive: lines matching neither shape are skipped, but each skip is
//! recorded as a diagnostic for strict callers.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::core::error::{Diagnostic, Severity, TrError, TrErrorKind};
use crate::core::instruction::Instruction;
use crate::utrx::matcher::match_pattern;

pub const DEFAULT_LANGUAGE: &str = "URCL";
const UNDOCUMENTED: &str = "This instruction is undocumented. :(";

/// One pattern + replacement alternative for an opcode.
#[derive(Debug, Clone)]
pub struct Case {
    tokens: Vec<String>,
    pattern: String,
    body: Vec<String>,
    language: String,
}

impl Case {
    pub fn new(pattern: &str, body: Vec<String>, language: impl Into<String>) -> Self {
        Self {
            tokens: pattern.split_whitespace().map(str::to_string).collect(),
            pattern: pattern.trim().to_string(),
            body,
            language: language.into(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// True when every positional operand/token pair matches and the arity
    /// is exact. Pure; the instruction is never mutated.
    pub fn matches(&self, ins: &Instruction) -> bool {
        match_pattern(&ins.operands, &self.tokens)
    }
}

/// All translation cases for one opcode, in rule-file order.
#[derive(Debug, Clone)]
pub struct Rule {
    opcode: String,
    language: String,
    description: Vec<String>,
    cases: Vec<Case>,
}

impl Rule {
    fn new(opcode: impl Into<String>, language: impl Into<String>, description: Vec<String>) -> Self {
        Self {
            opcode: opcode.into(),
            language: language.into(),
            description,
            cases: Vec::new(),
        }
    }

    pub fn opcode(&self) -> &str {
        &self.opcode
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn description(&self) -> &[String] {
        &self.description
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// First case in file order whose pattern matches the instruction.
    /// File order is the tie-break, not specificity.
    pub fn first_match(&self, ins: &Instruction) -> Option<&Case> {
        self.cases.iter().find(|case| case.matches(ins))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let language = format!("Language: {}", self.language);
        let mut width = self.opcode.chars().count().max(language.chars().count());
        for line in &self.description {
            width = width.max(line.chars().count());
        }
        let mut case_rows: Vec<Vec<String>> = Vec::new();
        for case in &self.cases {
            let header = format!("{} :: {}", self.opcode, case.pattern);
            let mut rows = vec![header];
            rows.extend(case.body.iter().cloned());
            for row in &rows {
                width = width.max(row.chars().count());
            }
            case_rows.push(rows);
        }

        let bar = "─".repeat(width + 2);
        writeln!(f, "┌{bar}┐")?;
        writeln!(f, "│ {:^width$} │", self.opcode)?;
        writeln!(f, "│ {language:^width$} │")?;
        writeln!(f, "├{bar}┤")?;
        for line in &self.description {
            writeln!(f, "│ {line:<width$} │")?;
        }
        for rows in &case_rows {
            writeln!(f, "├{bar}┤")?;
            writeln!(f, "│ {:^width$} │", rows[0])?;
            for row in &rows[1..] {
                writeln!(f, "│ {row:<width$} │")?;
            }
        }
        write!(f, "└{bar}┘")
    }
}

/// Opcode-indexed rule table, immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, Rule>,
}

impl RuleSet {
    /// Parses rule description text. Always succeeds; unparseable lines are
    /// skipped and reported in the diagnostic list.
    pub fn parse(text: &str) -> (RuleSet, Vec<Diagnostic>) {
        let lines: Vec<&str> = text.lines().collect();
        let mut consumed = vec![false; lines.len()];
        let mut rules: HashMap<String, Rule> = HashMap::new();
        let mut diagnostics = Vec::new();

        // Pass 1: description blocks.
        let mut idx = 0;
        while idx < lines.len() {
            let line = lines[idx];
            if !line.starts_with("/*") {
                idx += 1;
                continue;
            }
            let open_line = idx as u32 + 1;
            consumed[idx] = true;
            let mut words = line.split_whitespace();
            words.next();
            let Some(opcode) = words.next() else {
                diagnostics.push(Diagnostic::new(
                    open_line,
                    Severity::Warning,
                    "description block without an opcode; skipped",
                ));
                idx += 1;
                continue;
            };
            let opcode = opcode.to_ascii_uppercase();
            let language: Vec<&str> = words.collect();
            let language = if language.is_empty() {
                DEFAULT_LANGUAGE.to_string()
            } else {
                language.join(" ")
            };
            let mut description = Vec::new();
            let mut closed = false;
            idx += 1;
            while idx < lines.len() {
                consumed[idx] = true;
                if lines[idx].starts_with("*/") {
                    closed = true;
                    idx += 1;
                    break;
                }
                description.push(lines[idx].to_string());
                idx += 1;
            }
            if closed {
                rules.insert(opcode.clone(), Rule::new(opcode, language, description));
            } else {
                diagnostics.push(Diagnostic::new(
                    open_line,
                    Severity::Warning,
                    format!("unterminated description block for {opcode}; skipped"),
                ));
            }
        }

        // Pass 2: case blocks.
        let mut current: Option<(String, String, Vec<String>, u32)> = None;
        for (idx, line) in lines.iter().enumerate() {
            if consumed[idx] {
                continue;
            }
            let line_num = idx as u32 + 1;
            if let Some((opcode, pattern, mut body, start)) = current.take() {
                if line.trim() == "}" {
                    let rule = rules.entry(opcode.clone()).or_insert_with(|| {
                        Rule::new(opcode, DEFAULT_LANGUAGE, vec![UNDOCUMENTED.to_string()])
                    });
                    let language = rule.language.clone();
                    rule.cases.push(Case::new(&pattern, body, language));
                } else {
                    body.push(line.to_string());
                    current = Some((opcode, pattern, body, start));
                }
                continue;
            }
            if let Some((opcode, pattern)) = parse_case_header(line) {
                current = Some((opcode, pattern, Vec::new(), line_num));
                continue;
            }
            if !line.trim().is_empty() {
                diagnostics.push(Diagnostic::new(
                    line_num,
                    Severity::Warning,
                    format!("unrecognized line skipped: {}", line.trim()),
                ));
            }
        }
        if let Some((opcode, _, _, start)) = current {
            diagnostics.push(Diagnostic::new(
                start,
                Severity::Warning,
                format!("unterminated case block for {opcode}; skipped"),
            ));
        }

        (RuleSet { rules }, diagnostics)
    }

    pub fn from_file(path: &Path) -> Result<(RuleSet, Vec<Diagnostic>), TrError> {
        let text = fs::read_to_string(path).map_err(|err| {
            TrError::new(
                TrErrorKind::Io,
                format!("cannot read '{}': {err}", path.display()),
            )
        })?;
        Ok(RuleSet::parse(&text))
    }

    pub fn get(&self, opcode: &str) -> Option<&Rule> {
        self.rules.get(opcode)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn opcodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.keys().map(String::as_str)
    }
}

/// Recognizes `OPCODE :: pattern-tokens {`. The token list may be empty for
/// zero-operand opcodes.
fn parse_case_header(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim_end();
    if !trimmed.ends_with('{') {
        return None;
    }
    let (opcode, rest) = trimmed.split_once(" :: ")?;
    let opcode = opcode.trim();
    if opcode.is_empty() || opcode.contains(char::is_whitespace) {
        return None;
    }
    let pattern = rest[..rest.len() - 1].trim();
    Some((opcode.to_ascii_uppercase(), pattern.to_string()))
}
