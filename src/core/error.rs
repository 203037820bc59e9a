// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types and diagnostics for the translator.

use std::fmt;

/// Categories of translation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrErrorKind {
    Cli,
    Io,
    Parse,
    Rule,
    Placeholder,
}

/// A translation error with a kind, message and optional source line.
#[derive(Debug, Clone)]
pub struct TrError {
    kind: TrErrorKind,
    message: String,
    line: Option<u32>,
}

impl TrError {
    pub fn new(kind: TrErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn kind(&self) -> TrErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

impl fmt::Display for TrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TrError {}

impl From<std::io::Error> for TrError {
    fn from(err: std::io::Error) -> Self {
        TrError::new(TrErrorKind::Io, err.to_string())
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A non-fatal note attached to a source or rule-file line.
///
/// Rule-file loading is permissive: unrecognized lines are skipped rather than
/// rejected. Each skipped line is recorded as a diagnostic so strict callers
/// can surface them to rule authors.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    line: u32,
    severity: Severity,
    message: String,
}

impl Diagnostic {
    pub fn new(line: u32, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            line,
            severity,
            message: message.into(),
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "line {}: {sev}: {}", self.line, self.message)
    }
}
