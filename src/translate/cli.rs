// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::core::error::{TrError, TrErrorKind};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Rule-driven URCL translator.

Translation runs in two stages: the source program is first lowered to core
URCL using the built-in rule set, then emitted as target-ISA text using the
rule file given with -t/--target. Without a target, only the lowered stage is
produced. Both stages print to the terminal unless -q/--quiet is set; the
final stage is written to -o/--output when given.";

#[derive(Parser, Debug)]
#[command(
    name = "isaForge",
    version = VERSION,
    about = "Translates URCL assembly to another instruction set via UTRX rule files",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        value_name = "SOURCE",
        long_help = "URCL source file to translate. Required unless --describe is used."
    )]
    pub source: Option<PathBuf>,
    #[arg(
        short = 't',
        long = "target",
        value_name = "UTRX",
        long_help = "UTRX rule file describing the target instruction set."
    )]
    pub target: Option<PathBuf>,
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        long_help = "Write the final translation stage to FILE."
    )]
    pub output: Option<PathBuf>,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress terminal output. Errors are still reported on stderr."
    )]
    pub quiet: bool,
    #[arg(
        long = "no-color",
        action = ArgAction::SetTrue,
        long_help = "Render terminal output without colour. The NO_COLOR environment variable has the same effect."
    )]
    pub no_color: bool,
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Select terminal output format. text is default; json emits one machine-readable object per run."
    )]
    pub format: OutputFormat,
    #[arg(
        long = "strict-rules",
        action = ArgAction::SetTrue,
        long_help = "Report rule-file lines the permissive parser skipped as warnings on stderr."
    )]
    pub strict_rules: bool,
    #[arg(
        long = "describe",
        value_name = "OPCODE",
        long_help = "Print the rule table entry for OPCODE (from --target, or the built-in rules) and exit."
    )]
    pub describe: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Resolved, validated CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub quiet: bool,
    pub use_color: bool,
    pub format: OutputFormat,
    pub strict_rules: bool,
    pub describe: Option<String>,
}

pub fn validate_cli(cli: &Cli) -> Result<CliConfig, TrError> {
    if cli.describe.is_none() {
        let Some(source) = cli.source.as_ref() else {
            return Err(TrError::new(
                TrErrorKind::Cli,
                "a SOURCE file is required unless --describe is used",
            ));
        };
        if !source.is_file() {
            return Err(TrError::new(
                TrErrorKind::Cli,
                format!("source file '{}' does not exist", source.display()),
            ));
        }
    }
    if let Some(target) = cli.target.as_ref() {
        if !target.is_file() {
            return Err(TrError::new(
                TrErrorKind::Cli,
                format!("target rule file '{}' does not exist", target.display()),
            ));
        }
    }
    Ok(CliConfig {
        source: cli.source.clone(),
        target: cli.target.clone(),
        output: cli.output.clone(),
        quiet: cli.quiet,
        use_color: crate::core::report::use_color(cli.no_color),
        format: cli.format,
        strict_rules: cli.strict_rules,
        describe: cli.describe.clone(),
    })
}
