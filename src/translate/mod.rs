// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Two-stage translation pipeline - main entry point.
//!
//! Stage one lowers the source program to core URCL with the built-in rule
//! set; stage two emits target-ISA text with the user-supplied rule file.

pub mod cli;
mod engine;
mod output;
#[cfg(test)]
mod tests;

pub use engine::Translator;
pub use output::{blocks_json, program_json, render_blocks, render_program, Block};

use std::time::Instant;

use crate::core::error::{Diagnostic, TrError, TrErrorKind};
use crate::core::program::Program;

use cli::CliConfig;

/// Built-in rules lowering URCL to its core instruction subset.
pub const URCL_RULES: &str = include_str!("../../rules/urcl.utrx");

/// Everything one translation run produced.
pub struct RunReport {
    pub lowered: Program,
    pub blocks: Option<Vec<Block>>,
    pub lower_diagnostics: Vec<Diagnostic>,
    pub target_diagnostics: Vec<Diagnostic>,
    pub lower_seconds: f64,
    pub emit_seconds: f64,
}

pub fn run(config: &CliConfig) -> Result<RunReport, TrError> {
    let Some(source) = config.source.as_ref() else {
        return Err(TrError::new(TrErrorKind::Cli, "no source file configured"));
    };
    let program = Program::from_file(source)?;

    let (lowerer, lower_diagnostics) = Translator::from_rules_text(URCL_RULES);
    let start = Instant::now();
    let lowered = lowerer.translate(program)?;
    let lower_seconds = start.elapsed().as_secs_f64();

    let (blocks, target_diagnostics, emit_seconds) = match config.target.as_ref() {
        Some(path) => {
            let (emitter, diagnostics) = Translator::from_file(path)?;
            let start = Instant::now();
            let blocks = emitter.emit(&lowered)?;
            (Some(blocks), diagnostics, start.elapsed().as_secs_f64())
        }
        None => (None, Vec::new(), 0.0),
    };

    Ok(RunReport {
        lowered,
        blocks,
        lower_diagnostics,
        target_diagnostics,
        lower_seconds,
        emit_seconds,
    })
}
