// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for isaForge.

use std::fs;
use std::process;

use clap::Parser;
use serde_json::json;

use isaforge::core::error::{Diagnostic, TrError};
use isaforge::translate::cli::{validate_cli, Cli, CliConfig, OutputFormat};
use isaforge::translate::{
    self, blocks_json, program_json, render_blocks, render_program, RunReport, Translator,
};

const RULER: &str = "------------------------------";
const INDENT: usize = 20;

fn main() {
    let cli = Cli::parse();
    let config = match validate_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    if let Some(opcode) = config.describe.as_deref() {
        if let Err(err) = describe(&config, opcode) {
            eprintln!("{err}");
            process::exit(1);
        }
        return;
    }

    match translate::run(&config) {
        Ok(report) => {
            emit_rule_warnings(&config, &report);
            if !config.quiet {
                if config.format == OutputFormat::Json {
                    print_json(&config, &report);
                } else {
                    print_text(&config, &report);
                }
            }
            if let Err(err) = write_output(&config, &report) {
                eprintln!("{err}");
                process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

fn describe(config: &CliConfig, opcode: &str) -> Result<(), TrError> {
    let (translator, diagnostics) = match config.target.as_ref() {
        Some(path) => Translator::from_file(path)?,
        None => Translator::from_rules_text(translate::URCL_RULES),
    };
    if config.strict_rules {
        print_diagnostics(&diagnostics);
    }
    match translator.rules().get(&opcode.to_ascii_uppercase()) {
        Some(rule) => {
            println!("{rule}");
            Ok(())
        }
        None => Err(TrError::new(
            isaforge::core::error::TrErrorKind::Rule,
            format!("no rule for opcode '{opcode}'"),
        )),
    }
}

fn emit_rule_warnings(config: &CliConfig, report: &RunReport) {
    if !config.strict_rules {
        return;
    }
    print_diagnostics(&report.lower_diagnostics);
    print_diagnostics(&report.target_diagnostics);
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
    }
}

fn source_name(config: &CliConfig) -> String {
    config
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn print_text(config: &CliConfig, report: &RunReport) {
    let source = source_name(config);
    println!("{RULER}");
    println!("{source} lowered to core URCL:");
    println!("{RULER}");
    println!(
        "{}",
        render_program(&report.lowered, INDENT, config.use_color)
    );
    println!("{RULER}");
    println!("In {:.10} seconds.", report.lower_seconds);
    println!("Registers used: {}", report.lowered.regs().len());
    println!("{RULER}");

    if let (Some(blocks), Some(target)) = (report.blocks.as_ref(), config.target.as_ref()) {
        println!("{RULER}");
        println!("{source} translated to {}:", target.display());
        println!("{RULER}");
        println!("{}", render_blocks(blocks, INDENT));
        println!("{RULER}");
        println!("In {:.10} seconds.", report.emit_seconds);
        println!("{RULER}");
    }
}

fn print_json(config: &CliConfig, report: &RunReport) {
    let payload = json!({
        "source": source_name(config),
        "lowered": program_json(&report.lowered),
        "blocks": report.blocks.as_ref().map(|b| blocks_json(b)),
        "lower_seconds": report.lower_seconds,
        "emit_seconds": report.emit_seconds,
        "skipped_rule_lines": report.lower_diagnostics.len() + report.target_diagnostics.len(),
    });
    println!("{payload}");
}

fn write_output(config: &CliConfig, report: &RunReport) -> Result<(), TrError> {
    let Some(path) = config.output.as_ref() else {
        return Ok(());
    };
    let mut text = match report.blocks.as_ref() {
        Some(blocks) => render_blocks(blocks, 0),
        None => report.lowered.to_plain_string(0),
    };
    text.push('\n');
    fs::write(path, text).map_err(|err| {
        TrError::new(
            isaforge::core::error::TrErrorKind::Io,
            format!("cannot write '{}': {err}", path.display()),
        )
    })
}
