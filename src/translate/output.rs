// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Rendering of translated programs: plain text, coloured terminal output
//! and machine-readable JSON.

use serde_json::json;

use crate::core::operand::{OpKind, Operand};
use crate::core::program::{Header, Program};
use crate::core::report::paint_operand;

/// A section of emitted target code with the source labels that lead into
/// it.
#[derive(Debug, Clone)]
pub struct Block {
    labels: Vec<Operand>,
    lines: Vec<String>,
}

impl Block {
    pub fn new(labels: Vec<Operand>, lines: Vec<String>) -> Self {
        Self { labels, lines }
    }

    pub fn labels(&self) -> &[Operand] {
        &self.labels
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// `labels | code` gutter layout, one gutter per line.
    pub fn render(&self, indent: usize) -> String {
        let labels = self
            .labels
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let mut out = String::new();
        if self.lines.is_empty() {
            out.push_str(&format!("{labels:>indent$} |"));
            return out;
        }
        for (i, line) in self.lines.iter().enumerate() {
            if i == 0 {
                out.push_str(&format!("{labels:>indent$} | {line}"));
            } else {
                out.push_str(&format!("\n{:>indent$} | {line}", ""));
            }
        }
        out
    }
}

pub fn render_blocks(blocks: &[Block], indent: usize) -> String {
    blocks
        .iter()
        .map(|b| b.render(indent))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a program with the label gutter, optionally colourised per
/// operand kind.
pub fn render_program(program: &Program, indent: usize, use_color: bool) -> String {
    program
        .code()
        .iter()
        .map(|ins| {
            let labels = ins
                .labels
                .iter()
                .map(|l| paint_operand(l, use_color))
                .collect::<Vec<_>>()
                .join(" ");
            // Escape codes would distort the pad width, so pad first.
            let pad = ins
                .labels
                .iter()
                .map(|l| l.to_string())
                .collect::<Vec<_>>()
                .join(" ")
                .chars()
                .count();
            let gutter = " ".repeat(indent.saturating_sub(pad));
            let operands = ins
                .operands
                .iter()
                .map(|op| paint_operand(op, use_color))
                .collect::<Vec<_>>()
                .join(" ");
            let mut line = format!("{gutter}{labels} {}", ins.opcode);
            if !operands.is_empty() {
                line.push(' ');
                line.push_str(&operands);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn kind_str(kind: OpKind) -> &'static str {
    match kind {
        OpKind::Register => "register",
        OpKind::Number => "number",
        OpKind::Address => "address",
        OpKind::Label => "label",
        OpKind::Port => "port",
        OpKind::Relative => "relative",
        OpKind::Negative => "negative",
        OpKind::StackPtr => "stack_pointer",
        OpKind::Other => "other",
    }
}

pub fn program_json(program: &Program) -> serde_json::Value {
    let headers: serde_json::Map<String, serde_json::Value> = Header::ALL
        .iter()
        .filter_map(|h| {
            program
                .headers()
                .get(h)
                .map(|v| (h.as_str().to_string(), json!(v)))
        })
        .collect();
    let instructions: Vec<serde_json::Value> = program
        .code()
        .iter()
        .map(|ins| {
            json!({
                "labels": ins.labels.iter().map(|l| l.value()).collect::<Vec<_>>(),
                "opcode": ins.opcode,
                "operands": ins.operands.iter().map(|op| {
                    json!({
                        "kind": kind_str(op.kind()),
                        "value": op.value(),
                        "word": op.word(),
                    })
                }).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({
        "headers": headers,
        "registers": program.regs().len(),
        "instructions": instructions,
    })
}

pub fn blocks_json(blocks: &[Block]) -> serde_json::Value {
    let rendered: Vec<serde_json::Value> = blocks
        .iter()
        .map(|b| {
            json!({
                "labels": b.labels.iter().map(|l| l.value()).collect::<Vec<_>>(),
                "lines": b.lines,
            })
        })
        .collect();
    json!(rendered)
}
