// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Substitution engine and the hygienic fixpoint expansion driver.
//!
//! Expansion repeatedly rewrites the first instruction whose opcode has a
//! matching program-mode case, splicing the fully expanded sub-program in
//! place and restarting the scan. The loop's only exit is "no instruction
//! has an applicable case"; a rule set without a base case never terminates,
//! which is a documented caller responsibility, not a condition the driver
//! detects.

use std::path::Path;

use crate::core::error::{Diagnostic, TrError, TrErrorKind};
use crate::core::instruction::Instruction;
use crate::core::operand::OpKind;
use crate::core::program::{Program, UidGen, ZERO_REG};
use crate::translate::output::Block;
use crate::utrx::store::RuleSet;

pub struct Translator {
    rules: RuleSet,
}

impl Translator {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn from_rules_text(text: &str) -> (Translator, Vec<Diagnostic>) {
        let (rules, diagnostics) = RuleSet::parse(text);
        (Translator::new(rules), diagnostics)
    }

    pub fn from_file(path: &Path) -> Result<(Translator, Vec<Diagnostic>), TrError> {
        let (rules, diagnostics) = RuleSet::from_file(path)?;
        Ok((Translator::new(rules), diagnostics))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Literal-mode substitution: renders the first matching case's body
    /// with `@A`/`@B`/… replaced by the operands' textual form. `None` when
    /// no rule or case applies.
    pub fn substitute(&self, ins: &Instruction) -> Result<Option<Vec<String>>, TrError> {
        let Some(case) = self.rules.get(&ins.opcode).and_then(|r| r.first_match(ins)) else {
            return Ok(None);
        };
        let mut lines = case.body().to_vec();
        for line in &mut lines {
            for (i, op) in ins.operands.iter().take(26).enumerate() {
                let marker = format!("@{}", (b'A' + i as u8) as char);
                if line.contains(&marker) {
                    *line = line.replace(&marker, &op.to_string());
                }
            }
            if let Some(letter) = unbound_marker(line) {
                return Err(TrError::new(
                    TrErrorKind::Placeholder,
                    format!(
                        "case for {} references @{letter} but the instruction has {} operands",
                        ins.opcode,
                        ins.operands.len()
                    ),
                ));
            }
        }
        Ok(Some(lines))
    }

    /// Program-mode substitution: parses the first matching case's body into
    /// a sub-program and binds each single-letter placeholder operand to the
    /// call-site operand its letter names. The sub-program is returned
    /// unexpanded; the driver owns hygiene and recursion.
    pub fn substitute_program(&self, ins: &Instruction) -> Result<Option<Program>, TrError> {
        let Some(case) = self.rules.get(&ins.opcode).and_then(|r| r.first_match(ins)) else {
            return Ok(None);
        };
        let mut sub = Program::parse(&case.body().join("\n")).map_err(|err| {
            TrError::new(
                TrErrorKind::Rule,
                format!("case body for {}: {err}", ins.opcode),
            )
        })?;
        for instr in &mut sub.code {
            for op in &mut instr.operands {
                if !op.is_placeholder() {
                    continue;
                }
                let Some(letter) = op.value().chars().next() else {
                    continue;
                };
                let letter = letter.to_ascii_uppercase();
                let index = (letter as u8 - b'A') as usize;
                let actual = ins.operands.get(index).ok_or_else(|| {
                    TrError::new(
                        TrErrorKind::Placeholder,
                        format!(
                            "case for {} references @{letter} but the instruction has {} operands",
                            ins.opcode,
                            ins.operands.len()
                        ),
                    )
                })?;
                op.bind(actual.clone());
            }
        }
        Ok(Some(sub))
    }

    /// Full translation: fixpoint expansion followed by the two finishing
    /// passes (canonical register numbering, relative-offset resolution).
    pub fn translate(&self, program: Program) -> Result<Program, TrError> {
        let mut gen = UidGen::new();
        let mut program = self.expand(program, &mut gen)?;
        program.make_regs_numeric();
        program.relatives_to_labels(&mut gen)?;
        Ok(program)
    }

    /// Fixpoint expansion only. Idempotent on programs already in normal
    /// form.
    pub fn expand(&self, mut program: Program, gen: &mut UidGen) -> Result<Program, TrError> {
        loop {
            let mut rewrote = false;
            for idx in 0..program.code.len() {
                let Some(mut sub) = self.substitute_program(&program.code[idx])? else {
                    continue;
                };
                // Rename the sub-program's own temporaries away from the
                // enclosing names before placeholders resolve, so call-site
                // operands are never touched.
                while sub.regs_collide(program.regs()) {
                    sub.prime_regs();
                }
                sub.unpack_placeholders()?;
                let before: Vec<String> = sub.regs().to_vec();
                let mut sub = self.expand(sub, gen)?;
                // Registers introduced by nested expansions were only checked
                // against the sub-program; mark any that alias the enclosing
                // program.
                let introduced: Vec<String> = sub
                    .regs()
                    .iter()
                    .filter(|r| *r != ZERO_REG && !before.iter().any(|b| b == *r))
                    .cloned()
                    .collect();
                for reg in introduced {
                    if program.regs().iter().any(|r| *r == reg) {
                        let mut fresh = format!("{reg}'");
                        while program.regs().iter().any(|r| *r == fresh)
                            || sub.regs().iter().any(|r| *r == fresh)
                        {
                            fresh.push('\'');
                        }
                        sub.rename_reg(&reg, &fresh);
                    }
                }
                program.splice(idx, sub, gen);
                rewrote = true;
                break;
            }
            if !rewrote {
                return Ok(program);
            }
        }
    }

    /// Terminal emission pass: one block per instruction, rendered through
    /// literal-mode substitution. An instruction with no applicable case is
    /// already in normal form and passes through as its own text.
    pub fn emit(&self, program: &Program) -> Result<Vec<Block>, TrError> {
        let mut blocks = Vec::with_capacity(program.code().len());
        for ins in program.code() {
            if let Some(op) = ins.operands.iter().find(|op| op.kind() == OpKind::Other) {
                return Err(TrError::new(
                    TrErrorKind::Placeholder,
                    format!("unresolved placeholder @{} reached emission", op.value()),
                ));
            }
            let lines = match self.substitute(ins)? {
                Some(lines) => lines,
                None => vec![ins.to_string()],
            };
            blocks.push(Block::new(ins.labels.clone(), lines));
        }
        Ok(blocks)
    }
}

/// Finds a leftover `@X` marker after interpolation.
fn unbound_marker(line: &str) -> Option<char> {
    let bytes = line.as_bytes();
    bytes
        .windows(2)
        .find(|pair| pair[0] == b'@' && pair[1].is_ascii_uppercase())
        .map(|pair| pair[1] as char)
}
