// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Instruction records: a case-normalized opcode, positional operands and
//! attached label definitions.

use std::fmt;

use crate::core::error::TrError;
use crate::core::operand::{OpKind, Operand};

/// Opcode used for label-only carrier lines. Labels on a carrier migrate to
/// the next real instruction during program parsing.
pub const CARRIER_OPCODE: &str = "NOP";

#[derive(Debug, Clone)]
pub struct Instruction {
    pub opcode: String,
    pub operands: Vec<Operand>,
    pub labels: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self {
            opcode: opcode.into(),
            operands,
            labels: Vec::new(),
        }
    }

    /// Parses one source line into an instruction, or `None` for a blank
    /// line. Leading `.label` tokens attach as label definitions; a line
    /// holding only labels becomes a carrier `NOP`.
    pub fn parse(line: &str) -> Result<Option<Instruction>, TrError> {
        let mut tokens = line.split_whitespace().peekable();
        let mut labels = Vec::new();
        while let Some(&token) = tokens.peek() {
            if !token.starts_with('.') {
                break;
            }
            labels.push(Operand::parse(token)?);
            tokens.next();
        }
        let opcode = match tokens.next() {
            Some(word) => word.to_ascii_uppercase(),
            None => {
                if labels.is_empty() {
                    return Ok(None);
                }
                CARRIER_OPCODE.to_string()
            }
        };
        let mut operands = Vec::new();
        for token in tokens {
            operands.push(Operand::parse(token)?);
        }
        Ok(Some(Instruction {
            opcode,
            operands,
            labels,
        }))
    }

    pub fn is_carrier(&self) -> bool {
        self.opcode == CARRIER_OPCODE
    }

    /// Register names referenced by this instruction's operands.
    pub fn register_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.operands
            .iter()
            .filter(|op| op.kind() == OpKind::Register)
            .map(|op| op.value())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for op in &self.operands {
            write!(f, " {op}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction;
    use crate::core::operand::OpKind;

    #[test]
    fn parses_opcode_and_register_operands() {
        let ins = Instruction::parse("add r1 r2 r3")
            .expect("parse")
            .expect("instruction");
        assert_eq!(ins.opcode, "ADD");
        assert_eq!(ins.operands.len(), 3);
        assert!(ins.operands.iter().all(|o| o.kind() == OpKind::Register));
    }

    #[test]
    fn parses_mixed_operand_kinds() {
        let expectations: &[(&str, &str, &[OpKind])] = &[
            ("Add\t$1 6 6", "ADD", &[OpKind::Register, OpKind::Number, OpKind::Number]),
            ("HLT \t \t", "HLT", &[]),
            ("jmp m6", "JMP", &[OpKind::Address]),
            (
                "bnz .label r0 r3",
                "BNZ",
                &[OpKind::Label, OpKind::Register, OpKind::Register],
            ),
            ("  lod $01 .label", "LOD", &[OpKind::Register, OpKind::Label]),
            ("  lod sp ~-42", "LOD", &[OpKind::StackPtr, OpKind::Relative]),
            ("out %numb  -006969", "OUT", &[OpKind::Port, OpKind::Negative]),
        ];
        for (line, opcode, kinds) in expectations {
            let ins = Instruction::parse(line).expect(line).expect(line);
            assert_eq!(ins.opcode, *opcode);
            let parsed: Vec<OpKind> = ins.operands.iter().map(|o| o.kind()).collect();
            assert_eq!(parsed.as_slice(), *kinds, "{line}");
        }
    }

    #[test]
    fn label_only_line_becomes_carrier() {
        let ins = Instruction::parse(".start .again")
            .expect("parse")
            .expect("instruction");
        assert!(ins.is_carrier());
        assert_eq!(ins.labels.len(), 2);
        assert_eq!(ins.labels[0].value(), "start");
    }

    #[test]
    fn blank_line_is_none() {
        assert!(Instruction::parse("   \t ").expect("parse").is_none());
    }

    #[test]
    fn labels_attach_before_opcode() {
        let ins = Instruction::parse(".loop ADD $1 $1 1")
            .expect("parse")
            .expect("instruction");
        assert_eq!(ins.opcode, "ADD");
        assert_eq!(ins.labels.len(), 1);
        assert_eq!(ins.labels[0].value(), "loop");
    }
}
