// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Program values and the hygiene primitives the expansion driver builds on.
//!
//! A `Program` owns its instruction sequence, a register-name list derived
//! from it (first-seen order), and the header directives carried through
//! untouched. Every transformation mutates the owned value; the register
//! list is kept in lockstep with the operand occurrences, it never drifts.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::core::error::{TrError, TrErrorKind};
use crate::core::instruction::{Instruction, CARRIER_OPCODE};
use crate::core::operand::{OpKind, Operand};

/// Name of the zero register. Shared by every program; excluded from
/// hygiene renaming and canonical renumbering.
pub const ZERO_REG: &str = "0";

/// Recognized header directives, carried through as opaque values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Header {
    Bits,
    MinReg,
    MinHeap,
    Run,
    MinStack,
}

impl Header {
    pub fn as_str(self) -> &'static str {
        match self {
            Header::Bits => "BITS",
            Header::MinReg => "MINREG",
            Header::MinHeap => "MINHEAP",
            Header::Run => "RUN",
            Header::MinStack => "MINSTACK",
        }
    }

    pub fn from_str(word: &str) -> Option<Header> {
        match word.to_ascii_uppercase().as_str() {
            "BITS" => Some(Header::Bits),
            "MINREG" => Some(Header::MinReg),
            "MINHEAP" => Some(Header::MinHeap),
            "RUN" => Some(Header::Run),
            "MINSTACK" => Some(Header::MinStack),
            _ => None,
        }
    }

    /// Fixed rendering order for output.
    pub const ALL: [Header; 5] = [
        Header::Bits,
        Header::MinReg,
        Header::MinHeap,
        Header::Run,
        Header::MinStack,
    ];
}

/// Mints fresh numeric suffixes for label names. Owned by the expansion
/// driver invocation and threaded through each splice explicitly.
#[derive(Debug, Default)]
pub struct UidGen {
    next: u64,
}

impl UidGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_uid(&mut self) -> u64 {
        let uid = self.next;
        self.next += 1;
        uid
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub(crate) code: Vec<Instruction>,
    pub(crate) headers: HashMap<Header, String>,
    pub(crate) regs: Vec<String>,
}

impl Program {
    /// Parses preprocessed-or-raw source text into a program. Comments are
    /// stripped, headers collected, label-only carrier lines merged onto the
    /// following instruction, and register names gathered in first-seen
    /// order.
    pub fn parse(source: &str) -> Result<Program, TrError> {
        let source = preprocess(source);
        let mut code: Vec<Instruction> = Vec::new();
        let mut headers = HashMap::new();
        for (idx, line) in source.lines().enumerate() {
            let line_num = idx as u32 + 1;
            if let Some((header, value)) = parse_header(line) {
                headers.insert(header, value);
                continue;
            }
            let Some(mut ins) = Instruction::parse(line).map_err(|e| e.with_line(line_num))?
            else {
                continue;
            };
            if code.last().is_some_and(Instruction::is_carrier) {
                if let Some(carrier) = code.pop() {
                    let mut labels = carrier.labels;
                    labels.append(&mut ins.labels);
                    ins.labels = labels;
                }
            }
            code.push(ins);
        }
        let regs = collect_regs(&code);
        Ok(Program {
            code,
            headers,
            regs,
        })
    }

    pub fn from_file(path: &Path) -> Result<Program, TrError> {
        let source = fs::read_to_string(path).map_err(|err| {
            TrError::new(
                TrErrorKind::Io,
                format!("cannot read '{}': {err}", path.display()),
            )
        })?;
        Program::parse(&source)
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    pub fn headers(&self) -> &HashMap<Header, String> {
        &self.headers
    }

    pub fn regs(&self) -> &[String] {
        &self.regs
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Renames a register everywhere it occurs, keeping the register list in
    /// step.
    pub fn rename_reg(&mut self, old: &str, new: &str) {
        for ins in &mut self.code {
            for op in &mut ins.operands {
                if op.kind() == OpKind::Register && op.value() == old {
                    op.set_value(new.to_string());
                }
            }
        }
        if let Some(slot) = self.regs.iter_mut().find(|r| *r == old) {
            *slot = new.to_string();
        }
    }

    /// Appends a distinguishing mark to every non-zero register name. The
    /// expansion driver calls this until a sub-program's names are disjoint
    /// from the enclosing program's.
    pub fn prime_regs(&mut self) {
        let marked: Vec<(String, String)> = self
            .regs
            .iter()
            .filter(|r| *r != ZERO_REG)
            .map(|r| (r.clone(), format!("{r}'")))
            .collect();
        for (old, new) in marked {
            self.rename_reg(&old, &new);
        }
    }

    /// True when this program shares a non-zero register name with `other`.
    pub fn regs_collide(&self, other: &[String]) -> bool {
        self.regs
            .iter()
            .any(|r| r != ZERO_REG && other.iter().any(|o| o == r))
    }

    /// Rewrites every label this program defines to a fresh suffixed name,
    /// updating internal references. References to labels defined elsewhere
    /// are left alone.
    pub fn unique_labels(&mut self, gen: &mut UidGen) {
        let mut renames: HashMap<String, String> = HashMap::new();
        for ins in &mut self.code {
            for label in &mut ins.labels {
                let fresh = format!("{}_{}", label.value(), gen.next_uid());
                renames.insert(label.value().to_string(), fresh.clone());
                label.set_value(fresh);
            }
        }
        for ins in &mut self.code {
            for op in &mut ins.operands {
                if op.kind() == OpKind::Label {
                    if let Some(fresh) = renames.get(op.value()) {
                        op.set_value(fresh.clone());
                    }
                }
            }
        }
    }

    /// Replaces every bound placeholder operand with its call-site operand.
    /// An unbound placeholder here is a rule-authoring defect.
    pub fn unpack_placeholders(&mut self) -> Result<(), TrError> {
        for ins in &mut self.code {
            for op in &mut ins.operands {
                if !op.is_placeholder() {
                    continue;
                }
                match op.bound() {
                    Some(actual) => {
                        let actual = actual.clone();
                        if actual.kind() == OpKind::Register
                            && !self.regs.iter().any(|r| r == actual.value())
                        {
                            self.regs.push(actual.value().to_string());
                        }
                        *op = actual;
                    }
                    None => {
                        return Err(TrError::new(
                            TrErrorKind::Placeholder,
                            format!("placeholder @{} was never bound", op.value()),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Replaces the instruction at `index` with `sub`'s instruction
    /// sequence, minting fresh names for the labels `sub` defines. Labels
    /// attached to the replaced instruction move onto the splice point so
    /// branches into it stay valid.
    pub fn splice(&mut self, index: usize, mut sub: Program, gen: &mut UidGen) {
        sub.unique_labels(gen);
        let mut labels = std::mem::take(&mut self.code[index].labels);
        self.code.splice(index..index + 1, sub.code);
        if !labels.is_empty() {
            if index < self.code.len() {
                labels.append(&mut self.code[index].labels);
                self.code[index].labels = labels;
            } else {
                let mut carrier = Instruction::new(CARRIER_OPCODE, Vec::new());
                carrier.labels = labels;
                self.code.push(carrier);
            }
        }
        for reg in sub.regs {
            if !self.regs.iter().any(|r| *r == reg) {
                self.regs.push(reg);
            }
        }
    }

    /// Canonical register numbering: every distinct non-zero register gets a
    /// dense 1-based numeric name, in the order registers are first observed
    /// in the final instruction stream. The zero register keeps its name.
    pub fn make_regs_numeric(&mut self) {
        let mut renames: HashMap<String, String> = HashMap::new();
        let mut next = 1usize;
        for ins in &self.code {
            for op in &ins.operands {
                if op.kind() == OpKind::Register && op.value() != ZERO_REG {
                    if !renames.contains_key(op.value()) {
                        renames.insert(op.value().to_string(), next.to_string());
                        next += 1;
                    }
                }
            }
        }
        for ins in &mut self.code {
            for op in &mut ins.operands {
                if op.kind() == OpKind::Register {
                    if let Some(new) = renames.get(op.value()) {
                        op.set_value(new.clone());
                    }
                }
            }
        }
        self.regs = collect_regs(&self.code);
    }

    /// Replaces relative-offset operands with labels attached to the target
    /// instruction, so target rule sets only ever see absolute labels.
    pub fn relatives_to_labels(&mut self, gen: &mut UidGen) -> Result<(), TrError> {
        let mut edits: Vec<(usize, usize, usize, String)> = Vec::new();
        for (i, ins) in self.code.iter().enumerate() {
            for (o, op) in ins.operands.iter().enumerate() {
                if op.kind() != OpKind::Relative {
                    continue;
                }
                let delta: i64 = op.value().parse().map_err(|_| {
                    TrError::new(
                        TrErrorKind::Parse,
                        format!("relative offset '{}' is not an integer", op.value()),
                    )
                })?;
                let target = i as i64 + delta;
                if target < 0 || target >= self.code.len() as i64 {
                    return Err(TrError::new(
                        TrErrorKind::Parse,
                        format!(
                            "relative offset {delta} from instruction {i} leaves the program"
                        ),
                    ));
                }
                let name = format!("{}_{}", ins.opcode, gen.next_uid());
                edits.push((i, o, target as usize, name));
            }
        }
        for (i, o, target, name) in edits {
            self.code[target].labels.push(Operand::label(name.clone()));
            self.code[i].operands[o] = Operand::label(name);
        }
        Ok(())
    }

    pub fn to_plain_string(&self, indent: usize) -> String {
        self.code
            .iter()
            .map(|ins| {
                let labels = ins
                    .labels
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("{labels:>indent$} {ins}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_plain_string(0))
    }
}

/// Recognizes a `HEADER value` line.
pub fn parse_header(line: &str) -> Option<(Header, String)> {
    let mut words = line.split_whitespace();
    let header = Header::from_str(words.next()?)?;
    let value: Vec<&str> = words.collect();
    if value.is_empty() {
        return None;
    }
    Some((header, value.join(" ")))
}

/// Register names appearing in `code`, first-seen order, zero register
/// included when referenced.
pub fn collect_regs(code: &[Instruction]) -> Vec<String> {
    let mut regs: Vec<String> = Vec::new();
    for ins in code {
        for name in ins.register_names() {
            if !regs.iter().any(|r| r == name) {
                regs.push(name.to_string());
            }
        }
    }
    regs
}

/// Strips `//` line comments and `/* */` block comments. Newlines inside
/// removed blocks are preserved so error line numbers stay accurate.
pub fn preprocess(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' {
            match chars.peek() {
                Some('/') => {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = ' ';
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            out.push('\n');
                        }
                        if prev == '*' && skipped == '/' {
                            break;
                        }
                        prev = skipped;
                    }
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}
