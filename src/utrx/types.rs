// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Parameter type codes and their subtype lattice.
//!
//! Pattern tokens constrain operands with single-character type codes. The
//! lattice below documents how the codes refine each other; the runtime
//! matcher never walks it, it tests code membership in an operand's
//! precomputed classification tag instead (see `core::operand::classify`).
//! The two encodings must be kept consistent.

/// All recognized type code characters.
pub const TYPE_CODES: &str = "ARVSNGZPIMLCO";

/// Parameter type codes a pattern token may constrain an operand with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// `A`: any operand.
    Any,
    /// `R`: any register.
    Register,
    /// `V`: volatile register, read once then overwritable.
    VolatileRegister,
    /// `S`: stack pointer.
    StackPointer,
    /// `N`: register holding a signed integer.
    SignedIntRegister,
    /// `G`: general purpose register.
    GeneralRegister,
    /// `Z`: zero register or the constant 0.
    Zero,
    /// `P`: pointer, a register holding a label or memory address.
    Pointer,
    /// `I`: any immediate.
    Immediate,
    /// `M`: immediate memory address.
    ImmediateAddress,
    /// `L`: immediate label.
    Label,
    /// `C`: signed immediate, denoted by a leading `+` or `-`.
    SignedImmediate,
    /// `O`: I/O port.
    Port,
}

impl ParamType {
    pub fn code(self) -> char {
        match self {
            ParamType::Any => 'A',
            ParamType::Register => 'R',
            ParamType::VolatileRegister => 'V',
            ParamType::StackPointer => 'S',
            ParamType::SignedIntRegister => 'N',
            ParamType::GeneralRegister => 'G',
            ParamType::Zero => 'Z',
            ParamType::Pointer => 'P',
            ParamType::Immediate => 'I',
            ParamType::ImmediateAddress => 'M',
            ParamType::Label => 'L',
            ParamType::SignedImmediate => 'C',
            ParamType::Port => 'O',
        }
    }

    pub fn from_code(code: char) -> Option<ParamType> {
        match code {
            'A' => Some(ParamType::Any),
            'R' => Some(ParamType::Register),
            'V' => Some(ParamType::VolatileRegister),
            'S' => Some(ParamType::StackPointer),
            'N' => Some(ParamType::SignedIntRegister),
            'G' => Some(ParamType::GeneralRegister),
            'Z' => Some(ParamType::Zero),
            'P' => Some(ParamType::Pointer),
            'I' => Some(ParamType::Immediate),
            'M' => Some(ParamType::ImmediateAddress),
            'L' => Some(ParamType::Label),
            'C' => Some(ParamType::SignedImmediate),
            'O' => Some(ParamType::Port),
            _ => None,
        }
    }

    /// Strict subtypes of this code.
    fn subtypes(self) -> &'static [ParamType] {
        match self {
            ParamType::Any => &[
                ParamType::Register,
                ParamType::VolatileRegister,
                ParamType::StackPointer,
                ParamType::SignedIntRegister,
                ParamType::GeneralRegister,
                ParamType::Zero,
                ParamType::Pointer,
                ParamType::Immediate,
                ParamType::ImmediateAddress,
                ParamType::Label,
                ParamType::SignedImmediate,
                ParamType::Port,
            ],
            ParamType::Register => &[
                ParamType::VolatileRegister,
                ParamType::StackPointer,
                ParamType::SignedIntRegister,
                ParamType::GeneralRegister,
                ParamType::Zero,
                ParamType::Pointer,
            ],
            ParamType::Immediate => &[
                ParamType::ImmediateAddress,
                ParamType::Label,
                ParamType::SignedImmediate,
                ParamType::Zero,
                ParamType::Port,
            ],
            ParamType::GeneralRegister => &[
                ParamType::VolatileRegister,
                ParamType::SignedIntRegister,
                ParamType::StackPointer,
                ParamType::Pointer,
            ],
            ParamType::Pointer => &[ParamType::StackPointer],
            _ => &[],
        }
    }
}

/// True when `child` refines `parent` in the lattice. Reflexive.
pub fn is_subtype(child: ParamType, parent: ParamType) -> bool {
    child == parent || parent.subtypes().contains(&child)
}
