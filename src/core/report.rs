// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Shared colour helpers for terminal rendering.

use crate::core::operand::{OpKind, Operand};

const RESET: &str = "\x1b[0m";

/// Syntax highlight colour for an operand kind, empty when unstyled.
pub fn colour_for(kind: OpKind) -> &'static str {
    match kind {
        OpKind::Register | OpKind::StackPtr => "\x1b[96m",
        OpKind::Address | OpKind::Port => "\x1b[32m",
        OpKind::Label | OpKind::Relative => "\x1b[33m",
        OpKind::Other => "\x1b[31m",
        OpKind::Number | OpKind::Negative => "",
    }
}

/// Renders an operand with or without colour.
pub fn paint_operand(op: &Operand, use_color: bool) -> String {
    if !use_color {
        return op.to_string();
    }
    let colour = colour_for(op.kind());
    if colour.is_empty() {
        op.to_string()
    } else {
        format!("{colour}{op}{RESET}")
    }
}

/// Honours the NO_COLOR convention on top of an explicit flag.
pub fn use_color(no_color_flag: bool) -> bool {
    !no_color_flag && std::env::var_os("NO_COLOR").is_none()
}

#[cfg(test)]
mod tests {
    use super::paint_operand;
    use crate::core::operand::Operand;

    #[test]
    fn plain_rendering_has_no_escapes() {
        let op = Operand::parse("$1").expect("operand");
        assert_eq!(paint_operand(&op, false), "$1");
    }

    #[test]
    fn coloured_rendering_wraps_value() {
        let op = Operand::parse(".loop").expect("operand");
        let painted = paint_operand(&op, true);
        assert!(painted.starts_with("\x1b["));
        assert!(painted.contains(".loop"));
        assert!(painted.ends_with("\x1b[0m"));
    }
}
