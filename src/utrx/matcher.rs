// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Pattern token evaluation.
//!
//! A token is scanned left to right, accumulating inversion parity (`!`),
//! type code tests against the operand's classification tag, `$literal$`
//! equality clauses and `>`N / `<`N threshold clauses. Literal and threshold
//! clauses fail the match immediately when violated; type codes are
//! OR-combined, the first one that holds wins and later codes are skipped.
//! A token with no type codes never matches.

use crate::core::operand::Operand;
use crate::utrx::types::TYPE_CODES;

/// Evaluates one operand against one pattern token. Pure.
///
/// Inversion parity is tracked as a running toggle so a token can invert a
/// threshold clause and restore parity for the type codes (`!>5!I`). The
/// type clause is the OR of all code memberships, XOR'd once with the parity
/// in effect at the first code: `!GO` rejects registers and ports alike.
pub fn match_token(operand: &Operand, token: &str) -> bool {
    let chars: Vec<char> = token.chars().collect();
    let mut invert = false;
    let mut type_seen = false;
    let mut type_invert = false;
    let mut any_contains = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '!' => {
                invert = !invert;
                i += 1;
            }
            '$' => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != '$' {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                if i < chars.len() {
                    i += 1;
                }
                if (operand.value() != literal) != invert {
                    return false;
                }
            }
            sym @ ('>' | '<') => {
                i += 1;
                let start = i;
                if i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
                    i += 1;
                }
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let bound: String = chars[start..i].iter().collect();
                let Ok(bound) = bound.parse::<i64>() else {
                    return false;
                };
                let Ok(value) = operand.value().parse::<i64>() else {
                    return false;
                };
                let violated = if sym == '>' {
                    value <= bound
                } else {
                    value >= bound
                };
                if violated != invert {
                    return false;
                }
            }
            code => {
                if TYPE_CODES.contains(code) {
                    if !type_seen {
                        type_seen = true;
                        type_invert = invert;
                    }
                    if !any_contains && operand.class().contains(code) {
                        any_contains = true;
                    }
                }
                i += 1;
            }
        }
    }
    type_seen && (any_contains != type_invert)
}

/// Evaluates a whole pattern against an instruction's operands. The operand
/// count must equal the token count and every positional pair must match.
pub fn match_pattern(operands: &[Operand], tokens: &[String]) -> bool {
    operands.len() == tokens.len()
        && operands
            .iter()
            .zip(tokens)
            .all(|(op, token)| match_token(op, token))
}

#[cfg(test)]
mod tests {
    use super::{match_pattern, match_token};
    use crate::core::operand::Operand;

    fn op(token: &str) -> Operand {
        Operand::parse(token).expect(token)
    }

    #[test]
    fn repeated_calls_agree_and_leave_operand_untouched() {
        let operand = op("$3");
        let before = (operand.value().to_string(), operand.class().to_string());
        let first = match_token(&operand, "R");
        let second = match_token(&operand, "R");
        assert!(first && second);
        assert_eq!(
            before,
            (operand.value().to_string(), operand.class().to_string())
        );
    }

    #[test]
    fn type_codes_are_or_combined() {
        // General register or port.
        assert!(match_token(&op("$3"), "GO"));
        assert!(match_token(&op("%numb"), "GO"));
        assert!(!match_token(&op(".label"), "GO"));
    }

    #[test]
    fn inversion_flips_type_codes() {
        assert!(!match_token(&op("$3"), "!GO"));
        assert!(!match_token(&op("%numb"), "!GO"));
        assert!(match_token(&op(".label"), "!GO"));
    }

    #[test]
    fn thresholds_are_strict() {
        assert!(match_token(&op("10"), "I>5"));
        assert!(!match_token(&op("3"), "I>5"));
        assert!(!match_token(&op("5"), "I>5"));
        assert!(match_token(&op("3"), "I<5"));
        assert!(!match_token(&op("10"), "I<5"));
    }

    #[test]
    fn threshold_inversion_is_the_complement() {
        assert!(!match_token(&op("10"), "!>5!I"));
        assert!(match_token(&op("3"), "!>5!I"));
    }

    #[test]
    fn signed_values_compare_numerically() {
        assert!(match_token(&op("-7"), "C<0"));
        assert!(!match_token(&op("-7"), "C>0"));
    }

    #[test]
    fn literal_clause_tests_exact_value() {
        assert!(match_token(&op("$5"), "R$5$"));
        assert!(!match_token(&op("$6"), "R$5$"));
        // Inverted literal: anything but 5.
        assert!(match_token(&op("$6"), "!$5$!R"));
        assert!(!match_token(&op("$5"), "!$5$!R"));
    }

    #[test]
    fn unterminated_literal_still_compares() {
        assert!(match_token(&op("$5"), "R$5"));
        assert!(!match_token(&op("$6"), "R$5"));
    }

    #[test]
    fn token_without_type_codes_never_matches() {
        assert!(!match_token(&op("$5"), "$5$"));
        assert!(!match_token(&op("10"), ">5"));
        assert!(!match_token(&op("$5"), "!"));
    }

    #[test]
    fn non_numeric_value_fails_thresholds() {
        assert!(!match_token(&op(".label"), "L>5"));
    }

    #[test]
    fn pattern_requires_exact_arity() {
        let operands = [op("$1"), op("$2")];
        let tokens = vec!["R".to_string(), "R".to_string()];
        assert!(match_pattern(&operands, &tokens));
        assert!(!match_pattern(&operands[..1], &tokens));
        assert!(!match_pattern(&operands, &tokens[..1].to_vec()));
    }

    #[test]
    fn zero_register_matches_zero_code() {
        assert!(match_token(&op("$0"), "Z"));
        assert!(match_token(&op("R0"), "Z"));
        assert!(match_token(&op("0"), "Z"));
        assert!(!match_token(&op("$1"), "Z"));
    }
}
