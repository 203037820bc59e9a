// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use super::{Translator, URCL_RULES};
use crate::core::error::TrErrorKind;
use crate::core::instruction::Instruction;
use crate::core::operand::OpKind;
use crate::core::program::{Program, UidGen};

fn translator(rules: &str) -> Translator {
    let (translator, diagnostics) = Translator::from_rules_text(rules);
    assert!(diagnostics.is_empty(), "rule text should parse cleanly");
    translator
}

fn program(source: &str) -> Program {
    Program::parse(source).expect("program parses")
}

fn instruction(line: &str) -> Instruction {
    Instruction::parse(line).expect("parses").expect("instruction")
}

fn opcodes(program: &Program) -> Vec<&str> {
    program.code().iter().map(|i| i.opcode.as_str()).collect()
}

#[test]
fn single_substitution_reuses_call_site_registers() {
    let translator = translator("ADD :: R R R {\nMOV @A @B\nADD @A @A @C\n}\n");
    let ins = instruction("ADD $1 $2 $3");
    let mut sub = translator
        .substitute_program(&ins)
        .expect("no error")
        .expect("case matches");
    sub.unpack_placeholders().expect("all placeholders bound");

    assert_eq!(sub.code().len(), 2);
    assert_eq!(sub.code()[0].opcode, "MOV");
    assert_eq!(sub.code()[1].opcode, "ADD");
    let values: Vec<&str> = sub.code()[1].operands.iter().map(|o| o.value()).collect();
    assert_eq!(values, ["1", "1", "3"]);
    assert_eq!(sub.regs(), ["1", "2", "3"]);
    assert!(sub.code().iter().all(|i| i.labels.is_empty()));
}

#[test]
fn expansion_reaches_fixpoint_and_is_idempotent() {
    let translator = translator("MOV :: R R {\nADD @A @B $0\n}\n");
    let mut gen = UidGen::new();
    let expanded = translator
        .expand(program("MOV $1 $2\n"), &mut gen)
        .expect("expand");
    assert_eq!(opcodes(&expanded), ["ADD"]);
    let rendered = expanded.to_plain_string(0);

    let again = translator.expand(expanded, &mut gen).expect("expand");
    assert_eq!(again.to_plain_string(0), rendered);
}

#[test]
fn sibling_expansions_get_distinct_temporaries() {
    let translator = translator(
        "SUB :: R R R {\nNOR $t @C @C\nADD $t $t 1\nADD @A @B $t\n}\n",
    );
    let mut gen = UidGen::new();
    let expanded = translator
        .expand(program("SUB $1 $2 $3\nSUB $4 $5 $6\n"), &mut gen)
        .expect("expand");

    assert_eq!(expanded.code().len(), 6);
    let originals = ["1", "2", "3", "4", "5", "6"];
    let temps: Vec<&String> = expanded
        .regs()
        .iter()
        .filter(|r| !originals.contains(&r.as_str()))
        .collect();
    assert_eq!(temps.len(), 2, "one temporary per expansion");
    assert_ne!(temps[0], temps[1]);
    assert_eq!(expanded.regs().len(), 8);
}

#[test]
fn nested_rules_expand_depth_first() {
    let translator = translator(
        "AND :: R R R {\nNOR $p @B @B\nNOR $q @C @C\nNOR @A $p $q\n}\n\
         XOR :: R R R {\nNOR $u @B @C\nAND $v @B @C\nNOR @A $u $v\n}\n",
    );
    let mut gen = UidGen::new();
    let expanded = translator
        .expand(program("XOR $1 $2 $3\n"), &mut gen)
        .expect("expand");

    assert_eq!(opcodes(&expanded), ["NOR", "NOR", "NOR", "NOR", "NOR"]);
    // u, v, p, q plus the three call-site registers.
    assert_eq!(expanded.regs().len(), 7);
}

#[test]
fn expansion_labels_are_unique_per_splice() {
    let translator = translator(
        "TWICE :: R {\n.again ADD @A @A 1\nBNZ .again @A\n}\n",
    );
    let mut gen = UidGen::new();
    let expanded = translator
        .expand(program("TWICE $1\nTWICE $2\n"), &mut gen)
        .expect("expand");

    let defined: Vec<&str> = expanded
        .code()
        .iter()
        .flat_map(|i| i.labels.iter().map(|l| l.value()))
        .collect();
    assert_eq!(defined.len(), 2);
    assert_ne!(defined[0], defined[1]);
    // Each reference resolves to its own expansion's definition.
    for ins in expanded.code().iter().filter(|i| i.opcode == "BNZ") {
        let target = ins.operands[0].value();
        assert!(defined.contains(&target));
    }
}

#[test]
fn labels_on_rewritten_instructions_survive_the_splice() {
    let translator = translator("MOV :: R R {\nADD @A @B $0\n}\n");
    let mut gen = UidGen::new();
    let expanded = translator
        .expand(program(".entry MOV $1 $2\n"), &mut gen)
        .expect("expand");
    assert_eq!(expanded.code()[0].labels.len(), 1);
    assert_eq!(expanded.code()[0].labels[0].value(), "entry");
}

#[test]
fn external_label_references_pass_through_unrenamed() {
    let translator = translator(
        "BRZ :: L R {\nBGE @A $0 @B\n}\n",
    );
    let mut gen = UidGen::new();
    let expanded = translator
        .expand(program("BRZ .same $1\n.same HLT\n"), &mut gen)
        .expect("expand");
    assert_eq!(expanded.code()[0].operands[0].value(), "same");
}

#[test]
fn first_matching_case_wins_in_file_order() {
    let translator = translator(
        "ADD :: A A A {\nIMM @A 1\n}\nADD :: R R R {\nIMM @A 2\n}\n",
    );
    let lines = translator
        .substitute(&instruction("ADD $1 $2 $3"))
        .expect("no error")
        .expect("case matches");
    assert_eq!(lines, ["IMM $1 1"]);
}

#[test]
fn identity_rules_round_trip_through_emission() {
    let translator = translator(
        "ADD :: A A A {\nADD @A @B @C\n}\nIMM :: A A {\nIMM @A @B\n}\n",
    );
    let source = program("ADD $1 $2 $3\nIMM $4 5\n");
    let blocks = translator.emit(&source).expect("emit");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].lines(), ["ADD $1 $2 $3"]);
    assert_eq!(blocks[1].lines(), ["IMM $4 5"]);
}

#[test]
fn unmatched_instructions_pass_through_emission() {
    let translator = translator("MOV :: R R {\nmov @A, @B\n}\n");
    let blocks = translator
        .emit(&program("MOV $1 $2\nHLT\n"))
        .expect("emit");
    assert_eq!(blocks[0].lines(), ["mov $1, $2"]);
    assert_eq!(blocks[1].lines(), ["HLT"]);
}

#[test]
fn word_suffix_renders_through_substitution() {
    let translator = translator("LOD :: R A {\nlod @A, @B\n}\n");
    let blocks = translator
        .emit(&program("LOD $1[2] #5\n"))
        .expect("emit");
    assert_eq!(blocks[0].lines(), ["lod $1[2], #5"]);
}

#[test]
fn placeholder_beyond_arity_is_a_rule_error() {
    let translator = translator("INC :: R {\nADD @A @B 1\n}\n");
    let ins = instruction("INC $1");

    let err = translator.substitute_program(&ins).expect_err("out of range");
    assert_eq!(err.kind(), TrErrorKind::Placeholder);

    let err = translator.substitute(&ins).expect_err("out of range");
    assert_eq!(err.kind(), TrErrorKind::Placeholder);
}

#[test]
fn unresolved_placeholder_fails_emission() {
    let translator = translator("");
    let err = translator
        .emit(&program("ADD @A $1 $2\n"))
        .expect_err("placeholder reached emission");
    assert_eq!(err.kind(), TrErrorKind::Placeholder);
}

#[test]
fn builtin_rules_lower_to_core_urcl() {
    let (translator, diagnostics) = Translator::from_rules_text(URCL_RULES);
    assert!(diagnostics.is_empty(), "built-in rules parse cleanly");
    let lowered = translator
        .translate(program("MOV $1 5\nPSH $1\nHLT\n"))
        .expect("translate");
    assert_eq!(opcodes(&lowered), ["IMM", "ADD", "STR", "HLT"]);
    // Stack pointer operands are not registers and survive renumbering.
    assert_eq!(lowered.code()[1].operands[0].kind(), OpKind::StackPtr);
    assert_eq!(lowered.regs(), ["1"]);
}

#[test]
fn builtin_call_and_return_use_disjoint_scratch_registers() {
    let (translator, _) = Translator::from_rules_text(URCL_RULES);
    let lowered = translator
        .translate(program("CAL .fn\nHLT\n.fn RET\n"))
        .expect("translate");

    // The CAL expansion defines a unique return label and references it.
    let defined: Vec<&str> = lowered
        .code()
        .iter()
        .flat_map(|i| i.labels.iter().map(|l| l.value()))
        .collect();
    for ins in lowered.code() {
        for op in &ins.operands {
            if op.kind() == OpKind::Label {
                assert!(
                    defined.contains(&op.value()),
                    "dangling label reference {}",
                    op.value()
                );
            }
        }
    }
    // CAL's scratch and RET's scratch were renamed apart, then renumbered.
    assert_eq!(lowered.regs().len(), 2);
}

#[test]
fn nested_branch_lowering_keeps_external_target() {
    let (translator, _) = Translator::from_rules_text(URCL_RULES);
    let mut gen = UidGen::new();
    let expanded = translator
        .expand(program("BRE .same $1 $2\n.same HLT\n"), &mut gen)
        .expect("expand");
    assert_eq!(opcodes(&expanded), ["NOR", "ADD", "ADD", "BGE", "HLT"]);
    let bge = &expanded.code()[3];
    assert_eq!(bge.operands[0].value(), "same");
}

#[test]
fn translate_renumbers_registers_densely() {
    let translator = translator(
        "SUB :: R R R {\nNOR $t @C @C\nADD $t $t 1\nADD @A @B $t\n}\n",
    );
    let translated = translator
        .translate(program("SUB $9 $8 $7\n"))
        .expect("translate");
    // First-observed order in the final stream: t, 7, 9, 8.
    let values: Vec<&str> = translated.code()[0]
        .operands
        .iter()
        .map(|o| o.value())
        .collect();
    assert_eq!(values, ["1", "2", "2"]);
    assert_eq!(translated.regs().len(), 4);
    assert!(translated
        .regs()
        .iter()
        .all(|r| r.chars().all(|c| c.is_ascii_digit())));
}

#[test]
fn translate_resolves_relative_offsets() {
    let translator = translator("");
    let translated = translator
        .translate(program("IMM $1 0\nIMM $1 1\nIMM $1 2\nIMM $1 3\nIMM $1 4\nJMP ~-2\n"))
        .expect("translate");
    let jmp = &translated.code()[5];
    assert_eq!(jmp.operands[0].kind(), OpKind::Label);
    let target = &translated.code()[3];
    assert_eq!(target.labels.len(), 1);
    assert_eq!(target.labels[0].value(), jmp.operands[0].value());
}
