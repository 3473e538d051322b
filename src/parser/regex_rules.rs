//! Regex-based predicates recognizing the textual shape of LLVM IR lines.
//!
//! The parser is intentionally regex-based rather than tokenizing: spec.md
//! §4.1 documents the recognized line kinds as substring/pattern predicates,
//! and this module is the single place that documents and tests them (per
//! spec.md §9: "keep the predicate set ... centrally documented and
//! regression-tested"). There is no instruction class hierarchy — every
//! predicate operates on the same flat `&str`.

use std::sync::OnceLock;

use regex::Regex;

fn called_function_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@\w+").unwrap())
}

fn label_ident_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A named LLVM identifier or a bare numeric one, as an operand: %foo, %12
    RE.get_or_init(|| Regex::new(r"%(?:[-a-zA-Z$._][-a-zA-Z$._0-9]*|[0-9]*)").unwrap())
}

fn label_def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:[-a-zA-Z$._][-a-zA-Z$._0-9]*|[0-9]*):").unwrap())
}

fn uncond_br_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"br label (?:%[-a-zA-Z$._][-a-zA-Z$._0-9]*|%[0-9]*)").unwrap()
    })
}

fn cond_br_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r", label %[-a-zA-Z$._][-a-zA-Z$._0-9]*|, label %[0-9]*").unwrap()
    })
}

fn numeric_label_operand_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"label %\d+").unwrap())
}

/// Terminator instructions with no jump target, other than `ret`: these
/// close a block with no outgoing edge.
const NONJUMPING_TERMINATORS: &[&str] = &["resume ", "unreachable"];

/// Terminator instructions that jump via labels but are not `br`/`switch`.
/// spec.md explicitly leaves these unsupported: the block is closed with no
/// outgoing edge and a warning is emitted.
const UNSUPPORTED_JUMPING_TERMINATORS: &[&str] = &[
    "indirectbr ",
    "invoke ",
    "callbr ",
    "catchswitch ",
    "catchret ",
    "cleanupret ",
];

pub fn is_define(line: &str) -> bool {
    line.contains("define ")
}

/// True for the line that closes a function body.
pub fn is_end_of_define(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "}"
}

pub fn is_llvm_debug_call(line: &str) -> bool {
    line.contains("@llvm.dbg")
}

/// A call to a function, excluding LLVM debug intrinsics.
pub fn is_call(line: &str) -> bool {
    line.contains("call ") && !is_llvm_debug_call(line)
}

pub fn is_ret(line: &str) -> bool {
    line.contains("ret ")
}

pub fn is_klee_reach(line: &str) -> bool {
    line.contains(crate::constants::TARGET_SYMBOL)
}

pub fn is_br(line: &str) -> bool {
    line.contains("br ")
}

pub fn is_switch(line: &str) -> bool {
    line.contains("switch ")
}

pub fn is_switch_end(line: &str) -> bool {
    line.contains(" ]")
}

/// True if `line` is a non-jumping terminator (`resume`, `unreachable`).
pub fn is_nonjumping_terminator(line: &str) -> bool {
    NONJUMPING_TERMINATORS.iter().any(|kw| line.contains(kw))
}

/// True if `line` is a terminator with labels that spec.md leaves
/// unsupported (`indirectbr`, `invoke`, `callbr`, `catchswitch`, `catchret`,
/// `cleanupret`).
pub fn is_unsupported_jumping_terminator(line: &str) -> bool {
    UNSUPPORTED_JUMPING_TERMINATORS
        .iter()
        .any(|kw| line.contains(kw))
}

/// True if `line` is a label definition: an identifier followed by `:`,
/// annotated with a `; preds = ...` comment (the form LLVM's printer emits
/// for any block with at least one predecessor).
pub fn is_label_definition(line: &str) -> bool {
    label_def_re().is_match(line) && line.contains("; preds =")
}

/// Extracts the name of the called function from a `call`/`define` line,
/// e.g. `call void @foo(...)` -> `"@foo"`. Returns an empty string if no
/// `@identifier` is present (malformed IR degrades silently per spec.md §7).
pub fn extract_called_function(line: &str) -> String {
    called_function_re()
        .find(line)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts the label name from a label-definition line, e.g.
/// `"42:  ; preds = %41\n"` -> `"42"`.
pub fn extract_label_from_def(line: &str) -> Option<String> {
    label_def_re()
        .find(line)
        .map(|m| m.as_str().trim_end_matches(':').to_string())
}

/// True if `line`'s last instruction is an unconditional `br`, and if so,
/// the target label name.
pub fn uncond_br_target(line: &str) -> Option<String> {
    let m = uncond_br_re().find(line)?;
    extract_label(m.as_str())
}

/// Extracts both target label names from a conditional `br` instruction.
pub fn cond_br_targets(line: &str) -> Vec<String> {
    cond_br_label_re()
        .find_iter(line)
        .filter_map(|m| extract_label(m.as_str()))
        .collect()
}

/// Extracts a bare numeric `label %N` operand, as used when walking a
/// `switch` instruction's case list backward.
pub fn numeric_label_operand(line: &str) -> Option<String> {
    let m = numeric_label_operand_re().find(line)?;
    extract_label(m.as_str())
}

/// Extracts the identifier out of a `%name`-shaped operand fragment.
fn extract_label(fragment: &str) -> Option<String> {
    label_ident_re()
        .find(fragment)
        .map(|m| m.as_str().trim_start_matches('%').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_call_excludes_debug_intrinsics() {
        assert!(is_call("  call void @foo()\n"));
        assert!(!is_call(
            "  call void @llvm.dbg.declare(metadata %x, metadata !1)\n"
        ));
    }

    #[test]
    fn test_extract_called_function() {
        assert_eq!(extract_called_function("  call void @foo(i32 %x)\n"), "@foo");
        assert_eq!(extract_called_function("  %r = call i32 @bar()\n"), "@bar");
        assert_eq!(extract_called_function("no at sign here\n"), "");
    }

    #[test]
    fn test_is_label_definition() {
        assert!(is_label_definition("42:                                              ; preds = %41\n"));
        assert!(!is_label_definition("  ret void\n"));
        assert!(!is_label_definition("42:\n")); // no preds comment
    }

    #[test]
    fn test_extract_label_from_def() {
        assert_eq!(
            extract_label_from_def("if.then:                                          ; preds = %entry\n"),
            Some("if.then".to_string())
        );
    }

    #[test]
    fn test_uncond_br_target() {
        assert_eq!(
            uncond_br_target("  br label %if.end\n"),
            Some("if.end".to_string())
        );
        assert_eq!(
            uncond_br_target("  br i1 %cond, label %a, label %b\n"),
            None
        );
    }

    #[test]
    fn test_cond_br_targets() {
        let targets = cond_br_targets("  br i1 %cond, label %a, label %b\n");
        assert_eq!(targets, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_numeric_label_operand() {
        assert_eq!(
            numeric_label_operand("    i32 1, label %5"),
            Some("5".to_string())
        );
        assert_eq!(numeric_label_operand("    i32 1, label %named"), None);
    }

    #[test]
    fn test_is_end_of_define() {
        assert!(is_end_of_define("}\n"));
        assert!(!is_end_of_define("} ; comment\n"));
    }

    #[test]
    fn test_unsupported_terminators() {
        assert!(is_unsupported_jumping_terminator("  invoke void @f() to label %ok unwind label %lp\n"));
        assert!(!is_unsupported_jumping_terminator("  br label %x\n"));
        assert!(is_nonjumping_terminator("  unreachable\n"));
    }
}
