//! Parses an LLVM IR text file into a [`Program`] of [`Cfg`]s.
//!
//! The parser makes two passes. The first (`parse`'s main loop) sweeps the
//! file line by line, building basic blocks and CFGs and recording the
//! direct (textual fallthrough) successor/predecessor edges, plus every
//! label seen along the way. Labels can only be resolved to block ids once
//! the whole function has been seen, so indirect edges (`br`, `switch`) are
//! deferred to the second pass, [`resolve_indirect_edges`].

pub mod regex_rules;

use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::model::{BasicBlock, Cfg, Instruction, Program};

/// Parses the LLVM IR file at `path` into a [`Program`].
pub fn parse(path: &Path) -> Result<Program, Error> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_str(&contents))
}

/// Parses LLVM IR text already in memory. Split out from [`parse`] so tests
/// can exercise the line-sweep state machine without touching the
/// filesystem.
pub fn parse_str(contents: &str) -> Program {
    let mut program = Program::new();
    let mut cfg = Cfg::new("", 0);
    let mut next_cfg_id = 0usize;
    let mut bb = BasicBlock::new(0);
    let mut wait_for_switch_end = false;

    for (idx, raw_line) in contents.lines().enumerate() {
        let line_number = idx + 1;
        // `lines()` strips the trailing newline; restore it so the recorded
        // instruction text and the regex predicates see the same shape the
        // original line-oriented reader did.
        let line = format!("{raw_line}\n");

        if raw_line.is_empty() {
            continue;
        }

        if regex_rules::is_end_of_define(&line) {
            if let Some(last) = cfg.last_basic_block_mut() {
                last.reset_succ();
            }
            program.add_cfg(cfg);
            // The next CFG is set up when a `define` line is reached; this
            // placeholder is only ever visible if the file ends without one.
            cfg = Cfg::new("", next_cfg_id);
            continue;
        }

        if regex_rules::is_label_definition(&line) {
            if let Some(label) = regex_rules::extract_label_from_def(&line) {
                cfg.add_label(label, bb.id());
            }
            bb.mark_ignored();
        }

        if regex_rules::is_define(&line) {
            let name = regex_rules::extract_called_function(&line);
            program.add_defined_function(name.clone());
            cfg = Cfg::new(name, next_cfg_id);
            next_cfg_id += 1;
            bb = BasicBlock::new(0);
            bb.mark_ignored();
        }

        bb.push_instruction(Instruction::new(line_number, line.clone()));

        if regex_rules::is_switch(&line) {
            wait_for_switch_end = true;
        }

        if wait_for_switch_end && regex_rules::is_switch_end(&line) {
            wait_for_switch_end = false;
            (cfg, bb) = next_basic_block(cfg, bb, false);
        } else if regex_rules::is_br(&line) {
            (cfg, bb) = next_basic_block(cfg, bb, false);
        } else if regex_rules::is_call(&line)
            || regex_rules::is_ret(&line)
            || regex_rules::is_nonjumping_terminator(&line)
        {
            let next_id = bb.id() + 1;
            bb.add_succ(next_id);
            (cfg, bb) = next_basic_block(cfg, bb, true);
        } else if regex_rules::is_unsupported_jumping_terminator(&line) {
            log::warn!(
                "line {line_number}: terminator instruction currently not supported: {}",
                line.trim_end()
            );
            (cfg, bb) = next_basic_block(cfg, bb, false);
        }
    }

    resolve_indirect_edges(&mut program);
    program
}

/// Commits `bb` to `cfg` and opens a fresh block, wiring up the direct
/// predecessor edge when `add_pred` is set (i.e. the closed block falls
/// through into the new one rather than ending with an unresolved jump).
fn next_basic_block(mut cfg: Cfg, bb: BasicBlock, add_pred: bool) -> (Cfg, BasicBlock) {
    let closed_id = bb.id();
    cfg.add_basic_block(bb);
    let mut next = BasicBlock::new(closed_id + 1);
    if add_pred {
        next.add_pred(closed_id);
    }
    (cfg, next)
}

/// Second pass: resolves `br`/`switch` targets to block ids and wires up
/// the corresponding successor/predecessor edges. Only examines each
/// block's last instruction, since only a terminator can carry a jump.
fn resolve_indirect_edges(program: &mut Program) {
    for cfg in program.cfgs_mut() {
        if !cfg.has_labels() {
            continue;
        }

        for bb_id in 0..cfg.len() {
            let last_text = match cfg.basic_block(bb_id).last_instruction() {
                Some(instr) => instr.text().to_string(),
                None => continue,
            };

            if regex_rules::is_br(&last_text) {
                if let Some(label) = regex_rules::uncond_br_target(&last_text) {
                    add_edge_by_label(cfg, bb_id, &label);
                } else {
                    for label in regex_rules::cond_br_targets(&last_text) {
                        add_edge_by_label(cfg, bb_id, &label);
                    }
                }
            } else if regex_rules::is_switch_end(&last_text) {
                for label in switch_case_labels(cfg.basic_block(bb_id)) {
                    add_edge_by_label(cfg, bb_id, &label);
                }
            }
        }
    }
}

/// Walks a block's instructions backward from its last one, collecting
/// every `label %N` case target, stopping once the `switch` header itself
/// is reached.
fn switch_case_labels(bb: &BasicBlock) -> Vec<String> {
    let mut labels = Vec::new();
    for instr in bb.instructions().iter().rev() {
        let text = instr.text();
        if let Some(label) = regex_rules::numeric_label_operand(text) {
            labels.push(label);
        }
        if regex_rules::is_switch(text) {
            break;
        }
    }
    labels
}

fn add_edge_by_label(cfg: &mut Cfg, from: usize, label: &str) {
    let Some(to) = cfg.block_id_by_label(label) else {
        log::warn!("unresolved label %{label} in {}", cfg.name());
        return;
    };
    cfg.basic_block_mut(from).add_succ(to);
    cfg.basic_block_mut(to).add_pred(from);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_IR: &str = "\
define dso_local void @foo() {
entry:
  %x = alloca i32, align 4
  call void @klee_reach()
  ret void
}
";

    #[test]
    fn test_parses_single_block_function() {
        let program = parse_str(SIMPLE_IR);
        assert_eq!(program.cfgs().len(), 1);
        let cfg = &program.cfgs()[0];
        assert_eq!(cfg.name(), "@foo");
        assert!(program.is_defined_function("@foo"));
        // call splits the block, ret closes the final one: entry, post-call.
        assert_eq!(cfg.len(), 2);
        assert_eq!(cfg.basic_block(0).succ(), &[1]);
        assert_eq!(cfg.basic_block(1).pred(), &[0]);
        // the fallthrough successor of the last block must have been reset.
        assert!(cfg.basic_block(1).succ().is_empty());
    }

    const BRANCHING_IR: &str = "\
define dso_local i32 @branchy(i32 %n) {
entry:
  %cmp = icmp sgt i32 %n, 0
  br i1 %cmp, label %if.then, label %if.end
if.then:                                          ; preds = %entry
  call void @klee_reach()
  br label %if.end
if.end:                                           ; preds = %if.then, %entry
  ret i32 0
}
";

    #[test]
    fn test_resolves_conditional_and_unconditional_branches() {
        let program = parse_str(BRANCHING_IR);
        let cfg = &program.cfgs()[0];

        // a call splits a block just like a terminator does, so if.then is
        // actually two blocks: {if.then:, call} (1) and {br label %if.end}
        // (2). if.end itself opens block 3.
        assert_eq!(cfg.len(), 4);

        // block 0: entry, ends in cond br to if.then (1) and if.end (3)
        let entry = cfg.basic_block(0);
        assert_eq!(entry.succ(), &[1, 3]);

        // block 1: if.then header + call, falls through to block 2
        let if_then = cfg.basic_block(1);
        assert_eq!(if_then.succ(), &[2]);

        // block 2: the trailing `br label %if.end`, resolved to block 3
        let if_then_tail = cfg.basic_block(2);
        assert_eq!(if_then_tail.succ(), &[3]);

        // block 3: if.end, reached from both entry and if.then's tail
        let if_end = cfg.basic_block(3);
        assert!(if_end.pred().contains(&0));
        assert!(if_end.pred().contains(&2));
    }

    // clang lowers switch targets as bare numeric labels when the cases
    // have no source-level name; `has_label`/`numeric_label_operand` only
    // recognize that digit form (see regex_rules), so this fixture mirrors
    // real switch-lowered IR rather than using named block labels.
    const SWITCH_IR: &str = "\
define dso_local void @switchy(i32 %n) {
entry:
  switch i32 %n, label %5 [
    i32 0, label %6
    i32 1, label %7
  ]
6:                                                 ; preds = %entry
  call void @klee_reach()
  br label %8
7:                                                 ; preds = %entry
  br label %8
5:                                                 ; preds = %entry
  br label %8
8:                                                 ; preds = %5, %7, %6
  ret void
}
";

    #[test]
    fn test_resolves_switch_cases() {
        let program = parse_str(SWITCH_IR);
        let cfg = &program.cfgs()[0];
        let entry = cfg.basic_block(0);
        // labels %5, %6, %7 in the order the case list is scanned backward.
        assert_eq!(entry.succ().len(), 3);
    }

    #[test]
    fn test_unsupported_terminator_closes_block_without_successor() {
        let ir = "\
define dso_local void @f() personality i8* null {
entry:
  invoke void @g() to label %ok unwind label %lpad
ok:                                                ; preds = %entry
  ret void
lpad:                                              ; preds = %entry
  ret void
}
";
        let program = parse_str(ir);
        let cfg = &program.cfgs()[0];
        assert!(cfg.basic_block(0).succ().is_empty());
    }
}
