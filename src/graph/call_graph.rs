//! `G_call` / `G_ret` and their transposes: the interprocedural edges that
//! supplement a CFG's intraprocedural successor/predecessor lists with
//! "jump into a callee" and "jump back from a callee" edges.
//!
//! The distance pass (see [`crate::distance`]) only ever walks the
//! *transposed* graphs — moving from the target backward toward callers —
//! so this module builds the transposes directly rather than materializing
//! `G_call`/`G_ret` and flipping them as a separate step.

use std::collections::HashMap;

use crate::model::Program;
use crate::parser::regex_rules;

/// A basic block identified by the CFG that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub cfg_id: usize,
    pub block_id: usize,
}

impl CallSite {
    pub fn new(cfg_id: usize, block_id: usize) -> Self {
        Self { cfg_id, block_id }
    }
}

/// `G_call`: maps a call-ending block to the entry block (id 0) of the
/// callee, for every call whose target is itself a CFG in this program.
pub fn compute_g_call(program: &Program) -> HashMap<CallSite, CallSite> {
    let mut g_call = HashMap::new();
    for cfg in program.cfgs() {
        for bb in cfg.basic_blocks() {
            let Some(last) = bb.last_instruction() else {
                continue;
            };
            if !regex_rules::is_call(last.text()) {
                continue;
            }
            let called = regex_rules::extract_called_function(last.text());
            if let Some(target) = program.cfg_by_name(&called) {
                g_call.insert(CallSite::new(cfg.id(), bb.id()), CallSite::new(target.id(), 0));
            }
        }
    }
    g_call
}

/// `G_ret`: for every call site recorded in `g_call`, maps each of the
/// callee's `ret` blocks to the block right after the call in the caller
/// (the landing site once the callee returns).
pub fn compute_g_ret(
    program: &Program,
    g_call: &HashMap<CallSite, CallSite>,
) -> HashMap<CallSite, Vec<CallSite>> {
    let mut g_ret: HashMap<CallSite, Vec<CallSite>> = HashMap::new();
    for (&caller_site, &callee_entry) in g_call {
        let callee = program.cfg(callee_entry.cfg_id);
        for bb in callee.basic_blocks() {
            let Some(last) = bb.last_instruction() else {
                continue;
            };
            if !regex_rules::is_ret(last.text()) {
                continue;
            }
            let landing = CallSite::new(caller_site.cfg_id, caller_site.block_id + 1);
            g_ret
                .entry(CallSite::new(callee.id(), bb.id()))
                .or_default()
                .push(landing);
        }
    }
    g_ret
}

/// Transpose of `G_call`: each callee entry block maps back to every call
/// site that targets it.
pub fn transpose_g_call(g_call: &HashMap<CallSite, CallSite>) -> HashMap<CallSite, Vec<CallSite>> {
    let mut g_call_t: HashMap<CallSite, Vec<CallSite>> = HashMap::new();
    for (&caller_site, &callee_entry) in g_call {
        g_call_t.entry(callee_entry).or_default().push(caller_site);
    }
    g_call_t
}

/// Transpose of `G_ret`: each landing site maps back to every `ret` block
/// that returns to it.
///
/// Multiple distinct `ret` blocks in different call paths can legitimately
/// share one landing site (e.g. two call sites at the same source line in
/// a loop body, or a callee with several `ret`s). The transpose must
/// therefore append rather than overwrite at each key.
pub fn transpose_g_ret(g_ret: &HashMap<CallSite, Vec<CallSite>>) -> HashMap<CallSite, Vec<CallSite>> {
    let mut g_ret_t: HashMap<CallSite, Vec<CallSite>> = HashMap::new();
    for (&ret_site, landings) in g_ret {
        for &landing in landings {
            g_ret_t.entry(landing).or_default().push(ret_site);
        }
    }
    g_ret_t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BasicBlock, Cfg, Instruction};

    fn two_function_program() -> Program {
        // @caller: bb0 calls @callee, bb1 is the landing site and returns.
        let mut caller = Cfg::new("@caller", 0);
        let mut bb0 = BasicBlock::new(0);
        bb0.push_instruction(Instruction::new(1, "  call void @callee()\n"));
        bb0.add_succ(1);
        caller.add_basic_block(bb0);
        let mut bb1 = BasicBlock::new(1);
        bb1.push_instruction(Instruction::new(2, "  ret void\n"));
        bb1.add_pred(0);
        caller.add_basic_block(bb1);

        // @callee: single block that returns immediately.
        let mut callee = Cfg::new("@callee", 1);
        let mut cbb0 = BasicBlock::new(0);
        cbb0.push_instruction(Instruction::new(10, "  ret void\n"));
        callee.add_basic_block(cbb0);

        let mut program = Program::new();
        program.add_cfg(caller);
        program.add_cfg(callee);
        program
    }

    #[test]
    fn test_g_call_points_at_callee_entry() {
        let program = two_function_program();
        let g_call = compute_g_call(&program);
        assert_eq!(
            g_call.get(&CallSite::new(0, 0)),
            Some(&CallSite::new(1, 0))
        );
    }

    #[test]
    fn test_g_ret_lands_right_after_the_call() {
        let program = two_function_program();
        let g_call = compute_g_call(&program);
        let g_ret = compute_g_ret(&program, &g_call);
        assert_eq!(
            g_ret.get(&CallSite::new(1, 0)),
            Some(&vec![CallSite::new(0, 1)])
        );
    }

    #[test]
    fn test_transpose_g_ret_appends_instead_of_overwriting() {
        let program = two_function_program();
        let g_call = compute_g_call(&program);
        let g_ret = compute_g_ret(&program, &g_call);
        let g_ret_t = transpose_g_ret(&g_ret);

        // landing site (0, 1) is reached from the callee's single ret block.
        let landings = g_ret_t.get(&CallSite::new(0, 1)).unwrap();
        assert_eq!(landings, &vec![CallSite::new(1, 0)]);
    }

    #[test]
    fn test_transpose_g_call_groups_multiple_callers() {
        let mut program = two_function_program();
        // a second caller also calling @callee
        let mut caller2 = Cfg::new("@caller2", 2);
        let mut bb0 = BasicBlock::new(0);
        bb0.push_instruction(Instruction::new(20, "  call void @callee()\n"));
        caller2.add_basic_block(bb0);
        program.add_cfg(caller2);

        let g_call = compute_g_call(&program);
        let g_call_t = transpose_g_call(&g_call);
        let callers = g_call_t.get(&CallSite::new(1, 0)).unwrap();
        assert_eq!(callers.len(), 2);
    }
}
