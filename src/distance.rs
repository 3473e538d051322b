//! Interprocedural distance-to-target: for every instruction reachable
//! from the target, the minimum number of instructions a concrete
//! execution would still need to run before reaching it.
//!
//! This is Dijkstra's algorithm run *backward*, on the transposed
//! intraprocedural predecessor edges plus the transposed `G_call`/`G_ret`
//! edges computed in [`crate::graph::call_graph`]. A one-bit
//! `has_taken_ret` flag on each heap entry blocks taking a `call` edge
//! once a `ret` edge has already been taken in the same path — without it,
//! the search would "escape" into an unrelated caller's call sites and
//! wildly overcount reachability (see the module-level discussion this
//! guards against in the project's design notes).

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::call_graph::{self, CallSite};
use crate::model::{BasicBlock, Distances, Program, Weight};
use crate::parser::regex_rules;

/// A point in the backward search: a specific block in a specific
/// function, plus whether a `ret` edge has already been taken to get
/// there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SearchState {
    cfg_id: usize,
    block_id: usize,
    has_taken_ret: bool,
}

/// Heap entries order by distance first, then by `(cfg_id, block_id,
/// has_taken_ret)` so that traversal order — and hence which of several
/// equal-distance paths assigns a line's distance first — is
/// deterministic across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapEntry {
    distance: Weight,
    state: SearchState,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.state.cfg_id.cmp(&other.state.cfg_id))
            .then_with(|| self.state.block_id.cmp(&other.state.block_id))
            .then_with(|| self.state.has_taken_ret.cmp(&other.state.has_taken_ret))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds the first call to `@klee_reach()`, returning the owning CFG id
/// and block id.
pub fn find_target(program: &Program) -> Option<(usize, usize)> {
    for cfg in program.cfgs() {
        for bb in cfg.basic_blocks() {
            if bb
                .last_instruction()
                .is_some_and(|instr| regex_rules::is_klee_reach(instr.text()))
            {
                return Some((cfg.id(), bb.id()));
            }
        }
    }
    None
}

/// Computes the distance-to-target for every reachable instruction.
///
/// Returns an empty [`Distances`] (with a logged warning, not an error) if
/// `program` contains no call to `@klee_reach()` — this is an expected,
/// non-fatal outcome, not malformed input.
pub fn compute_distances(program: &Program, summaries: &HashMap<String, Weight>) -> Distances {
    let mut dist = Distances::new();

    let Some((target_cfg_id, target_block_id)) = find_target(program) else {
        crate::diagnostics::print_warning("no target found (no call to @klee_reach())");
        return dist;
    };

    let g_call = call_graph::compute_g_call(program);
    let g_ret = call_graph::compute_g_ret(program, &g_call);
    let g_call_t = call_graph::transpose_g_call(&g_call);
    let g_ret_t = call_graph::transpose_g_ret(&g_ret);

    let mut visited: Vec<Vec<bool>> = program
        .cfgs()
        .iter()
        .map(|cfg| vec![false; cfg.len()])
        .collect();

    let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::new();

    let target_bb = program.cfg(target_cfg_id).basic_block(target_block_id);
    heap.push(Reverse(HeapEntry {
        distance: Weight::Finite(target_bb.size() as u64),
        state: SearchState {
            cfg_id: target_cfg_id,
            block_id: target_block_id,
            has_taken_ret: false,
        },
    }));
    visited[target_cfg_id][target_block_id] = true;

    log::debug!("starting distance computation from @klee_reach()");

    while let Some(Reverse(entry)) = heap.pop() {
        log::debug!("-> {entry:?}");

        let cfg = program.cfg(entry.state.cfg_id);
        let bb = cfg.basic_block(entry.state.block_id);

        assign_instruction_distances(&mut dist, bb, entry.distance);

        let current_dist = entry.distance;
        let has_taken_ret = entry.state.has_taken_ret;

        for &pred_id in bb.pred() {
            if visited[entry.state.cfg_id][pred_id] {
                continue;
            }
            let pred_bb = cfg.basic_block(pred_id);
            let call_summary = add_summary(pred_bb, summaries);
            let value = current_dist + Weight::Finite(pred_bb.size() as u64) + call_summary;

            heap.push(Reverse(HeapEntry {
                distance: value,
                state: SearchState {
                    cfg_id: entry.state.cfg_id,
                    block_id: pred_id,
                    has_taken_ret,
                },
            }));
            visited[entry.state.cfg_id][pred_id] = true;
        }

        // a ret edge having been taken forecloses further call edges: see
        // the module doc comment.
        take_call_path(
            program,
            &g_ret_t,
            entry.state,
            current_dist,
            true,
            &mut visited,
            &mut heap,
        );
        if !has_taken_ret {
            take_call_path(
                program,
                &g_call_t,
                entry.state,
                current_dist,
                false,
                &mut visited,
                &mut heap,
            );
        }
    }

    if let Some((min, max)) = dist.min_max() {
        log::info!(
            "computed {} distance entries (min {min}, max {max})",
            dist.len()
        );
    }

    dist
}

/// Assigns a distance to every executable instruction in `bb`, counting
/// down from `bb_distance` (the distance assigned to the block as a
/// whole, i.e. the cost of reaching its last instruction).
fn assign_instruction_distances(dist: &mut Distances, bb: &BasicBlock, bb_distance: Weight) {
    let Some(mut value) = bb_distance.finite() else {
        return;
    };
    for instr in bb.instructions() {
        if regex_rules::is_label_definition(instr.text()) || regex_rules::is_define(instr.text()) {
            continue;
        }
        value = value.saturating_sub(1);
        dist.push(instr.line(), Weight::Finite(value));
    }
}

/// The summary of whatever function `bb` calls, if any — folded into the
/// distance of a predecessor the same way it is folded into a function
/// summary (see [`crate::summary::call_cost`]).
fn add_summary(bb: &BasicBlock, summaries: &HashMap<String, Weight>) -> Weight {
    let Some(last) = bb.last_instruction() else {
        return Weight::ZERO;
    };
    if !regex_rules::is_call(last.text()) {
        return Weight::ZERO;
    }
    let called = regex_rules::extract_called_function(last.text());
    summaries.get(&called).copied().unwrap_or(Weight::ZERO)
}

/// Follows every edge out of `state` in `graph` (`G_ret^T` or
/// `G_call^T`), pushing a heap entry for each unvisited destination.
fn take_call_path(
    program: &Program,
    graph: &HashMap<CallSite, Vec<CallSite>>,
    state: SearchState,
    current_dist: Weight,
    taking_ret: bool,
    visited: &mut [Vec<bool>],
    heap: &mut BinaryHeap<Reverse<HeapEntry>>,
) {
    let Some(destinations) = graph.get(&CallSite::new(state.cfg_id, state.block_id)) else {
        return;
    };

    let new_has_taken_ret = state.has_taken_ret || taking_ret;

    for dest in destinations {
        if visited[dest.cfg_id][dest.block_id] {
            continue;
        }
        let dest_bb = program.cfg(dest.cfg_id).basic_block(dest.block_id);
        let value = current_dist + Weight::Finite(dest_bb.size() as u64);

        heap.push(Reverse(HeapEntry {
            distance: value,
            state: SearchState {
                cfg_id: dest.cfg_id,
                block_id: dest.block_id,
                has_taken_ret: new_has_taken_ret,
            },
        }));
        visited[dest.cfg_id][dest.block_id] = true;
    }
}
