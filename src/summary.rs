//! Function summaries: for each function, the minimum number of executed
//! instructions on any path from its entry block to an exit.
//!
//! A summary is itself an input to computing other summaries, since a
//! function's cost includes the summary of anything it calls. Mutually
//! recursive functions are grounded in the same strongly connected
//! component and are iterated to a fixed point; everything else is
//! resolved once, in the dependency order Tarjan's algorithm produces.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::DependencyGraph;
use crate::model::{BasicBlock, Program, Weight};
use crate::parser::regex_rules;

/// Computes a [`Weight`] summary for every function in `program`.
pub fn summarize_functions(program: &Program) -> HashMap<String, Weight> {
    let mut summaries = HashMap::new();
    let dep_graph = DependencyGraph::from_program(program);
    let sccs = dep_graph.sccs();
    log::debug!("{} strongly connected components", sccs.len());

    for scc in &sccs {
        if scc.len() == 1 {
            summarize(program, scc[0], &mut summaries);
        } else {
            log::debug!("fixed-point iteration over mutually recursive SCC {scc:?}");
            loop {
                let before = snapshot(program, scc, &summaries);
                for &cfg_id in scc {
                    summarize(program, cfg_id, &mut summaries);
                }
                let after = snapshot(program, scc, &summaries);
                if before == after {
                    break;
                }
            }
        }
    }

    summaries
}

fn snapshot(program: &Program, scc: &[usize], summaries: &HashMap<String, Weight>) -> Vec<Option<Weight>> {
    scc.iter()
        .map(|&id| summaries.get(program.cfg(id).name()).copied())
        .collect()
}

/// Dijkstra's algorithm over one function's basic blocks: the priority of a
/// block is the number of instructions executed to reach it, including the
/// summaries of any functions called along the way.
fn summarize(program: &Program, cfg_id: usize, summaries: &mut HashMap<String, Weight>) {
    let cfg = program.cfg(cfg_id);
    let mut visited = vec![false; cfg.len()];
    let mut heap: BinaryHeap<Reverse<(Weight, usize)>> = BinaryHeap::new();

    let entry = cfg.basic_block(0);
    let start = Weight::Finite(entry.size() as u64) + call_cost(entry, program, summaries);
    heap.push(Reverse((start, 0)));
    visited[0] = true;

    while let Some(Reverse((dist, id))) = heap.pop() {
        let bb = cfg.basic_block(id);
        if is_end_of_cfg(bb) {
            summaries.insert(cfg.name().to_string(), dist);
            return;
        }

        for &succ in bb.succ() {
            if visited[succ] {
                continue;
            }
            let next_bb = cfg.basic_block(succ);
            let cost = call_cost(next_bb, program, summaries);
            let value = dist + Weight::Finite(next_bb.size() as u64) + cost;
            heap.push(Reverse((value, succ)));
            visited[succ] = true;
        }
    }

    // every reachable block was visited and none of them was an exit.
    summaries.insert(cfg.name().to_string(), Weight::Infinite);
}

/// A block (and, transitively, its function) is an exit point once it
/// returns, or once it has no successor at all (a dead end, e.g. an
/// unsupported terminator).
fn is_end_of_cfg(bb: &BasicBlock) -> bool {
    let ends_in_ret = bb
        .last_instruction()
        .is_some_and(|instr| regex_rules::is_ret(instr.text()));
    ends_in_ret || bb.succ().is_empty()
}

/// The cost of whatever call, if any, ends `bb`: the callee's summary if
/// known, zero if the callee isn't a function defined in this file (an
/// external declaration or intrinsic), or infinite if it is defined but its
/// summary isn't available yet.
fn call_cost(bb: &BasicBlock, program: &Program, summaries: &HashMap<String, Weight>) -> Weight {
    let Some(last) = bb.last_instruction() else {
        return Weight::ZERO;
    };
    if !regex_rules::is_call(last.text()) {
        return Weight::ZERO;
    }

    let called = regex_rules::extract_called_function(last.text());
    if let Some(&summary) = summaries.get(&called) {
        summary
    } else if !program.is_defined_function(&called) {
        Weight::ZERO
    } else {
        Weight::Infinite
    }
}
