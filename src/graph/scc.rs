//! Tarjan's strongly connected components algorithm, used to order
//! function summary computation so that every callee's summary is
//! available before its caller's is computed (except within a mutually
//! recursive component, which is instead iterated to a fixed point).
//!
//! Implemented iteratively: a CFG built from tens of thousands of
//! functions can exceed the recursion depth a direct port of the textbook
//! algorithm would need.

use crate::model::Program;

/// The call-dependency graph between functions: an adjacency list over CFG
/// ids, with an edge `u -> v` whenever some basic block in CFG `u` ends
/// with a call to the function CFG `v` implements.
pub struct DependencyGraph {
    adjacency: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub fn new(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
        }
    }

    pub fn add_edge(&mut self, u: usize, v: usize) {
        self.adjacency[u].push(v);
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Builds the dependency graph by scanning every CFG's blocks for a
    /// trailing call to another CFG defined in the same program.
    pub fn from_program(program: &Program) -> Self {
        let mut graph = Self::new(program.cfgs().len());
        for cfg in program.cfgs() {
            for bb in cfg.basic_blocks() {
                let Some(last) = bb.last_instruction() else {
                    continue;
                };
                if !crate::parser::regex_rules::is_call(last.text()) {
                    continue;
                }
                let called = crate::parser::regex_rules::extract_called_function(last.text());
                if let Some(target) = program.cfg_by_name(&called) {
                    graph.add_edge(cfg.id(), target.id());
                }
            }
        }
        graph
    }

    /// Runs Tarjan's algorithm, returning strongly connected components in
    /// the order their DFS subtree closes — which, for this dependency
    /// graph, is exactly the order in which a callee's component is fully
    /// known before its caller's.
    pub fn sccs(&self) -> Vec<Vec<usize>> {
        let n = self.adjacency.len();
        let mut disc: Vec<Option<usize>> = vec![None; n];
        let mut low: Vec<usize> = vec![0; n];
        let mut on_stack: Vec<bool> = vec![false; n];
        let mut tarjan_stack: Vec<usize> = Vec::new();
        let mut sccs: Vec<Vec<usize>> = Vec::new();
        let mut counter = 0usize;

        struct Frame {
            node: usize,
            next_child: usize,
        }

        for start in 0..n {
            if disc[start].is_some() {
                continue;
            }

            disc[start] = Some(counter);
            low[start] = counter;
            counter += 1;
            on_stack[start] = true;
            tarjan_stack.push(start);
            let mut call_stack = vec![Frame {
                node: start,
                next_child: 0,
            }];

            while let Some(frame) = call_stack.last_mut() {
                let u = frame.node;
                if frame.next_child < self.adjacency[u].len() {
                    let v = self.adjacency[u][frame.next_child];
                    frame.next_child += 1;

                    if disc[v].is_none() {
                        disc[v] = Some(counter);
                        low[v] = counter;
                        counter += 1;
                        on_stack[v] = true;
                        tarjan_stack.push(v);
                        call_stack.push(Frame {
                            node: v,
                            next_child: 0,
                        });
                    } else if on_stack[v] {
                        low[u] = low[u].min(disc[v].unwrap());
                    }
                } else {
                    call_stack.pop();
                    if let Some(parent) = call_stack.last_mut() {
                        low[parent.node] = low[parent.node].min(low[u]);
                    }

                    if low[u] == disc[u].unwrap() {
                        let mut component = Vec::new();
                        loop {
                            let w = tarjan_stack.pop().expect("tarjan stack underflow");
                            on_stack[w] = false;
                            component.push(w);
                            if w == u {
                                break;
                            }
                        }
                        sccs.push(component);
                    }
                }
            }
        }

        sccs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_chain_has_one_node_per_component() {
        // 0 -> 1 -> 2
        let mut g = DependencyGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        let sccs = g.sccs();
        assert_eq!(sccs.len(), 3);
        assert!(sccs.iter().all(|c| c.len() == 1));
        // 2 (the callee with no outgoing edges) must close before 0.
        let pos = |n: usize| sccs.iter().position(|c| c.contains(&n)).unwrap();
        assert!(pos(2) < pos(0));
    }

    #[test]
    fn test_mutual_recursion_forms_one_component() {
        // 0 <-> 1, and 0 -> 2
        let mut g = DependencyGraph::new(3);
        g.add_edge(0, 1);
        g.add_edge(1, 0);
        g.add_edge(0, 2);
        let sccs = g.sccs();
        let mutual = sccs.iter().find(|c| c.len() == 2).unwrap();
        assert!(mutual.contains(&0) && mutual.contains(&1));
    }

    #[test]
    fn test_self_loop_is_its_own_component() {
        let mut g = DependencyGraph::new(1);
        g.add_edge(0, 0);
        let sccs = g.sccs();
        assert_eq!(sccs, vec![vec![0]]);
    }
}
