//! The top-level parsed representation of an LLVM IR file.

use std::collections::{HashMap, HashSet};

use crate::model::cfg::Cfg;

/// All CFGs parsed from one LLVM IR file, plus which function names have a
/// body in this file (as opposed to being merely referenced, e.g. an
/// external declaration or intrinsic).
#[derive(Debug, Default)]
pub struct Program {
    cfgs: Vec<Cfg>,
    defined_functions: HashSet<String>,
    name_index: HashMap<String, usize>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cfg(&mut self, cfg: Cfg) {
        self.name_index.insert(cfg.name().to_string(), self.cfgs.len());
        self.cfgs.push(cfg);
    }

    pub fn cfgs(&self) -> &[Cfg] {
        &self.cfgs
    }

    pub fn cfgs_mut(&mut self) -> &mut [Cfg] {
        &mut self.cfgs
    }

    pub fn cfg(&self, id: usize) -> &Cfg {
        &self.cfgs[id]
    }

    /// Looks up a CFG by its LLVM symbol name (e.g. `@foo`).
    pub fn cfg_by_name(&self, name: &str) -> Option<&Cfg> {
        self.name_index.get(name).map(|&id| &self.cfgs[id])
    }

    pub fn add_defined_function(&mut self, name: impl Into<String>) {
        self.defined_functions.insert(name.into());
    }

    pub fn is_defined_function(&self, name: &str) -> bool {
        self.defined_functions.contains(name)
    }

    pub fn defined_functions(&self) -> &HashSet<String> {
        &self.defined_functions
    }

    /// Logs the full parsed content of every non-empty CFG at `debug`
    /// level: each block's id, instructions, successors and predecessors.
    ///
    /// The direct analog of the original `parse.py::display_result` /
    /// `BasicBlock.display_content`, routed through the logging facade
    /// instead of raw stdout writes.
    pub fn log_debug_dump(&self) {
        for cfg in &self.cfgs {
            if cfg.is_empty() {
                continue;
            }
            log::debug!("Content of {}'s basic blocks", cfg.name());
            for bb in cfg.basic_blocks() {
                log::debug!("  BasicBlock #{} (size = {})", bb.id(), bb.size());
                for instr in bb.instructions() {
                    log::debug!("    {}: {}", instr.line(), instr.text().trim_end());
                }
                log::debug!("    successors: {:?}", bb.succ());
                log::debug!("    predecessors: {:?}", bb.pred());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cfg_by_name_lookup() {
        let mut program = Program::new();
        program.add_cfg(Cfg::new("@foo", 0));
        program.add_cfg(Cfg::new("@bar", 1));

        assert_eq!(program.cfg_by_name("@bar").unwrap().id(), 1);
        assert!(program.cfg_by_name("@missing").is_none());
    }

    #[test]
    fn test_defined_functions() {
        let mut program = Program::new();
        program.add_defined_function("@foo");
        assert!(program.is_defined_function("@foo"));
        assert!(!program.is_defined_function("@bar"));
    }
}
