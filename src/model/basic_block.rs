//! A straight-line sequence of instructions within a single function.

use crate::model::instruction::Instruction;

/// A basic block: an ordered sequence of [`Instruction`]s ending in a
/// terminator or a call to a defined function.
///
/// Blocks are identified by a dense integer id, unique within their owning
/// CFG and assigned in parse order starting at 0. Successor/predecessor
/// edges are stored as lists of sibling block ids rather than owning
/// handles, so that cyclic control flow (loops) is representable without
/// reference cycles.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    id: usize,
    instructions: Vec<Instruction>,
    succ: Vec<usize>,
    pred: Vec<usize>,
    /// Number of instructions present for debugging (label definitions,
    /// the `define` header) that are not executed by the symbolic executor.
    ignored: usize,
}

impl BasicBlock {
    /// Creates a new, empty basic block with the given id.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            instructions: Vec::new(),
            succ: Vec::new(),
            pred: Vec::new(),
            ignored: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Appends an instruction to the block, for debugging purposes even if
    /// it is subsequently marked ignored via [`BasicBlock::mark_ignored`].
    pub fn push_instruction(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The last instruction in the block, if any.
    pub fn last_instruction(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    /// Marks the most recently added instruction as not executed by KLEE
    /// (a label definition or a `define` header).
    pub fn mark_ignored(&mut self) {
        self.ignored += 1;
    }

    pub fn add_succ(&mut self, id: usize) {
        self.succ.push(id);
    }

    pub fn succ(&self) -> &[usize] {
        &self.succ
    }

    /// Clears all successors (used when the block ends a function: the
    /// textual-successor edge added speculatively during parsing must be
    /// removed once we know the block is actually the last in the CFG).
    pub fn reset_succ(&mut self) {
        self.succ.clear();
    }

    pub fn add_pred(&mut self, id: usize) {
        self.pred.push(id);
    }

    pub fn pred(&self) -> &[usize] {
        &self.pred
    }

    /// Number of instructions physically present in the block, including
    /// ignored ones.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of instructions executed by KLEE: `len() - ignored`.
    pub fn size(&self) -> usize {
        debug_assert!(self.ignored <= self.instructions.len());
        self.instructions.len() - self.ignored
    }
}
