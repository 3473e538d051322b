//! The output of the distance pass: a line-oriented `<line>:<distance>` map.

use std::fs;
use std::io;
use std::path::Path;

use crate::model::weight::Weight;

/// An append-only sequence of `(source_line, distance)` pairs, in the order
/// they were computed. Entries with infinite weight are silently dropped —
/// they mean "no feasible path to the target was found for this line."
#[derive(Debug, Default)]
pub struct Distances {
    entries: Vec<(usize, u64)>,
}

impl Distances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a distance for `line`, unless `weight` is infinite.
    ///
    /// No deduplication is performed: if the same line is recorded twice
    /// (which can happen if a block is reseeded along two different
    /// propagation chains before `visited` catches up — see spec.md §6),
    /// both records persist, matching the original's append-only
    /// `DistanceContainer`.
    pub fn push(&mut self, line: usize, weight: Weight) {
        if let Some(value) = weight.finite() {
            self.entries.push((line, value));
        }
    }

    pub fn entries(&self) -> &[(usize, u64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The minimum and maximum recorded distance, if any were recorded.
    pub fn min_max(&self) -> Option<(u64, u64)> {
        if self.entries.is_empty() {
            return None;
        }
        let mut min = u64::MAX;
        let mut max = 0;
        for &(_, d) in &self.entries {
            min = min.min(d);
            max = max.max(d);
        }
        Some((min, max))
    }

    /// Writes the container to `path` as `<line>:<distance>\n` lines, in
    /// insertion order, with no header or trailer.
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let mut contents = String::new();
        for &(line, distance) in &self.entries {
            contents.push_str(&line.to_string());
            contents.push(':');
            contents.push_str(&distance.to_string());
            contents.push('\n');
        }
        fs::write(path, contents)
    }
}
