//! Batch of filtered file names

/// Ordered slice of file names processed together
///
/// Lives for one scheduling cycle only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based position in the run
    pub index: usize,
    /// File names relative to the source directory
    pub files: Vec<String>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
