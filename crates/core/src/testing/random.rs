use crate::routing::RandomSource;

/// Replays a fixed sequence of indices, cycling when exhausted.
///
/// Each index is reduced modulo the requested bound.
#[derive(Debug, Clone)]
pub struct FixedIndexSource {
    indices: Vec<usize>,
    position: usize,
}

impl FixedIndexSource {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices, position: 0 }
    }
}

impl RandomSource for FixedIndexSource {
    fn next_index(&mut self, upper: usize) -> usize {
        if self.indices.is_empty() || upper == 0 {
            return 0;
        }
        let index = self.indices[self.position % self.indices.len()];
        self.position += 1;
        index % upper
    }
}
