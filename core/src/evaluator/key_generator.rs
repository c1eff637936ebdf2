use smallvec::{SmallVec, smallvec};

/// Generates stable keys for JSX elements from their structural position.
///
/// One counter per open element; a key is the path of counters from the root,
/// joined with `-`. Re-evaluating the same markup after a [`reset`] yields the
/// same keys.
///
/// [`reset`]: KeyGenerator::reset
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    counters: SmallVec<[usize; 8]>,
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self {
            counters: smallvec![0],
        }
    }

    /// Advances the counter at the current depth and returns the path key.
    pub fn generate(&mut self) -> String {
        if let Some(last) = self.counters.last_mut() {
            *last += 1;
        }
        self.counters
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }

    pub fn opening_element(&mut self) {
        self.counters.push(0);
    }

    /// The root level is never popped, so unbalanced markup cannot underflow.
    pub fn closing_element(&mut self) {
        if self.counters.len() > 1 {
            self.counters.pop();
        }
    }

    pub fn reset(&mut self) {
        self.counters = smallvec![0];
    }

    pub fn depth(&self) -> usize {
        self.counters.len() - 1
    }
}
