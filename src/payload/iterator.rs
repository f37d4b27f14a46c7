use crate::payload::injector::{Combination, Modifier};

/// Lazy cross-product of probe URL x modifier x payload, in that nesting
/// order.
pub struct Combinations<'a> {
    probes: &'a [String],
    payloads: &'a [String],
    index: usize,
}

impl<'a> Combinations<'a> {
    pub fn new(probes: &'a [String], payloads: &'a [String]) -> Self {
        Self {
            probes,
            payloads,
            index: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.probes.len() * Modifier::ALL.len() * self.payloads.len()
    }
}

impl Iterator for Combinations<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.total() {
            return None;
        }

        let per_probe = Modifier::ALL.len() * self.payloads.len();
        let probe = &self.probes[self.index / per_probe];
        let rest = self.index % per_probe;
        let modifier = Modifier::ALL[rest / self.payloads.len()];
        let payload = &self.payloads[rest % self.payloads.len()];

        self.index += 1;
        Some(Combination::new(probe, modifier, payload))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total().saturating_sub(self.index);
        (left, Some(left))
    }
}
