use std::fmt;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ingestlink_domain::HostKey;

/// Source of uniform indices in `0..upper`
pub trait RandomSource: Send {
    /// `upper` is always at least 2 when called by [`HostSelector`]
    fn next_index(&mut self, upper: usize) -> usize;
}

impl RandomSource for StdRng {
    fn next_index(&mut self, upper: usize) -> usize {
        self.gen_range(0..upper)
    }
}

/// Picks one host out of a live-host snapshot
pub struct HostSelector {
    random: Mutex<Box<dyn RandomSource>>,
}

impl HostSelector {
    pub fn new(random: Box<dyn RandomSource>) -> Self {
        Self { random: Mutex::new(random) }
    }

    /// Reproducible selector
    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(StdRng::seed_from_u64(seed)))
    }

    /// `None` for an empty list, the only element of a singleton, otherwise
    /// a uniformly random element. The input is never modified.
    pub fn pick(&self, live: &[HostKey]) -> Option<HostKey> {
        match live {
            [] => None,
            [only] => Some(only.clone()),
            _ => {
                let index = self.random.lock().next_index(live.len()) % live.len();
                Some(live[index].clone())
            }
        }
    }
}

impl Default for HostSelector {
    fn default() -> Self {
        Self::new(Box::new(StdRng::from_entropy()))
    }
}

impl fmt::Debug for HostSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSelector").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::testing::FixedIndexSource;

    fn keys(hosts: &[&str]) -> Vec<HostKey> {
        hosts.iter().map(|h| HostKey::parse(h).unwrap()).collect()
    }

    #[test]
    fn test_empty_and_singleton() {
        let selector = HostSelector::seeded(7);
        assert_eq!(selector.pick(&[]), None);

        let one = keys(&["a:1"]);
        for _ in 0..10 {
            assert_eq!(selector.pick(&one), Some(one[0].clone()));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let live = keys(&["a:1", "b:1", "c:1", "d:1"]);
        let first = HostSelector::seeded(42);
        let second = HostSelector::seeded(42);

        let run_a: Vec<_> = (0..20).map(|_| first.pick(&live)).collect();
        let run_b: Vec<_> = (0..20).map(|_| second.pick(&live)).collect();
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn test_distribution_is_roughly_uniform() {
        let live = keys(&["a:1", "b:1", "c:1"]);
        let selector = HostSelector::seeded(1234);
        let mut counts: HashMap<HostKey, usize> = HashMap::new();

        for _ in 0..3000 {
            let host = selector.pick(&live).unwrap();
            *counts.entry(host).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        for count in counts.values() {
            assert!((850..=1150).contains(count), "skewed count {count}");
        }
    }

    #[test]
    fn test_input_is_not_mutated() {
        let live = keys(&["a:1", "b:1"]);
        let before = live.clone();
        let selector = HostSelector::new(Box::new(FixedIndexSource::new(vec![1])));

        assert_eq!(selector.pick(&live), Some(before[1].clone()));
        assert_eq!(live, before);
    }

    /// Ignores the bound it is given
    struct Unbounded(usize);

    impl RandomSource for Unbounded {
        fn next_index(&mut self, _upper: usize) -> usize {
            self.0
        }
    }

    #[test]
    fn test_out_of_range_index_still_picks_a_live_host() {
        let live = keys(&["a:1", "b:1", "c:1"]);
        let selector = HostSelector::new(Box::new(Unbounded(7)));

        assert_eq!(selector.pick(&live), Some(live[1].clone()));
    }
}
