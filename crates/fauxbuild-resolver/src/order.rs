use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// How a batch of equally-eligible items is ordered before it is handed out.
///
/// Real builds pick among ready units in an unspecified order; shuffling
/// keeps callers from depending on declaration order. A seed makes the
/// order reproducible.
#[derive(Debug, Clone)]
pub enum BatchOrder {
    /// Leave items in the order they were produced.
    Declared,
    /// Shuffle every batch with the given generator.
    Shuffled(StdRng),
}

impl BatchOrder {
    /// Shuffled order, seeded from `seed` or from entropy when absent.
    pub fn shuffled(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        BatchOrder::Shuffled(rng)
    }

    /// Reorder `items` in place.
    pub fn arrange<T>(&mut self, items: &mut [T]) {
        if let BatchOrder::Shuffled(rng) = self {
            items.shuffle(rng);
        }
    }

    /// An independent order derived from this one.
    ///
    /// Forks of a seeded order are themselves deterministic.
    pub fn fork(&mut self) -> Self {
        match self {
            BatchOrder::Declared => BatchOrder::Declared,
            BatchOrder::Shuffled(rng) => BatchOrder::Shuffled(StdRng::seed_from_u64(rng.gen())),
        }
    }
}

impl Default for BatchOrder {
    fn default() -> Self {
        BatchOrder::shuffled(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_keeps_order() {
        let mut items = vec![1, 2, 3, 4, 5];
        BatchOrder::Declared.arrange(&mut items);
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let mut first: Vec<u32> = (0..64).collect();
        let mut second = first.clone();
        BatchOrder::shuffled(Some(7)).arrange(&mut first);
        BatchOrder::shuffled(Some(7)).arrange(&mut second);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn forks_of_seeded_orders_agree() {
        let mut a = BatchOrder::shuffled(Some(11)).fork();
        let mut b = BatchOrder::shuffled(Some(11)).fork();
        let mut xs: Vec<u32> = (0..32).collect();
        let mut ys = xs.clone();
        a.arrange(&mut xs);
        b.arrange(&mut ys);
        assert_eq!(xs, ys);
    }
}
