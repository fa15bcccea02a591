use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::DataError;

/// Row positions assigned to each side of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of test rows for `n` rows: `ceil(fraction * n)`.
fn test_size(n: usize, fraction: f64) -> Result<usize, DataError> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(DataError::BadTestFraction(fraction));
    }
    let n_test = (fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(DataError::DegenerateSplit { n, fraction });
    }
    Ok(n_test)
}

/// Shuffle `0..n` with a seeded RNG; the first `ceil(fraction * n)` rows go
/// to the test side, the rest to training.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<Split, DataError> {
    let n_test = test_size(n, test_fraction)?;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(Split {
        train,
        test: indices,
    })
}

/// Split each class separately so both sides keep the class proportions.
///
/// The test side gets `ceil(fraction * n)` rows overall; each class
/// contributes its rounded share, with leftover rows assigned to the
/// classes with the largest remainders.
pub fn stratified_split(labels: &[u8], test_fraction: f64, seed: u64) -> Result<Split, DataError> {
    let n = labels.len();
    let n_test = test_size(n, test_fraction)?;

    let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    // Largest-remainder apportionment of the test rows.
    let mut quotas: Vec<(u8, usize, f64)> = by_class
        .iter()
        .map(|(&class, rows)| {
            let exact = n_test as f64 * rows.len() as f64 / n as f64;
            (class, exact.floor() as usize, exact - exact.floor())
        })
        .collect();
    let assigned: usize = quotas.iter().map(|q| q.1).sum();
    let mut order: Vec<usize> = (0..quotas.len()).collect();
    order.sort_by(|&a, &b| quotas[b].2.total_cmp(&quotas[a].2).then(a.cmp(&b)));
    for &k in order.iter().take(n_test.saturating_sub(assigned)) {
        quotas[k].1 += 1;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (class, quota, _) in quotas {
        let mut rows = by_class.remove(&class).unwrap_or_default();
        rows.shuffle(&mut rng);
        let rest = rows.split_off(quota.min(rows.len()));
        test.extend(rows);
        train.extend(rest);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok(Split { train, test })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn assert_partition(split: &Split, n: usize) {
        let all: BTreeSet<usize> = split.train.iter().chain(&split.test).copied().collect();
        assert_eq!(all.len(), n);
        assert_eq!(split.train.len() + split.test.len(), n);
        assert_eq!(all.into_iter().collect::<Vec<_>>(), (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_a_partition_with_ceil_test_size() {
        let split = train_test_split(8132, 0.3, 0).unwrap();
        assert_partition(&split, 8132);
        assert_eq!(split.test.len(), 2440);
        assert_eq!(split.train.len(), 5692);
    }

    #[test]
    fn split_is_deterministic_per_seed() {
        let a = train_test_split(100, 0.3, 0).unwrap();
        let b = train_test_split(100, 0.3, 0).unwrap();
        let c = train_test_split(100, 0.3, 1).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn bad_fractions_are_rejected() {
        assert!(matches!(train_test_split(10, 0.0, 0), Err(DataError::BadTestFraction(_))));
        assert!(matches!(train_test_split(10, 1.0, 0), Err(DataError::BadTestFraction(_))));
        assert!(matches!(train_test_split(1, 0.3, 0), Err(DataError::DegenerateSplit { .. })));
        assert!(matches!(train_test_split(0, 0.3, 0), Err(DataError::DegenerateSplit { .. })));
    }

    #[test]
    fn stratified_split_keeps_class_proportions() {
        let labels: Vec<u8> = (0..100).map(|i| u8::from(i < 20)).collect();
        let split = stratified_split(&labels, 0.5, 0).unwrap();
        assert_partition(&split, 100);

        let test_pos = split.test.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(split.test.len(), 50);
        assert_eq!(test_pos, 10);
    }
}
