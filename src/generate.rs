//! Seeded generation of interval sets and fixed-width query batches.
//!
//! Interval starts are uniform over the coordinate universe and lengths follow an exponential
//! distribution, so most intervals are short with a tail of long ones. All draws come from the
//! caller's rng: the same seed always reproduces the same intervals and queries.
use log::warn;
use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::errors::ConfigError;
use crate::interval::{Interval, Payload, Query};

/// Generate `n` non-degenerate intervals inside `[0, max_coord]`.
///
/// The i-th interval carries `Some(i)` as payload when `labeled` is set, `None` otherwise.
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use ivcompare::generate_intervals;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let ivs = generate_intervals(100, 1_000, 50, true, &mut rng).unwrap();
/// assert_eq!(ivs.len(), 100);
/// assert!(ivs.iter().all(|iv| iv.start < iv.stop && iv.stop <= 1_000));
/// ```
pub fn generate_intervals<R: Rng + ?Sized>(
    n: usize,
    max_coord: u32,
    avg_len: u32,
    labeled: bool,
    rng: &mut R,
) -> Result<Vec<Interval<Payload>>, ConfigError> {
    if max_coord < 2 || max_coord == u32::MAX {
        return Err(ConfigError::CoordinateUniverse(max_coord));
    }
    if avg_len == 0 {
        return Err(ConfigError::ZeroAverageLength);
    }
    let lengths = Exp::new(1.0 / f64::from(avg_len)).map_err(|_| ConfigError::ZeroAverageLength)?;

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let start = rng.gen_range(0..max_coord);
        // `as` saturates, so a huge draw can't wrap around
        let len = (lengths.sample(rng) as u32).max(1);
        let mut stop = max_coord.min(start.saturating_add(len));
        if stop == start {
            stop = max_coord.min(start + 1);
        }
        out.push(Interval {
            start,
            stop,
            val: if labeled { Some(i as u32) } else { None },
        });
    }
    Ok(out)
}

/// Clamp a requested query width into `[1, max_coord - 1]`, warning when it had to move.
pub fn clamp_width(width: u32, max_coord: u32) -> u32 {
    let upper = max_coord.saturating_sub(1).max(1);
    let clamped = width.max(1).min(upper);
    if clamped != width {
        warn!(
            "Query width {} is outside [1, {}] for max_coord {}; using {}",
            width, upper, max_coord, clamped
        );
    }
    clamped
}

/// Generate `count` queries of a single width. Every query satisfies
/// `start < stop <= max_coord`.
///
/// A width of zero or one reaching the end of the universe is clamped (see [`clamp_width`])
/// rather than producing an empty batch.
pub fn generate_queries<R: Rng + ?Sized>(
    count: usize,
    max_coord: u32,
    width: u32,
    rng: &mut R,
) -> Result<Vec<Query>, ConfigError> {
    if max_coord < 2 || max_coord == u32::MAX {
        return Err(ConfigError::CoordinateUniverse(max_coord));
    }
    let width = clamp_width(width, max_coord);
    let start_max = (max_coord - width).max(1);

    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let start = rng.gen_range(0..start_max);
        out.push(Query {
            start,
            stop: max_coord.min(start + width),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_same_seed_same_sequences() {
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let ivs = generate_intervals(500, 1_000_000, 500, true, &mut rng).unwrap();
            let qs = generate_queries(500, 1_000_000, 10, &mut rng).unwrap();
            (ivs, qs)
        };
        let (a_ivs, a_qs) = draw(7);
        let (b_ivs, b_qs) = draw(7);
        assert_eq!(a_ivs, b_ivs);
        assert_eq!(a_qs, b_qs);
        let (c_ivs, _) = draw(8);
        assert_ne!(a_ivs, c_ivs);
    }

    #[test]
    fn test_labels() {
        let mut rng = StdRng::seed_from_u64(1);
        let ivs = generate_intervals(10, 100, 5, true, &mut rng).unwrap();
        assert!(ivs.iter().enumerate().all(|(i, iv)| iv.val == Some(i as u32)));
        let ivs = generate_intervals(10, 100, 5, false, &mut rng).unwrap();
        assert!(ivs.iter().all(|iv| iv.val.is_none()));
    }

    #[test]
    fn test_tiny_universe_stays_non_degenerate() {
        let mut rng = StdRng::seed_from_u64(3);
        let ivs = generate_intervals(1_000, 2, 1_000, false, &mut rng).unwrap();
        assert!(ivs.iter().all(|iv| iv.start < iv.stop && iv.stop <= 2));
    }

    #[test]
    fn test_fixed_width() {
        let mut rng = StdRng::seed_from_u64(123);
        let qs = generate_queries(1_000, 1_000_000, 1_000, &mut rng).unwrap();
        assert!(qs.iter().all(|q| q.width() == 1_000));
    }

    #[test]
    fn test_oversized_width_is_clamped() {
        let mut rng = StdRng::seed_from_u64(123);
        let qs = generate_queries(100, 1_000, 5_000, &mut rng).unwrap();
        assert_eq!(qs.len(), 100);
        assert!(qs.iter().all(|q| q.start < q.stop && q.stop <= 1_000));
        assert!(qs.iter().all(|q| q.width() == 999));
        assert_eq!(clamp_width(0, 1_000), 1);
        assert_eq!(clamp_width(1_000, 1_000), 999);
        assert_eq!(clamp_width(10, 1_000), 10);
    }

    #[test]
    fn test_invalid_universe() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_intervals(1, 1, 5, false, &mut rng).is_err());
        assert!(generate_queries(1, 0, 5, &mut rng).is_err());
        assert!(generate_intervals(1, 100, 0, false, &mut rng).is_err());
    }

    quickcheck! {
        fn prop_intervals_non_degenerate(seed: u64, n: u8, max_coord: u32, avg_len: u16) -> bool {
            let max_coord = max_coord.max(2).min(u32::MAX - 1);
            let avg_len = u32::from(avg_len).max(1);
            let mut rng = StdRng::seed_from_u64(seed);
            generate_intervals(n as usize, max_coord, avg_len, false, &mut rng)
                .unwrap()
                .iter()
                .all(|iv| iv.start < iv.stop && iv.stop <= max_coord)
        }

        fn prop_queries_in_bounds(seed: u64, n: u8, max_coord: u32, width: u32) -> bool {
            let max_coord = max_coord.max(2).min(u32::MAX - 1);
            let mut rng = StdRng::seed_from_u64(seed);
            generate_queries(n as usize, max_coord, width, &mut rng)
                .unwrap()
                .iter()
                .all(|q| q.start < q.stop && q.stop <= max_coord)
        }
    }
}
