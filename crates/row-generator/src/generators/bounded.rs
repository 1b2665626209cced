//! Bounded integer generators for partition-style columns.

use rand::Rng;
use std::ops::RangeInclusive;

/// Years produced for `int_year` columns.
pub const YEAR_RANGE: RangeInclusive<i32> = 2000..=2049;

/// Months produced for `int_month` columns.
pub const MONTH_RANGE: RangeInclusive<i32> = 1..=12;

pub fn generate_year<R: Rng>(rng: &mut R) -> i32 {
    rng.random_range(YEAR_RANGE)
}

pub fn generate_month<R: Rng>(rng: &mut R) -> i32 {
    rng.random_range(MONTH_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            assert!(YEAR_RANGE.contains(&generate_year(&mut rng)));
            assert!(MONTH_RANGE.contains(&generate_month(&mut rng)));
        }
    }
}
