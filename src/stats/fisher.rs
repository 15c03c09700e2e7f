//! Fisher's exact test on a 2×2 contingency table
//!
//! The test is evaluated through the hypergeometric distribution from
//! `statrs`. For a table
//!
//! ```text
//!              Term  NotTerm
//!              ----  -------
//! sample       [a,      b]
//! rest of bg   [c,      d]
//! ```
//!
//! the number of term-carrying subjects drawn into the sample follows
//! `Hypergeometric(a + b + c + d, a + c, a + b)`, and the p-value is the
//! tail mass of that distribution at the observed `a`.
use statrs::distribution::{Discrete, DiscreteCDF, Hypergeometric};

use crate::stats::TestDirection;
use crate::{AssocError, AssocResult};

/// Relative tolerance when collecting tables for the two-sided tail.
/// Mainstream exact-test implementations use the same rule, so two-sided
/// p-values are comparable to theirs.
const TWO_SIDED_REL_TOLERANCE: f64 = 1e-7;

/// Computes the Fisher exact test p-value for the table `[a, b, c, d]`
///
/// `a` counts sample subjects carrying the term, `b` sample subjects
/// without it, `c` and `d` the same split for the rest of the background.
///
/// # Errors
///
/// Fails with [`AssocError::InvalidArgument`] if all cells are zero.
///
/// # Examples
///
/// ```
/// use assoc::stats::fisher::fisher_exact;
/// use assoc::TestDirection;
///
/// let p = fisher_exact([8, 2, 1, 5], TestDirection::TwoSided).unwrap();
/// assert!((p - 0.034965034965034975).abs() < 1e-9);
/// ```
pub fn fisher_exact(table: [u64; 4], direction: TestDirection) -> AssocResult<f64> {
    let [a, b, c, d] = table;
    let population = a + b + c + d;
    if population == 0 {
        return Err(AssocError::InvalidArgument(
            "contingency table must not be all zero".to_string(),
        ));
    }
    let successes = a + c;
    let draws = a + b;
    let hyper = Hypergeometric::new(population, successes, draws)
        .map_err(|err| AssocError::InvalidArgument(err.to_string()))?;

    let pvalue = match direction {
        TestDirection::Greater => {
            if a == 0 {
                // the upper tail at zero always covers the whole distribution
                1.0
            } else {
                // subtracting 1, because we want to test including a,
                // e.g. "7 or more", but sf by default calculates "more than 7"
                hyper.sf(a - 1)
            }
        }
        TestDirection::Less => hyper.cdf(a),
        TestDirection::TwoSided => {
            let observed = hyper.pmf(a);
            let cutoff = observed * (1.0 + TWO_SIDED_REL_TOLERANCE);
            let lowest = draws.saturating_sub(population - successes);
            let highest = draws.min(successes);
            (lowest..=highest)
                .map(|k| hyper.pmf(k))
                .filter(|p| *p <= cutoff)
                .sum()
        }
    };
    // tail sums can drift marginally outside [0, 1]
    Ok(pvalue.clamp(0.0, 1.0))
}

#[cfg(test)]
mod test {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    // Reference values computed with the hypergeometric distribution by
    // hand and cross-checked against a standard exact-test implementation.

    #[test]
    fn tea_tasting_table() {
        // the classic [3, 1, 1, 3] experiment, X ~ Hyp(8, 4, 4)
        let greater = fisher_exact([3, 1, 1, 3], TestDirection::Greater).unwrap();
        assert!((greater - 17.0 / 70.0).abs() < TOLERANCE);

        let less = fisher_exact([3, 1, 1, 3], TestDirection::Less).unwrap();
        assert!((less - 69.0 / 70.0).abs() < TOLERANCE);

        let two_sided = fisher_exact([3, 1, 1, 3], TestDirection::TwoSided).unwrap();
        assert!((two_sided - 34.0 / 70.0).abs() < TOLERANCE);
    }

    #[test]
    fn asymmetric_table() {
        // [8, 2, 1, 5]: X ~ Hyp(16, 9, 10), observed a = 8
        let greater = fisher_exact([8, 2, 1, 5], TestDirection::Greater).unwrap();
        assert!((greater - 196.0 / 8008.0).abs() < TOLERANCE);

        let less = fisher_exact([8, 2, 1, 5], TestDirection::Less).unwrap();
        assert!((less - 8001.0 / 8008.0).abs() < TOLERANCE);

        let two_sided = fisher_exact([8, 2, 1, 5], TestDirection::TwoSided).unwrap();
        assert!((two_sided - 280.0 / 8008.0).abs() < TOLERANCE);
    }

    #[test]
    fn chain_scenario_table() {
        // a=2, b=0, c=0, d=1: X ~ Hyp(3, 2, 2), P(X >= 2) = 1/3
        let p = fisher_exact([2, 0, 0, 1], TestDirection::Greater).unwrap();
        assert!((p - 1.0 / 3.0).abs() < TOLERANCE);

        // the two-sided tail at a=2 also collects only pmf(2)
        let p = fisher_exact([2, 0, 0, 1], TestDirection::TwoSided).unwrap();
        assert!((p - 1.0 / 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn zero_observed_greater_is_one() {
        let p = fisher_exact([0, 4, 3, 9], TestDirection::Greater).unwrap();
        assert!((p - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn saturated_tables_yield_one() {
        // every draw is a success, both tails cover everything
        for direction in [TestDirection::Greater, TestDirection::Less] {
            let p = fisher_exact([2, 0, 1, 0], direction).unwrap();
            assert!((p - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn all_zero_table_is_rejected() {
        let err = fisher_exact([0, 0, 0, 0], TestDirection::Greater).unwrap_err();
        assert!(matches!(err, AssocError::InvalidArgument(_)));
    }

    #[test]
    fn pvalues_stay_in_unit_interval() {
        for direction in [
            TestDirection::Greater,
            TestDirection::Less,
            TestDirection::TwoSided,
        ] {
            for table in [[1, 2, 3, 4], [10, 0, 0, 10], [5, 5, 5, 5], [1, 0, 0, 0]] {
                let p = fisher_exact(table, direction).unwrap();
                assert!((0.0..=1.0).contains(&p), "{:?} {:?} -> {}", table, direction, p);
            }
        }
    }
}
