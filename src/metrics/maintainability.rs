//! Maintainability index.
//!
//! Starts at 100 and deducts for size and complexity, credits comments, then
//! applies multiplicative penalties for duplication, deep nesting and dense
//! branching.

/// Inputs of the index, all taken from an already-computed metrics block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MaintainabilityInputs {
    pub lines_of_code: u32,
    pub cyclomatic_complexity: u32,
    pub comment_density: f64,
    pub nesting_depth: u32,
    pub branch_density: f64,
    pub is_duplicate: bool,
}

const BASE: f64 = 100.0;
const LOC_WEIGHT: f64 = 20.0;
const LOC_CAP: u32 = 100;
const COMPLEXITY_WEIGHT: f64 = 30.0;
const COMPLEXITY_CAP: u32 = 50;
const COMMENT_WEIGHT: f64 = 10.0;
const COMMENT_CAP: f64 = 0.4;

const DUPLICATE_FACTOR: f64 = 0.8;
const NESTING_LIMIT: u32 = 3;
const NESTING_FACTOR: f64 = 0.9;
const BRANCH_DENSITY_LIMIT: f64 = 0.5;
const BRANCH_FACTOR: f64 = 0.9;

pub fn maintainability_index(inputs: &MaintainabilityInputs) -> f64 {
    let loc = f64::from(inputs.lines_of_code.min(LOC_CAP));
    let cc = f64::from(inputs.cyclomatic_complexity.min(COMPLEXITY_CAP));

    let mut index = BASE;
    index -= LOC_WEIGHT * loc / f64::from(LOC_CAP);
    index -= COMPLEXITY_WEIGHT * cc / f64::from(COMPLEXITY_CAP);
    index += COMMENT_WEIGHT * inputs.comment_density.min(COMMENT_CAP);

    if inputs.is_duplicate {
        index *= DUPLICATE_FACTOR;
    }
    if inputs.nesting_depth > NESTING_LIMIT {
        index *= NESTING_FACTOR;
    }
    if inputs.branch_density > BRANCH_DENSITY_LIMIT {
        index *= BRANCH_FACTOR;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trivial_function() {
        let mi = maintainability_index(&MaintainabilityInputs {
            lines_of_code: 3,
            cyclomatic_complexity: 1,
            ..Default::default()
        });
        // 100 - 0.6 - 0.6
        assert!((mi - 98.8).abs() < 1e-9);
    }

    #[test]
    fn test_penalties_compound() {
        let base = MaintainabilityInputs {
            lines_of_code: 10,
            cyclomatic_complexity: 5,
            comment_density: 0.1,
            ..Default::default()
        };
        let plain = maintainability_index(&base);
        let penalized = maintainability_index(&MaintainabilityInputs {
            is_duplicate: true,
            nesting_depth: 4,
            branch_density: 0.6,
            ..base
        });
        assert!((penalized - plain * 0.8 * 0.9 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_comment_credit_is_capped() {
        let at_cap = maintainability_index(&MaintainabilityInputs {
            comment_density: 0.4,
            ..Default::default()
        });
        let above_cap = maintainability_index(&MaintainabilityInputs {
            comment_density: 2.0,
            ..Default::default()
        });
        assert_eq!(at_cap, above_cap);
    }

    proptest! {
        #[test]
        fn prop_non_increasing_in_complexity(
            loc in 0u32..500,
            cc in 1u32..200,
            step in 1u32..50,
            comments in 0.0f64..2.0,
            nesting in 0u32..10,
            branches in 0.0f64..2.0,
            dup in any::<bool>(),
        ) {
            let low = MaintainabilityInputs {
                lines_of_code: loc,
                cyclomatic_complexity: cc,
                comment_density: comments,
                nesting_depth: nesting,
                branch_density: branches,
                is_duplicate: dup,
            };
            let high = MaintainabilityInputs {
                cyclomatic_complexity: cc + step,
                ..low
            };
            prop_assert!(maintainability_index(&high) <= maintainability_index(&low));
        }
    }
}
