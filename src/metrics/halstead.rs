//! Halstead volume, difficulty and effort.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Derived Halstead measures for one function body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HalsteadMetrics {
    pub volume: f64,
    pub difficulty: f64,
    pub effort: f64,
}

/// Running operator/operand tallies.
#[derive(Debug, Default)]
pub struct HalsteadCounter {
    operators: HashMap<String, u32>,
    operands: HashMap<String, u32>,
}

impl HalsteadCounter {
    pub fn operator(&mut self, symbol: &str) {
        *self.operators.entry(symbol.to_string()).or_default() += 1;
    }

    pub fn operand(&mut self, name: &str) {
        *self.operands.entry(name.to_string()).or_default() += 1;
    }

    /// Distinct operators (n1).
    pub fn distinct_operators(&self) -> usize {
        self.operators.len()
    }

    /// Distinct operands (n2).
    pub fn distinct_operands(&self) -> usize {
        self.operands.len()
    }

    /// Total operator occurrences (N1).
    pub fn total_operators(&self) -> u32 {
        self.operators.values().sum()
    }

    /// Total operand occurrences (N2).
    pub fn total_operands(&self) -> u32 {
        self.operands.values().sum()
    }

    pub fn finish(&self) -> HalsteadMetrics {
        compute(
            self.distinct_operators(),
            self.distinct_operands(),
            self.total_operators(),
            self.total_operands(),
        )
    }
}

/// Compute the measures from raw counts, returning 0 where a term is undefined.
pub fn compute(n1: usize, n2: usize, total_ops: u32, total_operands: u32) -> HalsteadMetrics {
    let vocabulary = n1 + n2;
    let length = f64::from(total_ops + total_operands);

    let volume = if vocabulary == 0 {
        0.0
    } else {
        length * (vocabulary as f64).log2()
    };
    let difficulty = if n2 == 0 {
        0.0
    } else {
        (n1 as f64 / 2.0) * (f64::from(total_operands) / n2 as f64)
    };

    HalsteadMetrics {
        volume,
        difficulty,
        effort: difficulty * volume,
    }
}
