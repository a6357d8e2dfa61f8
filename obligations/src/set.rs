// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Obligation sets: boolean conditions owed at particular timeframes.

use rtl::syntax::Expr;
use std::collections::BTreeMap;

/// A set of proof obligations, keyed by the timeframe they are owed at.
/// The exprs are already instantiated at their frame. The ordered map
/// keeps iteration, and hence solver interaction, reproducible.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Obligations {
    /// Timeframe to conditions owed at that frame
    pub map: BTreeMap<usize, Vec<Expr>>,
}

impl Obligations {
    /// No obligations.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single obligation at a single timeframe.
    pub fn single(timeframe: usize, e: Expr) -> Self {
        let mut result = Self::new();
        result.add(timeframe, e);
        result
    }

    /// Add one condition at one timeframe.
    pub fn add(&mut self, timeframe: usize, e: Expr) {
        self.map.entry(timeframe).or_default().push(e);
    }

    /// Take the union with another obligation set; conditions at the
    /// same frame accumulate.
    pub fn merge(&mut self, other: Obligations) {
        for (timeframe, mut es) in other.map {
            self.map.entry(timeframe).or_default().append(&mut es);
        }
    }

    /// Whether there are no obligations at all.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Fold the whole set into one condition, together with the latest
    /// timeframe mentioned (0 if the set is empty).
    pub fn conjunction(&self) -> (usize, Expr) {
        let latest = self.map.keys().next_back().copied().unwrap_or(0);
        let conjuncts: Vec<Expr> = self.map.values().flatten().cloned().collect();
        (latest, Expr::and(conjuncts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_multiset_union() {
        let mut a = Obligations::single(1, Expr::id("x"));
        let mut b = Obligations::single(1, Expr::id("x"));
        b.add(2, Expr::id("y"));
        a.merge(b);
        assert_eq!(a.map[&1], vec![Expr::id("x"), Expr::id("x")]);
        assert_eq!(a.map[&2], vec![Expr::id("y")]);
    }

    #[test]
    fn test_conjunction() {
        let mut o = Obligations::single(3, Expr::id("x"));
        o.add(1, Expr::id("y"));
        let (latest, e) = o.conjunction();
        assert_eq!(latest, 3);
        assert_eq!(e, Expr::and([Expr::id("y"), Expr::id("x")]));
    }

    #[test]
    fn test_conjunction_of_empty() {
        assert_eq!(Obligations::new().conjunction(), (0, Expr::true_()));
    }
}
