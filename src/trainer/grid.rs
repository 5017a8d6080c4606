//! Lazy cartesian product over hyperparameter ranges

use crate::core::{ParameterMap, ParameterRange, ParameterRangeMap};

/// Iterator over every combination of a [`ParameterRangeMap`]
///
/// Parameter names are visited in sorted order and the last name varies
/// fastest, so `{"constant": [0, 1], "smoc": [0.1, 1]}` yields
/// `(0, 0.1), (0, 1), (1, 0.1), (1, 1)`. An empty map yields one empty
/// point; a map with any empty range yields nothing.
#[derive(Debug, Clone)]
pub struct ParameterGrid {
    names: Vec<String>,
    ranges: Vec<ParameterRange>,
    /// Odometer position; `None` once exhausted
    cursor: Option<Vec<usize>>,
}

impl ParameterGrid {
    pub fn new(ranges: &ParameterRangeMap) -> Self {
        let (names, ranges): (Vec<String>, Vec<ParameterRange>) = ranges
            .iter()
            .map(|(name, range)| (name.clone(), range.clone()))
            .unzip();
        let cursor = if ranges.iter().any(|r| r.is_empty()) {
            None
        } else {
            Some(vec![0; names.len()])
        };
        Self {
            names,
            ranges,
            cursor,
        }
    }

    /// Number of grid points
    pub fn size(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).product()
    }

    fn advance(&mut self) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        for position in (0..cursor.len()).rev() {
            cursor[position] += 1;
            if cursor[position] < self.ranges[position].len() {
                return;
            }
            cursor[position] = 0;
        }
        self.cursor = None;
    }
}

impl Iterator for ParameterGrid {
    type Item = ParameterMap;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_ref()?;
        let point = self
            .names
            .iter()
            .zip(cursor)
            .zip(&self.ranges)
            .map(|((name, &i), range)| (name.clone(), range[i]))
            .collect();
        self.advance();
        Some(point)
    }
}
