use crate::model::UahAmount;
use crate::sink::Chart;
use std::fmt;

/// An ordered mapping from group key to summed amount, produced by the analyzer views.
///
/// The point order is whatever the producing view guarantees; a series never reorders itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Series<K> {
    points: Vec<(K, UahAmount)>,
}

impl<K> Series<K> {
    pub(crate) fn new(points: Vec<(K, UahAmount)>) -> Self {
        Self { points }
    }

    /// Points in view order.
    pub fn points(&self) -> &[(K, UahAmount)] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exact sum across all points.
    pub fn total(&self) -> UahAmount {
        self.points.iter().map(|(_, amount)| *amount).sum()
    }
}

impl<K: fmt::Display> Series<K> {
    /// Stringify the keys into a named [`Chart`] for the sink boundary.
    pub fn into_chart(self, name: impl Into<String>) -> Chart {
        Chart {
            name: Some(name.into()),
            points: self
                .points
                .into_iter()
                .map(|(key, amount)| (key.to_string(), amount))
                .collect(),
        }
    }
}
