//! Running sufficient statistics over weighted labels.
//!
//! [`LossState`] keeps count, mean and sum of squared deviations with
//! Welford's update. Removal is the algebraic inverse of addition, so a
//! sweep over a sorted example sequence can move one example at a time from
//! the right partition to the left in O(1).

/// Online mean / sum-of-squared-deviations accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LossState {
    count: usize,
    mean: f64,
    sum_squared_deviations: f64,
}

impl LossState {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator over every value of `values`.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut state = Self::new();
        for value in values {
            state.add(value);
        }
        state
    }

    /// Adds one value.
    #[inline]
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.sum_squared_deviations += delta * (value - self.mean);
    }

    /// Removes one value previously added.
    #[inline]
    pub fn remove(&mut self, value: f64) {
        match self.count {
            0 => {}
            1 => *self = Self::default(),
            n => {
                let remaining = (n - 1) as f64;
                let previous_mean = (n as f64 * self.mean - value) / remaining;
                self.sum_squared_deviations -= (value - self.mean) * (value - previous_mean);
                if self.sum_squared_deviations < 0.0 {
                    self.sum_squared_deviations = 0.0;
                }
                self.mean = previous_mean;
                self.count = n - 1;
            }
        }
    }

    /// Number of values held.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of the values held, 0.0 when empty.
    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sum of squared deviations from the mean.
    #[inline]
    pub fn sum_squared_deviations(&self) -> f64 {
        self.sum_squared_deviations
    }
}
