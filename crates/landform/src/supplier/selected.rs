//! Threshold selection over suppliers.
use std::sync::Arc;

use crate::grid::select_index;
use crate::supplier::Supplier;
use crate::value::ValueSupplier;

/// Picks `options[i]` for the first `i` where the axis value is `< thresholds[i]`,
/// otherwise the last option. See [`crate::grid::Select`] for the grid form.
pub struct Selected<T> {
    axis: ValueSupplier,
    thresholds: Vec<f32>,
    options: Vec<Arc<dyn Supplier<T>>>,
}

impl<T> Selected<T> {
    pub fn new(axis: ValueSupplier, thresholds: Vec<f32>, options: Vec<Arc<dyn Supplier<T>>>) -> Self {
        Self {
            axis,
            thresholds,
            options,
        }
    }
}

impl<T: Default> Supplier<T> for Selected<T> {
    fn get(&self) -> T {
        let value = self.axis.get();
        select_index(value, &self.thresholds, self.options.len())
            .map(|i| self.options[i].get())
            .unwrap_or_default()
    }

    fn reset_state(&self) {
        self.axis.reset_state();
        for option in &self.options {
            option.reset_state();
        }
    }
}
