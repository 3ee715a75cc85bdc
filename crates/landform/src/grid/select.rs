//! Threshold-based selection between option grids.
use std::sync::Arc;

use glam::Vec2;

use crate::grid::GridFunction;
use crate::value::ValueGrid;

/// Per-result hook applied to the chosen option's value, keyed by its index.
pub type PostProcess<T> = Arc<dyn Fn(T, usize) -> T + Send + Sync>;

/// Index of the option chosen for `value`: the first `i` with `value < thresholds[i]`,
/// otherwise the last option. `None` only when there are no options.
///
/// Thresholds are expected to be sorted ascending and one shorter than the option
/// list. Neither is checked: only the overlapping prefix is scanned.
#[inline]
pub fn select_index(value: f32, thresholds: &[f32], option_count: usize) -> Option<usize> {
    let last = option_count.checked_sub(1)?;
    thresholds
        .iter()
        .take(last)
        .position(|t| value < *t)
        .or(Some(last))
}

/// Returns `options[i]` sampled at the same point, where `i` is picked from `input`
/// by [`select_index`].
pub struct Select<T> {
    input: ValueGrid,
    thresholds: Vec<f32>,
    options: Vec<Arc<dyn GridFunction<T>>>,
    post_process: Option<PostProcess<T>>,
}

impl<T> Select<T> {
    pub fn new(input: ValueGrid, thresholds: Vec<f32>, options: Vec<Arc<dyn GridFunction<T>>>) -> Self {
        Self {
            input,
            thresholds,
            options,
            post_process: None,
        }
    }

    pub fn with_post_process(mut self, post_process: PostProcess<T>) -> Self {
        self.post_process = Some(post_process);
        self
    }
}

impl<T: Default> GridFunction<T> for Select<T> {
    fn value_at(&self, p: Vec2) -> T {
        let value = self.input.value_at(p);
        let Some(index) = select_index(value, &self.thresholds, self.options.len()) else {
            return T::default();
        };
        let chosen = self.options[index].value_at(p);
        match &self.post_process {
            Some(post) => post(chosen, index),
            None => chosen,
        }
    }
}
