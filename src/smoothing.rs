use std::collections::VecDeque;

use crate::angle;
use crate::config::{HEADING_HISTORY_SIZE, HEADING_SMOOTHING_FACTOR};

/// Damps the raw planner output before it reaches the rudder loop.
///
/// Raw headings are averaged over a short window (circular mean, so 350° and
/// 10° average to 0°), then the output is pulled towards that mean with a gain
/// that depends on how far apart they are: small jitter is heavily damped,
/// large swings such as a tack go through quickly.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadingSmoother {
    history: VecDeque<f64>,
    capacity: usize,
    base_factor: f64,
    last_smoothed: Option<f64>,
}

impl Default for HeadingSmoother {
    fn default() -> Self {
        Self::new(HEADING_HISTORY_SIZE, HEADING_SMOOTHING_FACTOR)
    }
}

impl HeadingSmoother {
    pub fn new(capacity: usize, base_factor: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity + 1),
            capacity,
            base_factor,
            last_smoothed: None,
        }
    }

    /// Feed one raw heading and get the smoothed heading back.
    /// A non-finite input leaves the filter untouched and returns the last output (or 0.0).
    pub fn apply(&mut self, raw_heading: f64) -> f64 {
        if !raw_heading.is_finite() {
            return self.last_smoothed.unwrap_or(0.0);
        }

        self.history.push_back(angle::normalize(raw_heading));
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        // Headings that cancel out (e.g. 0° and 180°) have no mean: fall back to the newest one.
        let average = angle::circular_mean(self.history.make_contiguous())
            .unwrap_or(angle::normalize(raw_heading));

        let smoothed = match self.last_smoothed {
            None => average,
            Some(previous) => {
                let diff = angle::signed_difference(average, previous);
                angle::normalize(previous + diff * self.factor_for(diff))
            }
        };

        self.last_smoothed = Some(smoothed);
        smoothed
    }

    fn factor_for(&self, diff: f64) -> f64 {
        let magnitude = diff.abs();
        if magnitude < 5.0 {
            0.1
        } else if magnitude < 15.0 {
            0.2
        } else if magnitude > 60.0 {
            0.5
        } else {
            self.base_factor
        }
    }

    pub fn last_smoothed(&self) -> Option<f64> {
        self.last_smoothed
    }

    /// Raw headings currently in the averaging window, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last_smoothed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_heading_passes_through() {
        let mut smoother = HeadingSmoother::default();
        assert_eq!(smoother.apply(55.0), 55.0);
        assert_eq!(smoother.last_smoothed(), Some(55.0));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut smoother = HeadingSmoother::default();
        let capacity = smoother.history.capacity();
        for i in 0..20 {
            smoother.apply(i as f64 * 10.0);
            assert!(smoother.len() <= 5);
        }
        // the window never reallocates
        assert_eq!(smoother.history.capacity(), capacity);
        let history: Vec<f64> = smoother.history().collect();
        assert_eq!(history, vec![150.0, 160.0, 170.0, 180.0, 190.0]);
    }

    #[test]
    fn test_wraparound_average() {
        let mut smoother = HeadingSmoother::default();
        smoother.apply(10.0);
        let out = smoother.apply(350.0);
        // mean of [10, 350] is 0; output moves from 10 towards 0, never towards 180
        assert!(angle::signed_difference(out, 0.0).abs() <= 10.0, "out was {}", out);
        assert!(angle::signed_difference(out, 180.0).abs() > 90.0);
    }

    #[test]
    fn test_adaptive_factor_bands() {
        let smoother = HeadingSmoother::default();
        assert_eq!(smoother.factor_for(4.9), 0.1);
        assert_eq!(smoother.factor_for(-4.9), 0.1);
        assert_eq!(smoother.factor_for(5.0), 0.2);
        assert_eq!(smoother.factor_for(14.9), 0.2);
        assert_eq!(smoother.factor_for(15.0), 0.3);
        assert_eq!(smoother.factor_for(60.0), 0.3);
        assert_eq!(smoother.factor_for(60.1), 0.5);
        assert_eq!(smoother.factor_for(-120.0), 0.5);
    }

    #[test]
    fn test_small_jitter_is_damped() {
        let mut smoother = HeadingSmoother::default();
        smoother.apply(100.0);
        // mean becomes 101, diff 1 → moves by 0.1
        let out = smoother.apply(102.0);
        assert!((out - 100.1).abs() < 1e-6, "out was {}", out);
    }

    #[test]
    fn test_nan_returns_last_good_value() {
        let mut smoother = HeadingSmoother::default();
        assert_eq!(smoother.apply(f64::NAN), 0.0);
        assert!(smoother.is_empty());

        smoother.apply(42.0);
        assert_eq!(smoother.apply(f64::NAN), 42.0);
        assert_eq!(smoother.len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut smoother = HeadingSmoother::default();
        smoother.apply(42.0);
        smoother.reset();
        assert!(smoother.is_empty());
        assert_eq!(smoother.last_smoothed(), None);
        assert_eq!(smoother, HeadingSmoother::default());
    }
}
