//! Moving-average smoothing for scalar joint signals
//!
//! Every detector owns one of these per metric (elbow angle, hip height,
//! ankle position...). Buffers are never shared between detectors.

use std::collections::VecDeque;

/// Bounded FIFO of the most recent samples, reporting their mean
#[derive(Debug, Clone)]
pub struct SmoothingBuffer {
    /// Recent samples, oldest at the front
    samples: VecDeque<f64>,
    /// Maximum number of samples held
    capacity: usize,
}

impl SmoothingBuffer {
    /// Create a buffer holding at most `capacity` samples (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample, evicting the oldest beyond capacity, and return the
    /// mean of the samples now held
    pub fn add(&mut self, value: f64) -> f64 {
        self.samples.push_back(value);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        self.average()
    }

    /// Mean of held samples, 0 when empty
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Oldest sample still in the window
    pub fn oldest(&self) -> Option<f64> {
        self.samples.front().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the window holds `capacity` samples
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Drop all samples
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

impl Default for SmoothingBuffer {
    fn default() -> Self {
        Self::new(5)
    }
}
