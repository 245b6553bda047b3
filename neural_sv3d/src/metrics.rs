//! Running loss bookkeeping and progress lines.

/// Append-only record of per-step losses.
#[derive(Debug, Clone, Default)]
pub struct LossLog {
    values: Vec<f32>,
}

impl LossLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a loss.
    pub fn push(&mut self, loss: f32) {
        self.values.push(loss);
    }

    /// Number of recorded losses.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All recorded losses in step order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Arithmetic mean of every recorded loss.
    ///
    /// Recomputed from all entries on each call.
    pub fn mean(&self) -> Option<f32> {
        if self.values.is_empty() {
            return None;
        }
        let sum: f64 = self.values.iter().map(|v| *v as f64).sum();
        Some((sum / self.values.len() as f64) as f32)
    }

    /// Consume the log, returning the losses.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

/// Timings of one evaluation step, in seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepTimes {
    /// Time since the run started.
    pub total: f64,
    /// Time spent waiting for the batch.
    pub read: f64,
    /// Time spent on the whole step.
    pub iteration: f64,
}

/// Format a progress line: `[step/max_iter]; ttime: total (read, iter); eva_loss: mean`.
pub fn progress_line(step: usize, max_iter: usize, times: StepTimes, mean_loss: f32) -> String {
    format!(
        "[{:4}/{:4}]; ttime: {:.0} ({:.2}, {:.2}); eva_loss: {:.3}",
        step, max_iter, times.total, times.read, times.iteration, mean_loss
    )
}
