use log::info;

/// Summary of one completed solver step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// 1-based number of the step just completed.
    pub step: u64,
    /// Simulation clock after the step in s.
    pub time: f64,
    /// Coldest sample after the step in K (0 on an empty cloud).
    pub min_temperature: f64,
    /// Hottest sample after the step in K (0 on an empty cloud).
    pub max_temperature: f64,
    /// Neighbor pairs skipped because the samples (nearly) coincide.
    pub degenerate_pairs: usize,
}

/// Hook called after every step.
///
/// The solver gathers a [`StepReport`] only when an observer is installed,
/// so the stepping loop does no extra work by default.
pub trait StepObserver: Send {
    fn on_step(&mut self, report: &StepReport);
}

impl<F> StepObserver for F
where
    F: FnMut(&StepReport) + Send,
{
    fn on_step(&mut self, report: &StepReport) {
        self(report)
    }
}

/// Logs a progress line through the `log` facade every `every` steps.
#[derive(Debug, Clone, Copy)]
pub struct LogObserver {
    every: u64,
}

impl LogObserver {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl StepObserver for LogObserver {
    fn on_step(&mut self, report: &StepReport) {
        if report.step % self.every != 0 {
            return;
        }
        info!(
            "step {} t={:.3} s: T_min={:.2} K, T_max={:.2} K",
            report.step, report.time, report.min_temperature, report.max_temperature
        );
        if report.degenerate_pairs > 0 {
            info!(
                "step {}: skipped {} coincident pairs",
                report.step, report.degenerate_pairs
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut obs = |r: &StepReport| seen.push(r.step);
            let report = StepReport {
                step: 3,
                time: 0.3,
                min_temperature: 290.,
                max_temperature: 360.,
                degenerate_pairs: 0,
            };
            obs.on_step(&report);
        }
        assert_eq!(seen, vec![3]);
    }

    #[test]
    fn test_log_observer_every_zero() {
        // Zero is clamped so the modulo never divides by zero
        let mut obs = LogObserver::new(0);
        obs.on_step(&StepReport {
            step: 1,
            time: 0.1,
            min_temperature: 0.,
            max_temperature: 0.,
            degenerate_pairs: 2,
        });
    }
}
