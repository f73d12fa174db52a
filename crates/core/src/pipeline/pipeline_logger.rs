use std::collections::HashMap;
use std::time::Instant;

/// Observer for per-frame pipeline events.
///
/// The frame callback reports through this trait instead of writing output
/// directly, so the CLI can aggregate a session summary while tests stay
/// silent.
pub trait PipelineLogger: Send {
    /// Called once per presented frame. `total` is known only for finite
    /// sources such as a frame limit.
    fn progress(&mut self, frame: usize, total: Option<usize>);

    /// Record how long a named stage took, in milliseconds.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time value (mood, detection failures).
    fn metric(&mut self, name: &str, value: f64);

    /// Record a one-off session event (models ready, mood reset).
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _frame: usize, _total: Option<usize>) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Aggregates timings and metrics and logs them through the `log` crate.
///
/// Progress lines are throttled to every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames_seen: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
            messages: Vec::new(),
        }
    }

    /// Formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_seen;
        let mut lines = vec![format!(
            "Session summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({} samples)",
                durations.len()
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let last = values.last().copied().unwrap_or(0.0);
            lines.push(format!("  {name}: avg {:.1}  last {last:.1}", mean(values)));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        if !self.messages.is_empty() {
            lines.push("  Events:".to_string());
            lines.extend(self.messages.iter().map(|m| format!("    {m}")));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, frame: usize, total: Option<usize>) {
        self.frames_seen = self.frames_seen.max(frame + 1);
        let shown = frame + 1;
        match total {
            Some(total) if total > 0 => {
                if shown % self.throttle_frames == 0 || shown == total {
                    let pct = shown as f64 / total as f64 * 100.0;
                    log::info!("Frame {shown}/{total} ({pct:.1}%)");
                }
            }
            _ => {
                if shown % self.throttle_frames == 0 {
                    log::info!("Frame {shown}");
                }
            }
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, Some(10));
        logger.timing("detect", 5.0);
        logger.metric("mood", 90.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("render", 5.0);

        assert_eq!(logger.timings_for("detect").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for("render").unwrap(), &[5.0]);
        assert!(logger.timings_for("missing").is_none());
    }

    #[test]
    fn test_metric_average() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.metric("mood", 170.0);
        logger.metric("mood", 180.0);
        assert_relative_eq!(mean(logger.metrics_for("mood").unwrap()), 175.0);
    }

    #[test]
    fn test_summary_includes_stages_and_metrics() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(9, None);
        logger.timing("detect", 20.0);
        logger.metric("mood", 170.0);
        logger.metric("mood", 180.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Session summary (10 frames"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("mood: avg 175.0  last 180.0"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_frames_seen() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 0..20 {
            logger.progress(i, Some(20));
        }
        assert_eq!(logger.frames_seen(), 20);
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.info("Mood reset from 120 (sad)");
        assert_eq!(logger.messages(), ["Mood reset from 120 (sad)".to_string()]);

        logger.metric("mood", 0.0);
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Events:\n    Mood reset from 120 (sad)"));
    }

    #[test]
    fn test_zero_throttle_is_clamped() {
        assert_eq!(StdoutPipelineLogger::new(0).throttle_frames, 1);
    }
}
