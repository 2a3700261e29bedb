//! Hierarchical wall-clock profiler.
//!
//! Sections are started and stopped by name. A section started while another
//! one is running becomes its child, and [`Stopwatch::report`] prints the
//! resulting tree:
//!
//! ```text
//! Update: 0.120, 60, 7.200
//! Render: 1.350, 60, 81.000
//!   Mesh: 0.400, 60, 24.000
//! ```
//!
//! Each line holds the average milliseconds per sample, the sample count and
//! the total milliseconds since the previous report.

use std::collections::HashMap;
use std::io::{self, Write};

use instant::{Duration, Instant};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StopwatchError {
    #[error("Timer for '{0}' already started.")]
    AlreadyStarted(String),
    #[error("No timer started.")]
    NoTimer,
    #[error("Could not write stopwatch report: {0}")]
    Report(String),
}

#[derive(Debug)]
struct TimePeriod {
    name: String,
    running: bool,
    resumed_at: Option<Instant>,
    total: Duration,
    count: u32,
    last_total: Option<Duration>,
    last_count: u32,
    children: Vec<usize>,
}

impl TimePeriod {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            running: false,
            resumed_at: None,
            total: Duration::ZERO,
            count: 0,
            last_total: None,
            last_count: 0,
            children: Vec::new(),
        }
    }

    fn accumulate(&mut self, now: Instant) {
        if let Some(since) = self.resumed_at.take() {
            self.total += now.duration_since(since);
        }
    }

    fn reset(&mut self) {
        self.last_total = Some(self.total);
        self.last_count = self.count;
        self.total = Duration::ZERO;
        self.count = 0;
    }
}

#[derive(Debug, Default)]
pub struct Stopwatch {
    periods: Vec<TimePeriod>,
    by_name: HashMap<String, usize>,
    roots: Vec<usize>,
    stack: Vec<usize>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts timing `name`. If another section is running, `name` is nested
    /// inside it.
    pub fn start(&mut self, name: &str) -> Result<(), StopwatchError> {
        let index = match self.by_name.get(name) {
            Some(&index) => {
                if self.periods[index].running {
                    return Err(StopwatchError::AlreadyStarted(name.to_string()));
                }
                index
            }
            None => {
                self.periods.push(TimePeriod::new(name));
                let index = self.periods.len() - 1;
                self.by_name.insert(name.to_string(), index);
                index
            }
        };

        self.stack.push(index);
        let period = &mut self.periods[index];
        period.running = true;
        period.resumed_at = Some(Instant::now());
        Ok(())
    }

    /// Pauses the innermost running section, keeping the time measured so far.
    pub fn suspend(&mut self) -> Result<(), StopwatchError> {
        let now = Instant::now();
        let index = *self.stack.last().ok_or(StopwatchError::NoTimer)?;
        self.periods[index].accumulate(now);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), StopwatchError> {
        let index = *self.stack.last().ok_or(StopwatchError::NoTimer)?;
        self.periods[index].resumed_at = Some(Instant::now());
        Ok(())
    }

    /// Finishes the innermost section, adding the time since it was started or
    /// last resumed.
    pub fn stop(&mut self) -> Result<(), StopwatchError> {
        let now = Instant::now();
        let index = self.stack.pop().ok_or(StopwatchError::NoTimer)?;
        self.periods[index].accumulate(now);
        self.finish(index);
        Ok(())
    }

    /// Finishes the innermost section without adding any time. Pairs with
    /// [`suspend`](Self::suspend).
    pub fn end(&mut self) -> Result<(), StopwatchError> {
        let index = self.stack.pop().ok_or(StopwatchError::NoTimer)?;
        self.periods[index].resumed_at = None;
        self.finish(index);
        Ok(())
    }

    fn finish(&mut self, index: usize) {
        let period = &mut self.periods[index];
        period.running = false;
        period.count += 1;

        match self.stack.last() {
            None => {
                if !self.roots.contains(&index) {
                    self.roots.push(index);
                }
            }
            Some(&parent) => {
                let children = &mut self.periods[parent].children;
                if !children.contains(&index) {
                    children.push(index);
                }
            }
        }
    }

    /// Stops the innermost section and immediately writes and resets it alone.
    /// The section is reset even when writing fails.
    pub fn stop_and_report<W: Write>(&mut self, writer: &mut W) -> Result<(), StopwatchError> {
        let index = *self.stack.last().ok_or(StopwatchError::NoTimer)?;
        self.stop()?;
        let written = self.write_period(writer, index);
        self.periods[index].reset();
        written.map_err(|e| StopwatchError::Report(e.to_string()))
    }

    /// Writes every finished section depth first and starts a new
    /// measurement interval. Sections without samples are skipped.
    pub fn report<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        let roots = self.roots.clone();
        self.report_level(writer, &roots, 0)
    }

    /// Same as [`report`](Self::report) but collects the lines in a `String`.
    pub fn report_to_string(&mut self) -> String {
        let mut out = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.report(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    fn report_level<W: Write>(&mut self, writer: &mut W, periods: &[usize], depth: usize) -> io::Result<()> {
        for &index in periods {
            let child_depth = if self.periods[index].count > 0 {
                write!(writer, "{}", "  ".repeat(depth))?;
                self.write_period(writer, index)?;
                depth + 1
            } else {
                depth
            };

            self.periods[index].reset();

            let children = self.periods[index].children.clone();
            if !children.is_empty() {
                self.report_level(writer, &children, child_depth)?;
            }
        }
        Ok(())
    }

    fn write_period<W: Write>(&self, writer: &mut W, index: usize) -> io::Result<()> {
        let period = &self.periods[index];
        let total_ms = period.total.as_secs_f64() * 1e3;
        let average = if period.count > 0 {
            total_ms / period.count as f64
        } else {
            0.0
        };
        writeln!(
            writer,
            "{}: {:.3}, {}, {:.3}",
            period.name, average, period.count, total_ms
        )
    }

    fn last_reported(&self, name: &str) -> Option<&TimePeriod> {
        self.by_name
            .get(name)
            .map(|&index| &self.periods[index])
            .filter(|period| period.last_total.is_some())
    }

    /// Average milliseconds per sample during the last reported interval.
    pub fn time_per_frame(&self, name: &str) -> f64 {
        match self.last_reported(name) {
            Some(period) if period.last_count > 0 => {
                let total = period.last_total.unwrap_or_default();
                total.as_secs_f64() * 1e3 / period.last_count as f64
            }
            _ => 0.0,
        }
    }

    /// Sample count of the last reported interval.
    pub fn total_frames(&self, name: &str) -> u32 {
        self.last_reported(name).map_or(0, |period| period.last_count)
    }

    /// Total milliseconds of the last reported interval.
    pub fn total_time(&self, name: &str) -> f64 {
        self.last_reported(name)
            .and_then(|period| period.last_total)
            .map_or(0.0, |total| total.as_secs_f64() * 1e3)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.by_name
            .get(name)
            .is_some_and(|&index| self.periods[index].running)
    }
}
