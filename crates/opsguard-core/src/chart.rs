//! Synthetic CPU/memory series for the metrics chart.
//!
//! The series is a pure function of its seed so every redraw paints the
//! same picture: a flat baseline that ramps up after the deployment marker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const POINTS: usize = 60;
pub const INCIDENT_POINT: usize = 38;
pub const DEFAULT_SEED: u64 = 42;
pub const INCIDENT_LABEL: &str = "v2.4.2 deployed";

const LCG_MUL: u64 = 9301;
const LCG_INC: u64 = 49297;
const LCG_MOD: u64 = 233280;

/// Linear congruential generator yielding values in `[0, 1)`.
#[derive(Debug, Clone)]
struct Lcg {
    seed: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            seed: seed % LCG_MOD,
        }
    }

    fn next(&mut self) -> f64 {
        self.seed = (self.seed * LCG_MUL + LCG_INC) % LCG_MOD;
        self.seed as f64 / LCG_MOD as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub cpu: Vec<f64>,
    pub memory: Vec<f64>,
    pub incident_at: usize,
}

impl Default for MetricSeries {
    fn default() -> Self {
        Self::generate(DEFAULT_SEED)
    }
}

impl MetricSeries {
    pub fn generate(seed: u64) -> Self {
        let mut rng = Lcg::new(seed);
        let mut cpu = Vec::with_capacity(POINTS);
        let mut memory = Vec::with_capacity(POINTS);
        for i in 0..POINTS {
            let severity = if i < INCIDENT_POINT {
                0.0
            } else {
                (i - INCIDENT_POINT) as f64 / (POINTS - INCIDENT_POINT) as f64
            };
            cpu.push(25.0 + rng.next() * 15.0 + severity * 65.0);
            memory.push(40.0 + rng.next() * 10.0 + severity * 45.0);
        }
        Self {
            cpu,
            memory,
            incident_at: INCIDENT_POINT,
        }
    }

    /// `(x, y)` pairs in the shape chart widgets expect.
    pub fn cpu_points(&self) -> Vec<(f64, f64)> {
        indexed(&self.cpu)
    }

    pub fn memory_points(&self) -> Vec<(f64, f64)> {
        indexed(&self.memory)
    }

    pub fn len(&self) -> usize {
        self.cpu.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cpu.is_empty()
    }
}

fn indexed(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| (idx as f64, *value))
        .collect()
}

/// Chart view window. Only the axis labels depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartPeriod {
    #[default]
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
}

impl ChartPeriod {
    pub const ALL: [ChartPeriod; 4] = [
        ChartPeriod::Hour,
        ChartPeriod::SixHours,
        ChartPeriod::Day,
        ChartPeriod::Week,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartPeriod::Hour => "1h",
            ChartPeriod::SixHours => "6h",
            ChartPeriod::Day => "24h",
            ChartPeriod::Week => "7d",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChartPeriod::Hour => ChartPeriod::SixHours,
            ChartPeriod::SixHours => ChartPeriod::Day,
            ChartPeriod::Day => ChartPeriod::Week,
            ChartPeriod::Week => ChartPeriod::Hour,
        }
    }

    /// 1-based position, as bound to the number keys.
    pub fn from_digit(digit: char) -> Option<Self> {
        let index = digit.to_digit(10)? as usize;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Five evenly spaced x-axis labels, oldest first.
    pub fn axis_labels(&self) -> [&'static str; 5] {
        match self {
            ChartPeriod::Hour => ["-60m", "-45m", "-30m", "-15m", "now"],
            ChartPeriod::SixHours => ["-6h", "-4.5h", "-3h", "-1.5h", "now"],
            ChartPeriod::Day => ["-24h", "-18h", "-12h", "-6h", "now"],
            ChartPeriod::Week => ["-7d", "-5.25d", "-3.5d", "-1.75d", "now"],
        }
    }
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartPeriod {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|period| period.as_str().eq_ignore_ascii_case(input.trim()))
            .ok_or_else(|| format!("Unknown chart period: {input}"))
    }
}
