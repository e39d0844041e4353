//! Running order statistics of anomaly deltas
//!
//! One [`StatsAggregator`] per tracked body. Each axis keeps every delta in
//! a multiset. `snapshot` reports median and MAD per axis and remembers the
//! pair with the smallest MAD seen so far. Storage is unbounded and grows
//! with the run; recording is O(1) and a snapshot is linear in the samples.

use crate::error::{SimError, SimResult};
use crate::simulation::laws::PhysicalLaw;
use crate::simulation::states::NVec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Multiset of finite reals. Stored unordered; order statistics are found
/// by selection on a scratch copy, linear in the number of samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multiset {
    values: Vec<f64>,
}

impl Multiset {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn insert(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Average of the two middle elements (the same one when odd)
    pub fn median(&self) -> Option<f64> {
        median_in_place(&mut self.values.clone())
    }

    /// Median of |x - median|
    pub fn mad(&self) -> Option<f64> {
        let mut scratch = self.values.clone();
        let median = median_in_place(&mut scratch)?;
        for x in scratch.iter_mut() {
            *x = (*x - median).abs();
        }
        median_in_place(&mut scratch)
    }
}

/// Median of `values`, reordering them
fn median_in_place(values: &mut [f64]) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let (below, upper, _) = values.select_nth_unstable_by(n / 2, f64::total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        return Some(upper);
    }
    // lower middle is the largest element left of the upper one
    let lower = below.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(0.5 * (lower + upper))
}

/// Summary of one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisStats {
    /// Fewer than two samples
    NoData,
    Summary {
        median: f64,
        mad: f64,
        best_median: f64, // median at the smallest MAD seen
        best_mad: f64,
        samples: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    anomaly: [Option<NVec3>; 2], // last measurement per law: [newtonian, finite]
    fresh: [bool; 2],
    axes: [Multiset; 3],
    best: [Option<(f64, f64)>; 3], // (median, mad)
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, axis: Axis, value: f64) -> SimResult<()> {
        if !value.is_finite() {
            return Err(SimError::NonFiniteSample(value));
        }
        self.axes[axis as usize].insert(value);
        Ok(())
    }

    /// Store the latest measurement of one law variant. Once both variants
    /// hold a measurement not yet paired, their difference (finite minus
    /// newtonian) is recorded on every axis. Returns the recorded delta.
    pub fn observe(&mut self, law: PhysicalLaw, measurement: NVec3) -> SimResult<Option<NVec3>> {
        let slot = variant_slot(law);
        self.anomaly[slot] = Some(measurement);
        self.fresh[slot] = true;

        if !(self.fresh[0] && self.fresh[1]) {
            return Ok(None);
        }
        let (Some(newton), Some(finite)) = (self.anomaly[0], self.anomaly[1]) else {
            return Ok(None);
        };
        self.fresh = [false, false];

        let delta = finite - newton;
        for axis in Axis::ALL {
            self.record(axis, delta[axis as usize])?;
        }
        Ok(Some(delta))
    }

    /// Last measurement seen for `law`
    pub fn anomaly(&self, law: PhysicalLaw) -> Option<NVec3> {
        self.anomaly[variant_slot(law)]
    }

    pub fn samples(&self, axis: Axis) -> &Multiset {
        &self.axes[axis as usize]
    }

    pub fn snapshot(&mut self) -> [AxisStats; 3] {
        Axis::ALL.map(|axis| self.axis_snapshot(axis))
    }

    fn axis_snapshot(&mut self, axis: Axis) -> AxisStats {
        let i = axis as usize;
        let set = &self.axes[i];
        if set.len() < 2 {
            return AxisStats::NoData;
        }
        let (Some(median), Some(mad)) = (set.median(), set.mad()) else {
            return AxisStats::NoData;
        };

        // only a strictly smaller MAD replaces the best pair
        let best = match self.best[i] {
            Some(prev) if mad >= prev.1 => prev,
            _ => (median, mad),
        };
        self.best[i] = Some(best);

        AxisStats::Summary {
            median,
            mad,
            best_median: best.0,
            best_mad: best.1,
            samples: set.len(),
        }
    }
}

fn variant_slot(law: PhysicalLaw) -> usize {
    match law {
        PhysicalLaw::Newtonian => 0,
        PhysicalLaw::FiniteTheory => 1,
    }
}
