//! Receiver statistics.

use std::collections::HashMap;

use radtrace_optics::RadiationPackage;
use radtrace_scene::VolumeId;
use serde::{Deserialize, Serialize};

use crate::Facing;

/// Accumulated arrivals at one receiver.
///
/// Every field is a plain sum, so tallies from independent workers merge
/// in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiverStats {
    /// Summed package weight.
    pub flux: f64,
    /// Summed intensity-weighted path length.
    pub weighted_path: f64,
    /// Number of arrivals.
    pub count: u64,
}

impl ReceiverStats {
    /// Record one arriving package.
    pub fn record(&mut self, package: &RadiationPackage) {
        self.flux += package.intensity();
        self.weighted_path += package.weighted_path;
        self.count += 1;
    }

    /// Add another receiver's totals.
    pub fn merge(&mut self, other: &ReceiverStats) {
        self.flux += other.flux;
        self.weighted_path += other.weighted_path;
        self.count += other.count;
    }

    /// Flux-weighted mean path length; zero before anything arrived.
    pub fn mean_path_length(&self) -> f64 {
        if self.flux > 0.0 {
            self.weighted_path / self.flux
        } else {
            0.0
        }
    }
}

/// Receiver statistics for a run, keyed by volume and facing.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    stats: HashMap<(VolumeId, Facing), ReceiverStats>,
}

impl Tally {
    /// Empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a package crossing `volume`'s boundary.
    pub fn record(&mut self, volume: VolumeId, facing: Facing, package: &RadiationPackage) {
        self.stats
            .entry((volume, facing))
            .or_default()
            .record(package);
    }

    /// Statistics of one receiver, if it recorded anything.
    pub fn get(&self, volume: VolumeId, facing: Facing) -> Option<&ReceiverStats> {
        self.stats.get(&(volume, facing))
    }

    /// Fold another tally into this one.
    pub fn merge(&mut self, other: Tally) {
        for (key, stats) in other.stats {
            self.stats.entry(key).or_default().merge(&stats);
        }
    }

    /// All receivers that recorded something.
    pub fn iter(&self) -> impl Iterator<Item = (VolumeId, Facing, &ReceiverStats)> {
        self.stats
            .iter()
            .map(|(&(volume, facing), stats)| (volume, facing, stats))
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
