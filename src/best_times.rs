//! Best Times - In-memory lap and race records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestTimeEntry {
    pub name: String,
    /// Time in seconds
    pub time: f64,
}

/// Fastest laps and race times, each list sorted ascending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestTimes {
    pub capacity: usize,
    pub laps: Vec<BestTimeEntry>,
    pub races: Vec<BestTimeEntry>,
}

impl BestTimes {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            laps: Vec::new(),
            races: Vec::new(),
        }
    }

    /// Returns true if the lap made the list
    pub fn record_lap(&mut self, name: &str, time: f64) -> bool {
        Self::insert(&mut self.laps, self.capacity, name, time)
    }

    /// Returns true if the race time made the list
    pub fn record_race(&mut self, name: &str, time: f64) -> bool {
        Self::insert(&mut self.races, self.capacity, name, time)
    }

    pub fn best_lap(&self) -> Option<&BestTimeEntry> {
        self.laps.first()
    }

    pub fn best_race(&self) -> Option<&BestTimeEntry> {
        self.races.first()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut times: BestTimes = serde_json::from_str(json)?;
        // Hand-edited files may be unsorted
        times.laps.sort_by(|a, b| a.time.total_cmp(&b.time));
        times.races.sort_by(|a, b| a.time.total_cmp(&b.time));
        times.laps.truncate(times.capacity);
        times.races.truncate(times.capacity);
        Ok(times)
    }

    fn insert(list: &mut Vec<BestTimeEntry>, capacity: usize, name: &str, time: f64) -> bool {
        if !(time.is_finite() && time > 0.0) {
            return false;
        }
        // Equal times keep the earlier entry first
        let idx = list.partition_point(|e| e.time <= time);
        if idx >= capacity {
            return false;
        }
        list.insert(
            idx,
            BestTimeEntry {
                name: name.to_string(),
                time,
            },
        );
        list.truncate(capacity);
        true
    }
}

impl Default for BestTimes {
    fn default() -> Self {
        Self::new(10)
    }
}
