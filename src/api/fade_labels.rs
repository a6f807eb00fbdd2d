use indexmap::IndexMap;

use crate::core::lerp;

/// Alpha below which an expiring label is dropped.
const EXPIRE_ALPHA: f64 = 0.01;
/// Distance at which a fading alpha snaps onto its target.
const SNAP_ALPHA: f64 = 0.02;

/// Grid label identity: value quantized to 1e-3.
#[must_use]
pub fn grid_label_key(value: f64) -> i64 {
    (value * 1e3).round() as i64
}

#[must_use]
pub fn grid_label_value(key: i64) -> f64 {
    key as f64 / 1e3
}

/// Time label identity: unix time quantized to 1e-2 seconds.
#[must_use]
pub fn time_label_key(time: f64) -> i64 {
    (time * 100.0).round() as i64
}

#[must_use]
pub fn time_label_time(key: i64) -> f64 {
    key as f64 / 100.0
}

/// One label with its current fade alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeLabel<T> {
    pub alpha: f64,
    pub payload: T,
}

/// Small insertion-ordered map of quantized keys to fading labels.
///
/// Labels are upserted while they are wanted and expire once they have
/// faded out with a zero target.
#[derive(Debug, Clone)]
pub struct FadeLabelSet<T> {
    labels: IndexMap<i64, FadeLabel<T>>,
}

impl<T> Default for FadeLabelSet<T> {
    fn default() -> Self {
        Self {
            labels: IndexMap::new(),
        }
    }
}

impl<T> FadeLabelSet<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: i64) -> bool {
        self.labels.contains_key(&key)
    }

    #[must_use]
    pub fn get(&self, key: i64) -> Option<&FadeLabel<T>> {
        self.labels.get(&key)
    }

    /// Inserts a new label at `alpha`, or replaces the payload of an
    /// existing one while keeping its alpha.
    pub fn upsert(&mut self, key: i64, alpha: f64, payload: T) {
        match self.labels.get_mut(&key) {
            Some(label) => label.payload = payload,
            None => {
                self.labels.insert(key, FadeLabel { alpha, payload });
            }
        }
    }

    /// Inserts a label only when `key` is not present yet.
    pub fn insert_absent(&mut self, key: i64, alpha: f64, payload: T) {
        self.labels
            .entry(key)
            .or_insert(FadeLabel { alpha, payload });
    }

    /// Eases every label toward `target(key, payload)` and expires labels
    /// that reached a zero target.
    ///
    /// `speed(target, alpha)` picks the lerp speed, so fade-in and fade-out
    /// can run at different rates.
    pub fn fade_toward(
        &mut self,
        dt_ms: f64,
        mut target: impl FnMut(i64, &T) -> f64,
        speed: impl Fn(f64, f64) -> f64,
    ) {
        self.labels.retain(|key, label| {
            let goal = target(*key, &label.payload);
            let mut next = lerp(label.alpha, goal, speed(goal, label.alpha), dt_ms);
            if (next - goal).abs() < SNAP_ALPHA {
                next = goal;
            }
            if next < EXPIRE_ALPHA && goal == 0.0 {
                return false;
            }
            label.alpha = next;
            true
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &FadeLabel<T>)> {
        self.labels.iter().map(|(key, label)| (*key, label))
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }
}
