//! Turns the continuous per-axis overlap signal into one-shot bounce edges.

/// Which of the two edge detectors decides that a bounce started.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BouncePolicy {
  /// Fires when the consecutive overlap count is exactly one.
  #[default]
  Counter,
  /// Fires when the overlap latch is set now and was clear on the previous step.
  Latch,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BounceTracker {
  /// Consecutive overlapping steps per axis, `[x, y]`.
  counters: [u32; 2],
  latches: [bool; 2],
  previous: [bool; 2],
}

impl BounceTracker {
  /// Records this step's overlap state for `axis` (0 = x, 1 = y).
  pub fn record(&mut self, axis: usize, overlapping: bool) {
    self.previous[axis] = self.latches[axis];
    self.latches[axis] = overlapping;
    self.counters[axis] = if overlapping {
      self.counters[axis].saturating_add(1)
    } else {
      0
    };
  }

  pub fn count(&self, axis: usize) -> u32 {
    self.counters[axis]
  }

  pub fn is_overlapping(&self, axis: usize) -> bool {
    self.latches[axis]
  }

  /// Per-axis `[x, y]` flags, true only on the first step of an overlap episode.
  pub fn edges(&self, policy: BouncePolicy) -> [bool; 2] {
    std::array::from_fn(|axis| match policy {
      BouncePolicy::Counter => self.counters[axis] == 1,
      BouncePolicy::Latch => self.latches[axis] && !self.previous[axis],
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fired(policy: BouncePolicy, overlaps: &[bool]) -> Vec<bool> {
    let mut tracker = BounceTracker::default();
    overlaps
      .iter()
      .map(|&overlapping| {
        tracker.record(1, overlapping);
        tracker.edges(policy)[1]
      })
      .collect()
  }

  #[test]
  fn counter_fires_once_per_episode() {
    let overlaps = [false, true, true, true, false, true, true];
    assert_eq!(
      fired(BouncePolicy::Counter, &overlaps),
      [false, true, false, false, false, true, false]
    );
  }

  #[test]
  fn latch_matches_counter() {
    let overlaps = [true, true, false, false, true, false, true, true, true];
    assert_eq!(
      fired(BouncePolicy::Latch, &overlaps),
      fired(BouncePolicy::Counter, &overlaps)
    );
  }

  #[test]
  fn axes_are_independent() {
    let mut tracker = BounceTracker::default();
    tracker.record(0, true);
    tracker.record(1, false);
    assert_eq!(tracker.edges(BouncePolicy::Counter), [true, false]);
    tracker.record(0, true);
    tracker.record(1, true);
    assert_eq!(tracker.edges(BouncePolicy::Latch), [false, true]);
    assert_eq!(tracker.count(0), 2);
    assert_eq!(tracker.count(1), 1);
  }
}
