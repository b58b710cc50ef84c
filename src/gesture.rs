//! Finger counting from hand landmarks and the fist-to-click debouncer.
//!
//! The count is a fixed-index heuristic over the 21-point hand model: it only
//! holds for one hand orientation (palm towards a mirrored camera, fingers up).
//! Rotated or mirrored hands give wrong counts.

use log::debug;
use serde::{Deserialize, Serialize};

/// Number of keypoints in one detected hand.
pub const LANDMARK_COUNT: usize = 21;
/// Tip indices: thumb, index, middle, ring, pinky.
pub const TIP_IDS: [usize; 5] = [4, 8, 12, 16, 20];
pub const DEFAULT_CLICK_COOLDOWN_MS: u64 = 300;

/// Whole milliseconds; frame timestamps from `Date::now()` are already integral.
pub fn cooldown_ms_from_secs(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 { (secs * 1000.0).round() as u64 } else { 0 }
}

/// Normalized image coordinate (0.0..=1.0 on both axes, y grows downwards).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

#[cfg(test)]
impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FingerCount {
    NoHand,
    Fingers(u8),
}

impl FingerCount {
    /// Integer form used by status displays: -1 for no hand, else 0..=5.
    pub fn as_raw(self) -> i8 {
        match self {
            FingerCount::NoHand => -1,
            FingerCount::Fingers(n) => n as i8,
        }
    }

    pub fn is_fist(self) -> bool {
        self == FingerCount::Fingers(0)
    }

    pub fn label(self) -> String {
        match self {
            FingerCount::NoHand => "No hand".to_string(),
            FingerCount::Fingers(1) => "1 finger".to_string(),
            FingerCount::Fingers(n) => format!("{} fingers", n),
        }
    }
}

/// Counts extended digits. Empty or truncated input means no hand.
pub fn classify(landmarks: &[Landmark]) -> FingerCount {
    if landmarks.len() < LANDMARK_COUNT {
        return FingerCount::NoHand;
    }
    let mut count = 0u8;
    // Thumb: horizontal test against the joint right below the tip.
    let thumb = TIP_IDS[0];
    if landmarks[thumb].x < landmarks[thumb - 1].x {
        count += 1;
    }
    // Other fingers: tip above the PIP joint.
    for &tip in &TIP_IDS[1..] {
        if landmarks[tip].y < landmarks[tip - 2].y {
            count += 1;
        }
    }
    FingerCount::Fingers(count)
}

/// What one frame produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureUpdate {
    /// New count, present only when it differs from the previous frame.
    pub changed: Option<FingerCount>,
    /// A zero-finger click passed the cooldown on this frame.
    pub click: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureTracker {
    last_count: FingerCount,
    last_click_ms: Option<u64>,
    cooldown_ms: u64,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_COOLDOWN_MS)
    }
}

impl GestureTracker {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            last_count: FingerCount::NoHand,
            last_click_ms: None,
            cooldown_ms,
        }
    }

    #[cfg(test)]
    pub fn finger_count(&self) -> FingerCount {
        self.last_count
    }

    pub fn set_cooldown_ms(&mut self, ms: u64) {
        self.cooldown_ms = ms;
    }

    /// Feed one frame. `landmarks` is the first detected hand, or empty.
    pub fn observe(&mut self, landmarks: &[Landmark], now_ms: u64) -> GestureUpdate {
        let count = classify(landmarks);
        let mut update = GestureUpdate::default();
        if count != self.last_count {
            debug!("finger count {} -> {}", self.last_count.as_raw(), count.as_raw());
            self.last_count = count;
            update.changed = Some(count);
        }
        if count.is_fist() {
            let ready = match self.last_click_ms {
                None => true,
                // A clock stepping backwards counts as no time elapsed.
                Some(prev) => now_ms.saturating_sub(prev) >= self.cooldown_ms,
            };
            if ready {
                self.last_click_ms = Some(now_ms);
                update.click = true;
            }
        }
        update
    }

    pub fn reset(&mut self) {
        self.last_count = FingerCount::NoHand;
        self.last_click_ms = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Hand with every digit folded: tips below their reference joints,
    /// thumb tip to the right of its IP joint.
    pub(crate) fn fist() -> Vec<Landmark> {
        let mut lm = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        lm[3] = Landmark::new(0.40, 0.55);
        lm[4] = Landmark::new(0.45, 0.60);
        for &tip in &TIP_IDS[1..] {
            lm[tip - 2] = Landmark::new(0.5, 0.50);
            lm[tip] = Landmark::new(0.5, 0.58);
        }
        lm
    }

    pub(crate) fn open_hand() -> Vec<Landmark> {
        let mut lm = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        lm[3] = Landmark::new(0.40, 0.55);
        lm[4] = Landmark::new(0.32, 0.52);
        for &tip in &TIP_IDS[1..] {
            lm[tip - 2] = Landmark::new(0.5, 0.45);
            lm[tip] = Landmark::new(0.5, 0.20);
        }
        lm
    }

    /// Fist with the first `up` non-thumb fingers raised.
    pub(crate) fn with_fingers(up: usize) -> Vec<Landmark> {
        let mut lm = fist();
        for &tip in TIP_IDS[1..].iter().take(up) {
            lm[tip] = Landmark::new(0.5, 0.30);
        }
        lm
    }

    #[test]
    fn fist_counts_zero() {
        assert_eq!(classify(&fist()), FingerCount::Fingers(0));
    }

    #[test]
    fn open_hand_counts_five() {
        assert_eq!(classify(&open_hand()), FingerCount::Fingers(5));
    }

    #[test]
    fn thumb_tip_level_with_joint_is_folded() {
        let mut lm = fist();
        lm[4].x = lm[3].x;
        assert_eq!(classify(&lm), FingerCount::Fingers(0));
    }

    #[test]
    fn empty_and_truncated_input_is_no_hand() {
        assert_eq!(classify(&[]), FingerCount::NoHand);
        assert_eq!(classify(&open_hand()[..10]), FingerCount::NoHand);
        assert_eq!(FingerCount::NoHand.as_raw(), -1);
    }

    #[test]
    fn partial_counts() {
        assert_eq!(classify(&with_fingers(2)), FingerCount::Fingers(2));
        assert_eq!(classify(&with_fingers(4)), FingerCount::Fingers(4));
    }

    #[test]
    fn held_fist_clicks_once_per_cooldown() {
        let mut t = GestureTracker::new(300);
        let a = t.observe(&fist(), 10_000);
        assert!(a.click);
        assert_eq!(a.changed, Some(FingerCount::Fingers(0)));
        let b = t.observe(&fist(), 10_100);
        assert!(!b.click);
        assert_eq!(b.changed, None);
        let c = t.observe(&fist(), 10_450);
        assert!(c.click);
    }

    #[test]
    fn click_fires_exactly_at_cooldown_on_wall_clock_timestamps() {
        let epoch_ms: u64 = 1_760_000_000_000;
        for k in 0..1000u64 {
            let start = epoch_ms + k * 37;
            let mut t = GestureTracker::default();
            assert!(t.observe(&fist(), start).click);
            assert!(!t.observe(&fist(), start + 299).click, "fired early at k={}", k);
            assert!(t.observe(&fist(), start + 300).click, "suppressed at k={}", k);
        }
    }

    #[test]
    fn cooldown_seconds_convert_without_drift() {
        assert_eq!(cooldown_ms_from_secs(0.3), 300);
        assert_eq!(cooldown_ms_from_secs(1.1), 1100);
        assert_eq!(cooldown_ms_from_secs(-1.0), 0);
        assert_eq!(cooldown_ms_from_secs(f64::NAN), 0);
    }

    #[test]
    fn clock_going_backwards_does_not_click() {
        let mut t = GestureTracker::default();
        assert!(t.observe(&fist(), 5_000).click);
        assert!(!t.observe(&fist(), 4_000).click);
    }

    #[test]
    fn cooldown_survives_releasing_the_fist() {
        let mut t = GestureTracker::default();
        assert!(t.observe(&fist(), 1_000).click);
        assert!(!t.observe(&open_hand(), 1_100).click);
        assert!(!t.observe(&fist(), 1_200).click);
        assert!(t.observe(&fist(), 1_300).click);
    }

    #[test]
    fn repeated_count_is_reported_once() {
        let mut t = GestureTracker::default();
        assert_eq!(t.observe(&with_fingers(2), 0).changed, Some(FingerCount::Fingers(2)));
        let changes: Vec<_> = [2, 3]
            .iter()
            .enumerate()
            .filter_map(|(i, &n)| t.observe(&with_fingers(n), 1_000 + i as u64 * 33).changed)
            .collect();
        assert_eq!(changes, vec![FingerCount::Fingers(3)]);
    }

    #[test]
    fn losing_the_hand_reports_no_hand_once() {
        let mut t = GestureTracker::default();
        t.observe(&with_fingers(3), 0);
        assert_eq!(t.observe(&[], 100).changed, Some(FingerCount::NoHand));
        assert_eq!(t.observe(&[], 200).changed, None);
        assert_eq!(t.finger_count(), FingerCount::NoHand);
    }

    #[test]
    fn reset_forgets_click_time() {
        let mut t = GestureTracker::new(5_000);
        assert!(t.observe(&fist(), 0).click);
        t.reset();
        assert_eq!(t.finger_count(), FingerCount::NoHand);
        assert!(t.observe(&fist(), 100).click);
    }
}
