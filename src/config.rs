use serde::{Deserialize, Serialize};

use crate::gesture::{cooldown_ms_from_secs, DEFAULT_CLICK_COOLDOWN_MS};
use crate::util;

pub const SETTINGS_KEY: &str = "gh_settings";

/// User-tunable hub settings, persisted as JSON in localStorage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    /// Minimum seconds between two fist clicks.
    pub click_cooldown_secs: f64,
    pub detection_confidence: f64,
    pub tracking_confidence: f64,
    pub max_num_hands: u32,
    pub camera_width: u32,
    pub camera_height: u32,
    /// Draw the hand skeleton over the camera preview.
    pub show_landmarks: bool,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            click_cooldown_secs: DEFAULT_CLICK_COOLDOWN_MS as f64 / 1000.0,
            detection_confidence: 0.5,
            tracking_confidence: 0.3,
            max_num_hands: 1,
            camera_width: 640,
            camera_height: 480,
            show_landmarks: true,
        }
    }
}

impl HubSettings {
    /// Clamp every field into the range the detector accepts.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if !self.click_cooldown_secs.is_finite() {
            self.click_cooldown_secs = d.click_cooldown_secs;
        }
        self.click_cooldown_secs = self.click_cooldown_secs.clamp(0.0, 10.0);
        if !self.detection_confidence.is_finite() {
            self.detection_confidence = d.detection_confidence;
        }
        if !self.tracking_confidence.is_finite() {
            self.tracking_confidence = d.tracking_confidence;
        }
        self.detection_confidence = self.detection_confidence.clamp(0.0, 1.0);
        self.tracking_confidence = self.tracking_confidence.clamp(0.0, 1.0);
        self.max_num_hands = self.max_num_hands.clamp(1, 4);
        if self.camera_width == 0 || self.camera_height == 0 {
            self.camera_width = d.camera_width;
            self.camera_height = d.camera_height;
        }
        self
    }

    pub fn click_cooldown_ms(&self) -> u64 {
        cooldown_ms_from_secs(self.click_cooldown_secs)
    }

    /// Whether `other` differs in anything baked into a detector when it is
    /// built. The click cooldown is not: a live session takes it as-is.
    pub fn requires_rebuild(&self, other: &HubSettings) -> bool {
        self.detection_confidence != other.detection_confidence
            || self.tracking_confidence != other.tracking_confidence
            || self.max_num_hands != other.max_num_hands
            || self.camera_width != other.camera_width
            || self.camera_height != other.camera_height
            || self.show_landmarks != other.show_landmarks
    }

    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw).ok().map(Self::sanitized)
    }

    pub fn load() -> Self {
        util::storage_get(SETTINGS_KEY)
            .and_then(|raw| Self::from_json(&raw))
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Ok(s) = serde_json::to_string(self) {
            util::storage_set(SETTINGS_KEY, &s);
        }
    }
}
