//! Camera + MediaPipe Hands session.
//!
//! The landmark model and the camera pump live in JS (`window.Hands`,
//! `window.Camera`, loaded by index.html). This module owns their lifecycle,
//! turns each result into a landmark slice and hands it to the gesture tracker.

use std::rc::Rc;

use log::{error, info, warn};
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement};

use crate::config::HubSettings;
use crate::gesture::{GestureTracker, GestureUpdate, Landmark};

const HANDS_CDN: &str = "https://cdn.jsdelivr.net/npm/@mediapipe/hands";

/// Bone pairs of the 21-point hand model, for the overlay.
#[rustfmt::skip]
pub const HAND_CONNECTIONS: [(usize, usize); 23] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (0, 9), (9, 10), (10, 11), (11, 12),
    (0, 13), (13, 14), (14, 15), (15, 16),
    (0, 17), (17, 18), (18, 19), (19, 20),
    (5, 9), (9, 13), (13, 17),
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectorError {
    #[error("hand tracking library is not loaded ({0} missing)")]
    LibraryUnavailable(&'static str),
    #[error("failed to initialise hand detector: {0}")]
    Init(String),
    #[error("failed to start camera: {0}")]
    CameraStart(String),
}

fn js_error_text(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", err))
}

/// Something that can pump camera frames into the detector.
pub trait CameraBackend {
    fn start(&mut self) -> Result<(), DetectorError>;
    fn stop(&mut self);
}

/// Start/stop bookkeeping plus the per-session gesture state.
pub struct DetectorSession<B: CameraBackend> {
    backend: B,
    active: bool,
    tracker: GestureTracker,
    /// Settings the backend was built with.
    settings: HubSettings,
}

impl<B: CameraBackend> DetectorSession<B> {
    pub fn new(backend: B, settings: &HubSettings) -> Self {
        Self {
            backend,
            active: false,
            tracker: GestureTracker::new(settings.click_cooldown_ms()),
            settings: settings.clone(),
        }
    }

    /// No-op returning `Ok` when already running.
    pub fn start(&mut self) -> Result<(), DetectorError> {
        if self.active {
            return Ok(());
        }
        self.backend.start()?;
        self.active = true;
        info!("hand detection started");
        Ok(())
    }

    /// No-op when not running.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.backend.stop();
        self.active = false;
        self.tracker.reset();
        info!("hand detection stopped");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &GestureTracker {
        &self.tracker
    }

    /// Idle and built with options that `current` no longer matches.
    pub fn is_stale(&self, current: &HubSettings) -> bool {
        !self.active && self.settings.requires_rebuild(current)
    }

    pub fn set_click_cooldown(&mut self, settings: &HubSettings) {
        self.tracker.set_cooldown_ms(settings.click_cooldown_ms());
        self.settings.click_cooldown_secs = settings.click_cooldown_secs;
    }

    /// Frames arriving after `stop` (in-flight inference) are dropped.
    pub fn on_frame(&mut self, hand: &[Landmark], now_ms: u64) -> GestureUpdate {
        if !self.active {
            return GestureUpdate::default();
        }
        self.tracker.observe(hand, now_ms)
    }
}

/// First hand of a serialized `multiHandLandmarks` array; empty when the
/// value is absent, empty or malformed.
pub fn first_hand(raw: &str) -> Vec<Landmark> {
    match serde_json::from_str::<Option<Vec<Vec<Landmark>>>>(raw) {
        Ok(Some(hands)) => hands.into_iter().next().unwrap_or_default(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("unreadable landmark payload: {}", e);
            Vec::new()
        }
    }
}

#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    type Hands;

    #[wasm_bindgen(constructor, catch, js_class = "Hands")]
    fn new(config: &JsValue) -> Result<Hands, JsValue>;
    #[wasm_bindgen(method, js_name = setOptions)]
    fn set_options(this: &Hands, options: &JsValue);
    #[wasm_bindgen(method, js_name = onResults)]
    fn on_results(this: &Hands, callback: &js_sys::Function);
    #[wasm_bindgen(method)]
    fn send(this: &Hands, input: &JsValue) -> js_sys::Promise;
    #[wasm_bindgen(method)]
    fn close(this: &Hands);

    type Camera;

    #[wasm_bindgen(constructor, catch, js_class = "Camera")]
    fn new(video: &HtmlVideoElement, options: &JsValue) -> Result<Camera, JsValue>;
    #[wasm_bindgen(method)]
    fn start(this: &Camera) -> js_sys::Promise;
    #[wasm_bindgen(method)]
    fn stop(this: &Camera);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HandsOptions {
    max_num_hands: u32,
    model_complexity: u8,
    min_detection_confidence: f64,
    min_tracking_confidence: f64,
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, DetectorError> {
    let raw = serde_json::to_string(value).map_err(|e| DetectorError::Init(e.to_string()))?;
    js_sys::JSON::parse(&raw).map_err(|e| DetectorError::Init(js_error_text(&e)))
}

fn set_prop(target: &JsValue, key: &str, value: &JsValue) -> Result<(), DetectorError> {
    js_sys::Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| DetectorError::Init(js_error_text(&e)))
}

fn require_global(name: &'static str) -> Result<(), DetectorError> {
    let present = js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str(name)).unwrap_or(false);
    if present { Ok(()) } else { Err(DetectorError::LibraryUnavailable(name)) }
}

/// MediaPipe-backed camera. Frames are delivered to `on_hand` with the
/// first detected hand (or an empty slice) after the overlay is drawn.
pub struct MediaPipeBackend {
    hands: Hands,
    camera: Camera,
    _locate_file: Closure<dyn Fn(String) -> String>,
    _on_results: Closure<dyn FnMut(JsValue)>,
    _on_frame: Closure<dyn FnMut() -> js_sys::Promise>,
    on_start_error: Closure<dyn FnMut(JsValue)>,
}

impl MediaPipeBackend {
    pub fn new(
        video: HtmlVideoElement,
        canvas: HtmlCanvasElement,
        settings: &HubSettings,
        on_hand: Rc<dyn Fn(&[Landmark])>,
        on_camera_error: Rc<dyn Fn(DetectorError)>,
    ) -> Result<Self, DetectorError> {
        require_global("Hands")?;
        require_global("Camera")?;

        let locate_file = Closure::wrap(
            Box::new(|file: String| format!("{}/{}", HANDS_CDN, file)) as Box<dyn Fn(String) -> String>
        );
        let config = JsValue::from(js_sys::Object::new());
        set_prop(&config, "locateFile", locate_file.as_ref())?;
        let hands = Hands::new(&config).map_err(|e| DetectorError::Init(js_error_text(&e)))?;
        hands.set_options(&to_js(&HandsOptions {
            max_num_hands: settings.max_num_hands,
            model_complexity: 1,
            min_detection_confidence: settings.detection_confidence,
            min_tracking_confidence: settings.tracking_confidence,
        })?);

        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| DetectorError::Init("canvas has no 2d context".into()))?;
        let show_landmarks = settings.show_landmarks;
        let on_results = {
            let video = video.clone();
            Closure::wrap(Box::new(move |results: JsValue| {
                let raw = js_sys::Reflect::get(&results, &JsValue::from_str("multiHandLandmarks"))
                    .ok()
                    .and_then(|v| js_sys::JSON::stringify(&v).ok())
                    .and_then(|s| s.as_string())
                    .unwrap_or_default();
                let hand = if raw.is_empty() { Vec::new() } else { first_hand(&raw) };
                draw_frame(&ctx, &canvas, &video, &hand, show_landmarks);
                on_hand(&hand);
            }) as Box<dyn FnMut(JsValue)>)
        };
        hands.on_results(on_results.as_ref().unchecked_ref());

        let on_frame = {
            let hands = hands.clone();
            let video = video.clone();
            Closure::wrap(Box::new(move || {
                let input = JsValue::from(js_sys::Object::new());
                let _ = js_sys::Reflect::set(&input, &JsValue::from_str("image"), &video);
                hands.send(&input)
            }) as Box<dyn FnMut() -> js_sys::Promise>)
        };
        let cam_opts = JsValue::from(js_sys::Object::new());
        set_prop(&cam_opts, "onFrame", on_frame.as_ref())?;
        set_prop(&cam_opts, "width", &JsValue::from(settings.camera_width))?;
        set_prop(&cam_opts, "height", &JsValue::from(settings.camera_height))?;
        let camera = Camera::new(&video, &cam_opts).map_err(|e| DetectorError::Init(js_error_text(&e)))?;

        let on_start_error = {
            let report = on_camera_error;
            Closure::wrap(Box::new(move |e: JsValue| {
                let err = DetectorError::CameraStart(js_error_text(&e));
                error!("{}", err);
                report(err);
            }) as Box<dyn FnMut(JsValue)>)
        };

        Ok(Self {
            hands,
            camera,
            _locate_file: locate_file,
            _on_results: on_results,
            _on_frame: on_frame,
            on_start_error,
        })
    }
}

impl CameraBackend for MediaPipeBackend {
    fn start(&mut self) -> Result<(), DetectorError> {
        // Permission prompts and device errors arrive through the rejection.
        let _ = self.camera.start().catch(&self.on_start_error);
        Ok(())
    }

    fn stop(&mut self) {
        self.camera.stop();
    }
}

impl Drop for MediaPipeBackend {
    fn drop(&mut self) {
        self.camera.stop();
        self.hands.close();
    }
}

fn draw_frame(
    ctx: &CanvasRenderingContext2d,
    canvas: &HtmlCanvasElement,
    video: &HtmlVideoElement,
    hand: &[Landmark],
    show_landmarks: bool,
) {
    if !canvas.is_connected() {
        return;
    }
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    ctx.clear_rect(0.0, 0.0, w, h);
    if video.video_width() > 0 {
        let _ = ctx.draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, w, h);
    }
    if !show_landmarks || hand.len() < crate::gesture::LANDMARK_COUNT {
        return;
    }
    ctx.set_stroke_style_str("#00FF00");
    ctx.set_line_width(2.0);
    for (a, b) in HAND_CONNECTIONS {
        ctx.begin_path();
        ctx.move_to(hand[a].x * w, hand[a].y * h);
        ctx.line_to(hand[b].x * w, hand[b].y * h);
        ctx.stroke();
    }
    ctx.set_fill_style_str("#FF0000");
    for p in hand {
        ctx.begin_path();
        let _ = ctx.arc(p.x * w, p.y * h, 4.0, 0.0, std::f64::consts::TAU);
        ctx.fill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::tests::{fist, open_hand};
    use crate::gesture::FingerCount;

    #[derive(Default)]
    struct FakeCamera {
        starts: u32,
        stops: u32,
        fail: bool,
    }

    impl CameraBackend for FakeCamera {
        fn start(&mut self) -> Result<(), DetectorError> {
            if self.fail {
                return Err(DetectorError::CameraStart("NotAllowedError".into()));
            }
            self.starts += 1;
            Ok(())
        }
        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    #[test]
    fn start_twice_starts_camera_once() {
        let mut s = DetectorSession::new(FakeCamera::default(), &HubSettings::default());
        assert!(s.start().is_ok());
        assert!(s.start().is_ok());
        assert!(s.is_active());
        assert_eq!(s.backend.starts, 1);
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let mut s = DetectorSession::new(FakeCamera::default(), &HubSettings::default());
        s.stop();
        assert_eq!(s.backend.stops, 0);
        s.start().unwrap();
        s.stop();
        s.stop();
        assert_eq!(s.backend.stops, 1);
        assert!(!s.is_active());
    }

    #[test]
    fn failed_start_leaves_session_idle() {
        let mut s = DetectorSession::new(FakeCamera { fail: true, ..Default::default() }, &HubSettings::default());
        assert!(matches!(s.start(), Err(DetectorError::CameraStart(_))));
        assert!(!s.is_active());
    }

    #[test]
    fn frames_only_count_while_active() {
        let mut s = DetectorSession::new(FakeCamera::default(), &HubSettings::default());
        assert_eq!(s.on_frame(&fist(), 0), GestureUpdate::default());
        s.start().unwrap();
        let u = s.on_frame(&open_hand(), 1_000);
        assert_eq!(u.changed, Some(FingerCount::Fingers(5)));
        s.stop();
        assert_eq!(s.tracker().finger_count(), FingerCount::NoHand);
    }

    #[test]
    fn session_goes_stale_only_once_stopped() {
        let built = HubSettings::default();
        let edited = HubSettings { show_landmarks: false, ..built.clone() };
        let mut s = DetectorSession::new(FakeCamera::default(), &built);
        s.start().unwrap();
        assert!(!s.is_stale(&edited));
        s.stop();
        assert!(s.is_stale(&edited));
        assert!(!s.is_stale(&built));
    }

    #[test]
    fn cooldown_change_applies_to_live_session() {
        let mut s = DetectorSession::new(FakeCamera::default(), &HubSettings::default());
        s.start().unwrap();
        assert!(s.on_frame(&fist(), 10_000).click);
        let slower = HubSettings { click_cooldown_secs: 1.0, ..HubSettings::default() };
        s.set_click_cooldown(&slower);
        assert!(!s.on_frame(&fist(), 10_500).click);
        assert!(s.on_frame(&fist(), 11_000).click);
        s.stop();
        assert!(!s.is_stale(&slower));
    }

    #[test]
    fn frame_pump_can_hold_its_own_hands_handle() {
        // The camera's onFrame closure keeps a clone of the detector handle.
        fn assert_clone<T: Clone>() {}
        assert_clone::<Hands>();
    }

    #[test]
    fn first_hand_reads_detector_payload() {
        let raw = r#"[[{"x":0.1,"y":0.2,"z":-0.01},{"x":0.3,"y":0.4,"z":0.0}],[{"x":0.9,"y":0.9,"z":0.0}]]"#;
        let hand = first_hand(raw);
        assert_eq!(hand, vec![Landmark::new(0.1, 0.2), Landmark::new(0.3, 0.4)]);
    }

    #[test]
    fn first_hand_tolerates_missing_and_bad_input() {
        assert!(first_hand("null").is_empty());
        assert!(first_hand("[]").is_empty());
        assert!(first_hand("{\"oops\":1}").is_empty());
    }
}
