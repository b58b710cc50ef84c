//! Game catalog and hub view state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;
use yew::Reducible;

use crate::gesture::FingerCount;
use crate::util;

pub const PLAY_STATS_KEY: &str = "gh_play_stats";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    /// Shown as a bullet list in the details modal.
    pub instructions: &'static [&'static str],
    /// Short gesture-to-action summary.
    pub controls: &'static str,
    /// Page opened when the game is played, relative to the hub.
    pub page: &'static str,
}

pub const GAMES: &[GameDescriptor] = &[
    GameDescriptor {
        id: "dino",
        name: "Dino T-Rex",
        emoji: "🦕",
        description: "Guide the T-Rex past every obstacle in its way.",
        instructions: &[
            "Make a fist (0 fingers) to jump",
            "Dodge the cacti and the birds",
            "Score by running as long as you can",
        ],
        controls: "Fist = Jump",
        page: "games/dino/index.html",
    },
    GameDescriptor {
        id: "flappy",
        name: "Flappy Bird",
        emoji: "🐦",
        description: "One move is all you get. Fly through the pipes.",
        instructions: &[
            "Raise 1 finger to flap upwards",
            "Do not touch the pipes",
            "Score by passing between pipes",
        ],
        controls: "1 finger = Flap",
        page: "games/flappy-bird/index.html",
    },
    GameDescriptor {
        id: "paddle",
        name: "Paddle Control",
        emoji: "🏓",
        description: "Steer the paddle in a game of pong.",
        instructions: &[
            "Few fingers = move left",
            "Many fingers = move right",
            "Block the ball to score",
        ],
        controls: "Few/many fingers = Left/Right",
        page: "games/paddle/index.html",
    },
    GameDescriptor {
        id: "pacman",
        name: "Pac-Man",
        emoji: "👾",
        description: "Classic Pac-Man with hand controls.",
        instructions: &[
            "Raise your hand to move",
            "Eat every white dot",
            "Stay away from the ghosts",
        ],
        controls: "Hand = Move",
        page: "games/pacman/index.html",
    },
];

pub fn find_game(id: &str) -> Option<&'static GameDescriptor> {
    GAMES.iter().find(|g| g.id == id)
}

/// Per-game counters kept across visits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayStats {
    plays: BTreeMap<String, u32>,
}

impl PlayStats {
    pub fn plays(&self, id: &str) -> u32 {
        self.plays.get(id).copied().unwrap_or(0)
    }

    pub fn record_play(&mut self, id: &str) {
        let n = self.plays.entry(id.to_string()).or_insert(0);
        *n = n.saturating_add(1);
    }

    pub fn load() -> Self {
        util::storage_get(PLAY_STATS_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Ok(s) = serde_json::to_string(self) {
            util::storage_set(PLAY_STATS_KEY, &s);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

impl StatusKind {
    pub fn color(self) -> &'static str {
        match self {
            StatusKind::Info => "#58a6ff",
            StatusKind::Success => "#3fb950",
            StatusKind::Error => "#f85149",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
    pub id: u32,
    pub message: String,
    pub kind: StatusKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HubState {
    /// Game whose details modal is open.
    pub open_game: Option<&'static GameDescriptor>,
    /// Card a gesture click opens when no modal is showing.
    pub focused: usize,
    pub camera_active: bool,
    pub finger_count: FingerCount,
    pub statuses: Vec<StatusMessage>,
    pub next_status_id: u32,
    pub stats: PlayStats,
}

impl Default for HubState {
    fn default() -> Self {
        Self {
            open_game: None,
            focused: 0,
            camera_active: false,
            finger_count: FingerCount::NoHand,
            statuses: Vec::new(),
            next_status_id: 1,
            stats: PlayStats::default(),
        }
    }
}

/// What a fist click should do in the current view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureTarget {
    Ignore,
    Play(&'static str),
    Open(&'static str),
}

impl HubState {
    pub fn with_stats(stats: PlayStats) -> Self {
        Self { stats, ..Default::default() }
    }

    pub fn focused_game(&self) -> &'static GameDescriptor {
        &GAMES[self.focused.min(GAMES.len() - 1)]
    }

    /// Press Play in the open modal, else open the focused card. Nothing
    /// happens while the settings dialog covers the hub.
    pub fn gesture_target(&self, settings_open: bool) -> GestureTarget {
        if settings_open {
            return GestureTarget::Ignore;
        }
        match self.open_game {
            Some(game) => GestureTarget::Play(game.id),
            None => GestureTarget::Open(self.focused_game().id),
        }
    }
}

#[derive(Clone, Debug)]
pub enum HubAction {
    OpenGame(String),
    CloseGame,
    Focus(usize),
    /// Result of trying to open a game page. Only a real window counts as a play.
    Launched { id: &'static str, opened: bool },
    ClearStats,
    SetCameraActive(bool),
    SetFingerCount(FingerCount),
    PushStatus { message: String, kind: StatusKind },
    DismissStatus(u32),
}

impl Reducible for HubState {
    type Action = HubAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use HubAction::*;
        let mut new = (*self).clone();
        match action {
            OpenGame(id) => {
                let Some(game) = find_game(&id) else { return self; };
                new.open_game = Some(game);
                if let Some(i) = GAMES.iter().position(|g| g.id == game.id) {
                    new.focused = i;
                }
            }
            CloseGame => {
                if new.open_game.is_none() { return self; }
                new.open_game = None;
            }
            Focus(i) => {
                if i >= GAMES.len() || i == new.focused { return self; }
                new.focused = i;
            }
            Launched { id, opened } => {
                let Some(game) = find_game(id) else { return self; };
                if opened {
                    new.stats.record_play(game.id);
                    new.open_game = None;
                } else {
                    let sid = new.next_status_id;
                    new.next_status_id = new.next_status_id.wrapping_add(1);
                    new.statuses.push(StatusMessage {
                        id: sid,
                        message: format!("Pop-up blocked. Allow pop-ups and press Play to open {}", game.name),
                        kind: StatusKind::Error,
                    });
                }
            }
            ClearStats => {
                new.stats = PlayStats::default();
            }
            SetCameraActive(active) => {
                new.camera_active = active;
                if !active { new.finger_count = FingerCount::NoHand; }
            }
            SetFingerCount(count) => {
                if count == new.finger_count { return self; }
                new.finger_count = count;
            }
            PushStatus { message, kind } => {
                let id = new.next_status_id;
                new.next_status_id = new.next_status_id.wrapping_add(1);
                new.statuses.push(StatusMessage { id, message, kind });
            }
            DismissStatus(id) => {
                new.statuses.retain(|s| s.id != id);
            }
        }
        Rc::new(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce(state: HubState, action: HubAction) -> HubState {
        (*Rc::new(state).reduce(action)).clone()
    }

    #[test]
    fn catalog_ids_are_unique_and_pages_set() {
        for (i, g) in GAMES.iter().enumerate() {
            assert!(!g.page.is_empty());
            assert!(!g.instructions.is_empty());
            assert!(GAMES[i + 1..].iter().all(|o| o.id != g.id));
        }
        assert_eq!(find_game("flappy").map(|g| g.page), Some("games/flappy-bird/index.html"));
        assert!(find_game("tetris").is_none());
    }

    #[test]
    fn open_and_close_modal() {
        let s = reduce(HubState::default(), HubAction::OpenGame("pacman".into()));
        assert_eq!(s.open_game.map(|g| g.id), Some("pacman"));
        assert_eq!(s.focused_game().id, "pacman");
        let s = reduce(s, HubAction::CloseGame);
        assert!(s.open_game.is_none());
        assert_eq!(s.focused, 3);
    }

    #[test]
    fn unknown_game_is_ignored() {
        let s = reduce(HubState::default(), HubAction::OpenGame("nope".into()));
        assert!(s.open_game.is_none());
    }

    #[test]
    fn stopping_camera_clears_count() {
        let s = reduce(HubState::default(), HubAction::SetCameraActive(true));
        let s = reduce(s, HubAction::SetFingerCount(FingerCount::Fingers(3)));
        assert_eq!(s.finger_count, FingerCount::Fingers(3));
        let s = reduce(s, HubAction::SetCameraActive(false));
        assert_eq!(s.finger_count, FingerCount::NoHand);
    }

    #[test]
    fn statuses_get_distinct_ids_and_dismiss() {
        let push = |s, m: &str| {
            reduce(s, HubAction::PushStatus { message: m.into(), kind: StatusKind::Info })
        };
        let s = push(push(HubState::default(), "a"), "b");
        assert_eq!(s.statuses.len(), 2);
        let first = s.statuses[0].id;
        assert_ne!(first, s.statuses[1].id);
        let s = reduce(s, HubAction::DismissStatus(first));
        assert_eq!(s.statuses.len(), 1);
        assert_eq!(s.statuses[0].message, "b");
    }

    #[test]
    fn opened_game_counts_a_play_and_closes_modal() {
        let s = reduce(HubState::default(), HubAction::OpenGame("dino".into()));
        let s = reduce(s, HubAction::Launched { id: "dino", opened: true });
        assert_eq!(s.stats.plays("dino"), 1);
        assert!(s.open_game.is_none());
        assert!(s.statuses.is_empty());
    }

    #[test]
    fn blocked_popup_keeps_modal_and_reports_error() {
        let s = reduce(HubState::default(), HubAction::OpenGame("flappy".into()));
        let s = reduce(s, HubAction::Launched { id: "flappy", opened: false });
        assert_eq!(s.stats.plays("flappy"), 0);
        assert_eq!(s.open_game.map(|g| g.id), Some("flappy"));
        assert_eq!(s.statuses.len(), 1);
        assert_eq!(s.statuses[0].kind, StatusKind::Error);
        assert!(s.statuses[0].message.contains("Flappy Bird"));
    }

    #[test]
    fn fist_is_ignored_while_settings_are_open() {
        let s = reduce(HubState::default(), HubAction::OpenGame("paddle".into()));
        assert_eq!(s.gesture_target(true), GestureTarget::Ignore);
        assert_eq!(HubState::default().gesture_target(true), GestureTarget::Ignore);
    }

    #[test]
    fn fist_plays_open_modal_or_opens_focused_card() {
        let s = reduce(HubState::default(), HubAction::OpenGame("paddle".into()));
        assert_eq!(s.gesture_target(false), GestureTarget::Play("paddle"));
        let s = reduce(HubState::default(), HubAction::Focus(3));
        assert_eq!(s.gesture_target(false), GestureTarget::Open("pacman"));
    }

    #[test]
    fn play_counts_accumulate_and_serialize_flat() {
        let mut stats = PlayStats::default();
        stats.record_play("dino");
        stats.record_play("dino");
        assert_eq!(stats.plays("dino"), 2);
        assert_eq!(stats.plays("paddle"), 0);
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"dino":2}"#);
        let back: PlayStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
