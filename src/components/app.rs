use std::rc::Rc;

use log::{error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlVideoElement};
use yew::prelude::*;

use super::{
    game_card::GameCard, game_modal::GameModal, gesture_panel::GesturePanel,
    settings_modal::SettingsModal, status_toasts::StatusToasts,
};
use crate::config::{HubSettings, SETTINGS_KEY};
use crate::detector::{DetectorError, DetectorSession, MediaPipeBackend};
use crate::gesture::Landmark;
use crate::model::{
    find_game, GestureTarget, HubAction, HubState, PlayStats, StatusKind, GAMES, PLAY_STATS_KEY,
};
use crate::util;

fn status(hub: &UseReducerHandle<HubState>, message: impl Into<String>, kind: StatusKind) {
    hub.dispatch(HubAction::PushStatus { message: message.into(), kind });
}

#[function_component(App)]
pub fn app() -> Html {
    let settings = use_state(HubSettings::load);
    let hub = use_reducer(|| HubState::with_stats(PlayStats::load()));
    let show_settings = use_state(|| false);
    let video_ref = use_node_ref();
    let canvas_ref = use_node_ref();
    let session = use_mut_ref(|| None::<DetectorSession<MediaPipeBackend>>);
    // Latest reducer handle for callbacks created once (camera frames, keydown).
    let hub_ref = use_mut_ref(|| hub.clone());
    *hub_ref.borrow_mut() = hub.clone();
    let settings_open = use_mut_ref(|| false);
    *settings_open.borrow_mut() = *show_settings;

    // Persist play counts
    {
        let stats = hub.stats.clone();
        use_effect_with(stats, move |stats| {
            stats.save();
            || ()
        });
    }

    // Escape closes the modal; the camera is released on unmount.
    {
        let hub_ref = hub_ref.clone();
        let session = session.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window();
            let keydown_cb = Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
                if e.key() == "Escape" {
                    let hub = hub_ref.borrow().clone();
                    hub.dispatch(HubAction::CloseGame);
                }
            }) as Box<dyn FnMut(_)>);
            if let Some(w) = &window {
                let _ = w.add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref());
            }
            move || {
                if let Some(w) = &window {
                    let _ = w.remove_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref());
                }
                session.borrow_mut().take();
            }
        });
    }

    let stop_camera = {
        let hub = hub.clone();
        let session = session.clone();
        Callback::from(move |_: ()| {
            if let Ok(mut slot) = session.try_borrow_mut() {
                if let Some(s) = slot.as_mut() {
                    s.stop();
                }
            }
            hub.dispatch(HubAction::SetCameraActive(false));
        })
    };

    let play = {
        let hub = hub.clone();
        let stop_camera = stop_camera.clone();
        Callback::from(move |id: &'static str| {
            let Some(game) = find_game(id) else { return; };
            stop_camera.emit(());
            info!("opening {} at {}", game.id, game.page);
            // A blocked pop-up comes back as Ok(None).
            let opened = web_sys::window()
                .map(|w| matches!(w.open_with_url_and_target(game.page, "_blank"), Ok(Some(_))))
                .unwrap_or(false);
            if !opened {
                warn!("could not open {}", game.page);
            }
            hub.dispatch(HubAction::Launched { id: game.id, opened });
        })
    };

    let on_gesture_click = {
        let hub_ref = hub_ref.clone();
        let settings_open = settings_open.clone();
        let play = play.clone();
        Callback::from(move |_: ()| {
            let hub = hub_ref.borrow().clone();
            match hub.gesture_target(*settings_open.borrow()) {
                GestureTarget::Ignore => {}
                GestureTarget::Play(id) => play.emit(id),
                GestureTarget::Open(id) => hub.dispatch(HubAction::OpenGame(id.to_string())),
            }
        })
    };

    let start_camera = {
        let hub = hub.clone();
        let session = session.clone();
        let settings = settings.clone();
        let video_ref = video_ref.clone();
        let canvas_ref = canvas_ref.clone();
        let stop_camera = stop_camera.clone();
        Callback::from(move |_: ()| {
            let mut slot = session.borrow_mut();
            if slot.as_ref().is_some_and(|s| s.is_stale(&settings)) {
                info!("rebuilding hand detector with new settings");
                *slot = None;
            }
            if slot.is_none() {
                let (Some(video), Some(canvas)) = (
                    video_ref.cast::<HtmlVideoElement>(),
                    canvas_ref.cast::<HtmlCanvasElement>(),
                ) else {
                    return;
                };
                let on_hand: Rc<dyn Fn(&[Landmark])> = {
                    let session = session.clone();
                    let hub = hub.clone();
                    let click = on_gesture_click.clone();
                    Rc::new(move |hand: &[Landmark]| {
                        let update = match session.try_borrow_mut() {
                            Ok(mut slot) => match slot.as_mut() {
                                Some(s) => s.on_frame(hand, util::now_ms()),
                                None => return,
                            },
                            Err(_) => return,
                        };
                        if let Some(count) = update.changed {
                            hub.dispatch(HubAction::SetFingerCount(count));
                        }
                        if update.click {
                            info!("fist click");
                            click.emit(());
                        }
                    })
                };
                let on_camera_error: Rc<dyn Fn(DetectorError)> = {
                    let hub = hub.clone();
                    let stop_camera = stop_camera.clone();
                    Rc::new(move |err: DetectorError| {
                        stop_camera.emit(());
                        status(&hub, err.to_string(), StatusKind::Error);
                    })
                };
                match MediaPipeBackend::new(video, canvas, &settings, on_hand, on_camera_error) {
                    Ok(backend) => {
                        *slot = Some(DetectorSession::new(backend, &settings));
                    }
                    Err(e) => {
                        drop(slot);
                        error!("{}", e);
                        status(&hub, e.to_string(), StatusKind::Error);
                        return;
                    }
                }
            }
            let Some(s) = slot.as_mut() else { return; };
            let was_active = s.is_active();
            let started = s.start();
            drop(slot);
            match started {
                Ok(()) => {
                    hub.dispatch(HubAction::SetCameraActive(true));
                    if !was_active {
                        status(&hub, "Camera on. Make a fist to click.", StatusKind::Success);
                    }
                }
                Err(e) => {
                    error!("{}", e);
                    status(&hub, e.to_string(), StatusKind::Error);
                }
            }
        })
    };

    let open_game = {
        let hub = hub.clone();
        Callback::from(move |id: &'static str| hub.dispatch(HubAction::OpenGame(id.to_string())))
    };
    let focus_game = {
        let hub = hub.clone();
        Callback::from(move |i: usize| hub.dispatch(HubAction::Focus(i)))
    };
    let close_game = {
        let hub = hub.clone();
        Callback::from(move |_| hub.dispatch(HubAction::CloseGame))
    };
    let dismiss_status = {
        let hub = hub.clone();
        Callback::from(move |id: u32| hub.dispatch(HubAction::DismissStatus(id)))
    };
    let open_settings = {
        let show_settings = show_settings.clone();
        Callback::from(move |_| show_settings.set(true))
    };
    let close_settings = {
        let show_settings = show_settings.clone();
        Callback::from(move |_| show_settings.set(false))
    };
    let save_settings = {
        let settings = settings.clone();
        let session = session.clone();
        let show_settings = show_settings.clone();
        let hub = hub.clone();
        Callback::from(move |next: HubSettings| {
            let next = next.sanitized();
            next.save();
            // Other options reach the detector when it next starts.
            if let Ok(mut slot) = session.try_borrow_mut() {
                if let Some(s) = slot.as_mut() {
                    s.set_click_cooldown(&next);
                }
            }
            settings.set(next);
            show_settings.set(false);
            status(&hub, "Settings saved", StatusKind::Info);
        })
    };
    let hard_reset = {
        let settings = settings.clone();
        let show_settings = show_settings.clone();
        let hub = hub.clone();
        let stop_camera = stop_camera.clone();
        let session = session.clone();
        Callback::from(move |_| {
            stop_camera.emit(());
            if let Ok(mut slot) = session.try_borrow_mut() {
                *slot = None;
            }
            util::storage_remove(SETTINGS_KEY);
            util::storage_remove(PLAY_STATS_KEY);
            settings.set(HubSettings::default());
            hub.dispatch(HubAction::ClearStats);
            show_settings.set(false);
            info!("hub reset to defaults");
        })
    };

    let plays = hub.open_game.map(|g| hub.stats.plays(g.id)).unwrap_or(0);

    html! {
        <div id="root" style="min-height:100vh; background:#0e1116; color:#c9d1d9; font-family:sans-serif;">
            <div id="top-bar" style="display:flex; align-items:center; gap:12px; padding:12px 20px; border-bottom:1px solid #30363d;">
                <h1 style="margin:0; font-size:22px; color:#58a6ff;">{"🎮 Game Hub"}</h1>
                <span style="opacity:0.7; font-size:13px;">{"Play with your hands"}</span>
                <button onclick={open_settings} style="margin-left:auto;">{"Settings"}</button>
            </div>
            <div id="game-grid" style="display:grid; grid-template-columns:repeat(auto-fill, minmax(220px, 1fr)); gap:16px; padding:20px;">
                { for GAMES.iter().enumerate().map(|(i, g)| html! {
                    <GameCard
                        key={g.id}
                        game={g}
                        index={i}
                        focused={hub.camera_active && hub.focused == i}
                        on_open={open_game.clone()}
                        on_focus={focus_game.clone()}
                    />
                }) }
            </div>
            <GameModal game={hub.open_game} plays={plays} on_close={close_game} on_play={play} />
            <GesturePanel
                active={hub.camera_active}
                finger_count={hub.finger_count}
                video_ref={video_ref}
                canvas_ref={canvas_ref}
                width={settings.camera_width}
                height={settings.camera_height}
                on_start={start_camera}
                on_stop={stop_camera}
            />
            <SettingsModal
                show={*show_settings}
                settings={(*settings).clone()}
                on_close={close_settings}
                on_save={save_settings}
                on_hard_reset={hard_reset}
            />
            <StatusToasts statuses={hub.statuses.clone()} on_dismiss={dismiss_status} />
        </div>
    }
}
