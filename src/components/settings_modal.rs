use crate::config::HubSettings;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct SettingsModalProps {
    pub show: bool,
    pub settings: HubSettings,
    pub on_close: Callback<()>,
    pub on_save: Callback<HubSettings>,
    pub on_hard_reset: Callback<()>,
}

#[function_component]
pub fn SettingsModal(props: &SettingsModalProps) -> Html {
    let draft = use_state(|| props.settings.clone());
    // Re-seed the draft each time the modal opens.
    {
        let draft = draft.clone();
        let settings = props.settings.clone();
        use_effect_with(props.show, move |show| {
            if *show {
                draft.set(settings);
            }
            || ()
        });
    }

    if !props.show {
        return html! {};
    }

    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let cooldown_cb = {
        let draft = draft.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(v) = input.value().trim().parse::<f64>() {
                draft.set(HubSettings { click_cooldown_secs: v, ..(*draft).clone() }.sanitized());
            }
        })
    };
    let toggle_landmarks_cb = {
        let draft = draft.clone();
        Callback::from(move |_| {
            draft.set(HubSettings { show_landmarks: !draft.show_landmarks, ..(*draft).clone() });
        })
    };
    let save_cb = {
        let cb = props.on_save.clone();
        let draft = draft.clone();
        Callback::from(move |_| cb.emit((*draft).clone()))
    };
    let hard_reset_cb = {
        let cb = props.on_hard_reset.clone();
        Callback::from(move |_| {
            if let Some(win) = web_sys::window() {
                if win
                    .confirm_with_message("This will wipe settings and play counts. Are you sure?")
                    .unwrap_or(false)
                {
                    cb.emit(());
                }
            } else {
                cb.emit(());
            }
        })
    };

    html! {<div style="position:fixed; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,0,0,0.55); z-index:60;">
        <div style="background:#161b22; border:1px solid #30363d; border-radius:12px; padding:16px 20px; min-width:340px; max-width:480px; display:flex; flex-direction:column; gap:14px;">
            <div style="display:flex; justify-content:space-between; align-items:center;">
                <h3 style="margin:0; font-size:18px;">{"Settings"}</h3>
                <button onclick={close_cb.clone()} style="padding:4px 8px;">{"Close"}</button>
            </div>
            <div style="display:flex; flex-direction:column; gap:10px;">
                <label style="display:flex; align-items:center; gap:8px;">
                    <span style="flex:1;">{"Fist click cooldown (seconds)"}</span>
                    <input type="number" step="0.1" min="0" max="10" style="width:80px;"
                        value={draft.click_cooldown_secs.to_string()} onchange={cooldown_cb} />
                </label>
                <label style="display:flex; align-items:center; gap:8px; cursor:pointer;">
                    <input type="checkbox" checked={draft.show_landmarks} onclick={toggle_landmarks_cb} />
                    <span>{"Draw hand landmarks"}</span>
                </label>
            </div>
            <div style="display:flex; gap:8px; flex-wrap:wrap;">
                <button onclick={hard_reset_cb} style="background:#f85149; border:1px solid #b62324; color:#fff; flex:1;">{"Reset everything"}</button>
                <button onclick={save_cb} style="flex:0 0 auto;">{"Save"}</button>
            </div>
            <div style="font-size:11px; line-height:1.4; opacity:0.7;">{"Landmark drawing applies the next time the camera starts."}</div>
        </div>
    </div>}
}
