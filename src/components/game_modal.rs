use crate::model::GameDescriptor;
use crate::util::format_time;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct GameModalProps {
    pub game: Option<&'static GameDescriptor>,
    pub plays: u32,
    pub on_close: Callback<()>,
    pub on_play: Callback<&'static str>,
}

#[function_component(GameModal)]
pub fn game_modal(props: &GameModalProps) -> Html {
    let Some(game) = props.game else {
        return html! {};
    };

    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    // Only a click on the backdrop itself closes; the panel swallows its own.
    let backdrop_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            if e.target() == e.current_target() {
                cb.emit(());
            }
        })
    };
    let play_cb = {
        let cb = props.on_play.clone();
        let id = game.id;
        Callback::from(move |_| cb.emit(id))
    };

    let stat = |value: String, label: &'static str| {
        html! {
            <div style="flex:1; background:#0e1116; border:1px solid #30363d; border-radius:8px; padding:8px; text-align:center;">
                <div style="font-size:20px; font-weight:600; font-variant-numeric:tabular-nums;">{ value }</div>
                <div style="font-size:11px; opacity:0.7;">{ label }</div>
            </div>
        }
    };

    html! {
        <div id="game-modal" onclick={backdrop_cb} style="position:fixed; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,0,0,0.55); z-index:50;">
            <div style="background:#161b22; border:1px solid #30363d; border-radius:12px; padding:16px 20px; min-width:340px; max-width:520px; display:flex; flex-direction:column; gap:14px;">
                <div style="display:flex; justify-content:space-between; align-items:center;">
                    <h2 style="margin:0; font-size:20px;">{ format!("{} {}", game.emoji, game.name) }</h2>
                    <button onclick={close_cb} style="padding:4px 8px;">{"×"}</button>
                </div>
                <p style="margin:0;">{ game.description }</p>
                <div>
                    <h3 style="margin:0 0 6px 0; font-size:15px;">{"📋 How to play"}</h3>
                    <ul style="margin:0 0 0 18px; padding:0; display:flex; flex-direction:column; gap:4px;">
                        { for game.instructions.iter().map(|line| html! { <li>{ *line }</li> }) }
                    </ul>
                </div>
                <div>
                    <h3 style="margin:0 0 6px 0; font-size:15px;">{"🎮 Controls"}</h3>
                    <p style="margin:0;"><strong>{ game.controls }</strong></p>
                </div>
                <div style="display:flex; gap:8px;">
                    { stat("0".to_string(), "Best score") }
                    { stat(props.plays.to_string(), "Plays") }
                    { stat(format_time(0), "Time") }
                </div>
                <button class="play-game-btn" onclick={play_cb} style="margin-top:6px; padding:8px 12px; font-size:15px;">{"🎮 Play game"}</button>
            </div>
        </div>
    }
}
