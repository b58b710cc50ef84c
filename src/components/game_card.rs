use crate::model::GameDescriptor;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct GameCardProps {
    pub game: &'static GameDescriptor,
    pub index: usize,
    pub focused: bool,
    pub on_open: Callback<&'static str>,
    pub on_focus: Callback<usize>,
}

#[function_component(GameCard)]
pub fn game_card(props: &GameCardProps) -> Html {
    let open_cb = {
        let cb = props.on_open.clone();
        let id = props.game.id;
        Callback::from(move |_| cb.emit(id))
    };
    let focus_cb = {
        let cb = props.on_focus.clone();
        let index = props.index;
        Callback::from(move |_| cb.emit(index))
    };
    let border = if props.focused { "#58a6ff" } else { "#30363d" };
    html! {
        <div
            class="game-card"
            onclick={open_cb}
            onmouseenter={focus_cb}
            style={format!("background:#161b22; border:2px solid {}; border-radius:12px; cursor:pointer; overflow:hidden; display:flex; flex-direction:column;", border)}
        >
            <div style="font-size:64px; text-align:center; padding:24px 0; background:#0e1116;">{ props.game.emoji }</div>
            <div style="padding:12px 16px; display:flex; flex-direction:column; gap:8px; flex:1;">
                <h3 style="margin:0; font-size:18px;">{ props.game.name }</h3>
                <p style="margin:0; font-size:13px; opacity:0.8; flex:1;">{ props.game.description }</p>
                <button>{"Play now"}</button>
            </div>
        </div>
    }
}
