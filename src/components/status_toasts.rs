use crate::model::StatusMessage;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use yew::prelude::*;

const TOAST_LIFETIME_MS: i32 = 5000;

#[derive(Properties, PartialEq, Clone)]
pub struct StatusToastsProps {
    pub statuses: Vec<StatusMessage>,
    pub on_dismiss: Callback<u32>,
}

#[function_component(StatusToasts)]
pub fn status_toasts(props: &StatusToastsProps) -> Html {
    if props.statuses.is_empty() {
        return html! {};
    }
    html! {
        <div id="status-message" style="position:fixed; top:20px; right:20px; z-index:999; display:flex; flex-direction:column; gap:6px;">
            { for props.statuses.iter().map(|s| html! {
                <Toast key={s.id} status={s.clone()} on_dismiss={props.on_dismiss.clone()} />
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq, Clone)]
struct ToastProps {
    status: StatusMessage,
    on_dismiss: Callback<u32>,
}

#[function_component(Toast)]
fn toast(props: &ToastProps) -> Html {
    {
        let id = props.status.id;
        let cb = props.on_dismiss.clone();
        use_effect_with(id, move |_| {
            let window = web_sys::window();
            let expire = Closure::once(move || cb.emit(id));
            let handle = window.as_ref().and_then(|w| {
                w.set_timeout_with_callback_and_timeout_and_arguments_0(
                    expire.as_ref().unchecked_ref(),
                    TOAST_LIFETIME_MS,
                )
                .ok()
            });
            move || {
                if let (Some(w), Some(h)) = (window, handle) {
                    w.clear_timeout_with_handle(h);
                }
                drop(expire);
            }
        });
    }
    let dismiss_cb = {
        let cb = props.on_dismiss.clone();
        let id = props.status.id;
        Callback::from(move |_| cb.emit(id))
    };
    html! {
        <div onclick={dismiss_cb} style={format!("background:rgba(22,27,34,0.95); border:1px solid {}; color:{}; border-radius:8px; padding:8px 12px; min-width:220px; max-width:360px; font-size:13px; cursor:pointer;", props.status.kind.color(), props.status.kind.color())}>
            { props.status.message.clone() }
        </div>
    }
}
