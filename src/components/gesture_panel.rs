use crate::gesture::FingerCount;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct GesturePanelProps {
    pub active: bool,
    pub finger_count: FingerCount,
    pub video_ref: NodeRef,
    pub canvas_ref: NodeRef,
    pub width: u32,
    pub height: u32,
    pub on_start: Callback<()>,
    pub on_stop: Callback<()>,
}

#[function_component(GesturePanel)]
pub fn gesture_panel(props: &GesturePanelProps) -> Html {
    let toggle_cb = {
        let start = props.on_start.clone();
        let stop = props.on_stop.clone();
        let active = props.active;
        Callback::from(move |_| if active { stop.emit(()) } else { start.emit(()) })
    };
    let count_color = match props.finger_count {
        FingerCount::NoHand => "#8b949e",
        FingerCount::Fingers(0) => "#f85149",
        FingerCount::Fingers(_) => "#3fb950",
    };
    // The canvas keeps its slot while idle so the detector can bind to it.
    let canvas_style = if props.active {
        "width:240px; height:180px; border-radius:6px; background:#0e1116; transform:scaleX(-1);"
    } else {
        "width:240px; height:0; visibility:hidden;"
    };
    html! {
        <div style="position:fixed; right:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px; display:flex; flex-direction:column; gap:8px; z-index:40;">
            <div style="display:flex; align-items:center; gap:8px;">
                <span style="font-weight:600;">{"✋ Gesture click"}</span>
                <button onclick={toggle_cb} style="margin-left:auto;">
                    { if props.active { "Stop camera" } else { "Start camera" } }
                </button>
            </div>
            <video ref={props.video_ref.clone()} style="display:none;"></video>
            <canvas
                ref={props.canvas_ref.clone()}
                width={props.width.to_string()}
                height={props.height.to_string()}
                style={canvas_style}
            ></canvas>
            if props.active {
                <>
                <div style={format!("font-variant-numeric:tabular-nums; color:{};", count_color)}>
                    { props.finger_count.label() }
                </div>
                <div style="font-size:11px; opacity:0.6;">{"Make a fist to click."}</div>
                </>
            }
        </div>
    }
}
