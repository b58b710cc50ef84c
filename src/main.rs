mod components;
mod config;
mod detector;
mod gesture;
mod model;
mod util;

use log::LevelFilter;

fn main() {
    util::init_logging(if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    yew::Renderer::<components::app::App>::new().render();
}
