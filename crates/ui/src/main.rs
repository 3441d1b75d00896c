mod app;
mod bridge;
mod player;
mod widgets;

use app::AppState;
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    init_tracing();

    iced::application("Slot Editor", AppState::update, AppState::view)
        .subscription(AppState::subscription)
        .run_with(AppState::boot)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
