use keeper_config::constants;
use tokio::sync::mpsc;

pub struct Channels {
    pub build_tx: mpsc::Sender<i32>,
    pub build_rx: mpsc::Receiver<i32>,
}

pub fn create_channels() -> Channels {
    let (build_tx, build_rx) = mpsc::channel(constants::BUILD_CHANNEL_CAPACITY);

    Channels { build_tx, build_rx }
}
