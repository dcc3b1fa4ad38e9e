use super::Config;

/// Config written on first launch.
pub fn defaults() -> Config {
    let mut cfg = Config::default();
    cfg.player.show_video_panel = true;
    cfg
}
