use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod defaults;
pub mod store;

pub use store::ConfigStore;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub lyrics: LyricsConfig,
    pub volume: VolumeOptions,
    pub volume_tuning: VolumeTuning,
    pub player: PlayerConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LyricsConfig {
    /// Providers in the order they are tried ("kkbox", "genius").
    pub sources: Vec<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

/// Options owned by the precise-volume plugin.
///
/// The bridge speaks the shell's camelCase keys, the config file uses snake_case;
/// both spellings are accepted on input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolumeOptions {
    /// Last volume the user settled on (0-100).
    #[serde(alias = "savedVolume", skip_serializing_if = "Option::is_none")]
    pub saved_volume: Option<u8>,
    /// Volume change per wheel tick / arrow press.
    pub steps: u8,
    /// Local ArrowUp/ArrowDown shortcuts.
    #[serde(alias = "arrowsShortcut")]
    pub arrows_shortcut: bool,
    /// Reposition the HUD when the playing source switches between song and video.
    /// Turn off when another plugin already manages the HUD position.
    #[serde(alias = "hudFollowsVideo")]
    pub hud_follows_video: bool,
}

impl VolumeOptions {
    /// Effective step size; a zero step would make every input a no-op.
    pub fn step(&self) -> u8 {
        self.steps.max(1)
    }

    pub fn merge(&mut self, patch: VolumeOptionsPatch) {
        if let Some(v) = patch.saved_volume {
            self.saved_volume = Some(v.min(100));
        }
        if let Some(s) = patch.steps {
            self.steps = s;
        }
        if let Some(a) = patch.arrows_shortcut {
            self.arrows_shortcut = a;
        }
        if let Some(h) = patch.hud_follows_video {
            self.hud_follows_video = h;
        }
    }
}

/// Partial update for [`VolumeOptions`], as sent by `set_options`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VolumeOptionsPatch {
    #[serde(default, alias = "savedVolume")]
    pub saved_volume: Option<u8>,
    #[serde(default)]
    pub steps: Option<u8>,
    #[serde(default, alias = "arrowsShortcut")]
    pub arrows_shortcut: Option<bool>,
    #[serde(default, alias = "hudFollowsVideo")]
    pub hud_follows_video: Option<bool>,
}

/// Timing and threshold knobs of the volume controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolumeTuning {
    /// A slider move further than this from the saved volume counts as a manual change.
    /// Empirical value, tune if the host's slider reports rounding jitter.
    pub manual_change_tolerance: u8,
    pub hud_fade_ms: u64,
    pub slider_decay_ms: u64,
    pub write_debounce_ms: u64,
    pub hud_move_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[derive(Default)]
pub struct PlayerConfig {
    /// mpv audio device name (see `mpv --audio-device=help`)
    pub audio_device: Option<String>,
    /// Show the video panel in the terminal UI (HUD goes over the video area).
    pub show_video_panel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub mouse: bool,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            sources: vec!["kkbox".to_string(), "genius".to_string()],
            user_agent: "void-plugins/0.1.0".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for VolumeOptions {
    fn default() -> Self {
        Self {
            saved_volume: None,
            steps: 1,
            arrows_shortcut: true,
            hud_follows_video: true,
        }
    }
}

impl Default for VolumeTuning {
    fn default() -> Self {
        Self {
            manual_change_tolerance: 4,
            hud_fade_ms: 2000,
            slider_decay_ms: 3000,
            write_debounce_ms: 1000,
            hud_move_ms: 250,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { mouse: true }
    }
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
    restrict_permissions(&path);
    Ok(())
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj =
        ProjectDirs::from("dev", "void", "void-plugins").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = defaults::defaults();
        save(&cfg, Some(&path)).context("write default config")?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    parse(&raw).with_context(|| format!("parse {}", path.display()))
}

fn parse(raw: &str) -> anyhow::Result<Config> {
    let mut cfg = toml::from_str::<Config>(raw)?;
    if let Some(v) = cfg.volume.saved_volume {
        cfg.volume.saved_volume = Some(v.min(100));
    }
    Ok(cfg)
}

fn restrict_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    let _ = path;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let cfg = parse("[volume]\nsteps = 5\n").unwrap();
        assert_eq!(cfg.volume.steps, 5);
        assert!(cfg.volume.arrows_shortcut);
        assert_eq!(cfg.volume.saved_volume, None);
        assert_eq!(cfg.volume_tuning, VolumeTuning::default());
        assert_eq!(cfg.lyrics.sources, vec!["kkbox", "genius"]);
    }

    #[test]
    fn test_saved_volume_is_clamped_on_load() {
        let cfg = parse("[volume]\nsaved_volume = 180\n").unwrap();
        assert_eq!(cfg.volume.saved_volume, Some(100));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut cfg = defaults::defaults();
        cfg.volume.saved_volume = Some(42);
        cfg.volume_tuning.manual_change_tolerance = 6;
        let raw = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(parse(&raw).unwrap(), cfg);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("void-plugins-test-{}", std::process::id()))
            .join("config.toml");
        let mut cfg = Config::default();
        cfg.volume.steps = 3;
        save(&cfg, Some(&path)).unwrap();
        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.volume.steps, 3);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_step_never_zero() {
        let opts = VolumeOptions {
            steps: 0,
            ..VolumeOptions::default()
        };
        assert_eq!(opts.step(), 1);
    }

    #[test]
    fn test_merge_camel_case_patch() {
        let patch: VolumeOptionsPatch =
            serde_json::from_str(r#"{"savedVolume": 30, "arrowsShortcut": false}"#).unwrap();
        let mut opts = VolumeOptions::default();
        opts.merge(patch);
        assert_eq!(opts.saved_volume, Some(30));
        assert!(!opts.arrows_shortcut);
        assert_eq!(opts.steps, 1);
    }
}
