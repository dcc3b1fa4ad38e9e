//! Volume options persistence backed by the config file.

use std::path::PathBuf;
use tokio::sync::mpsc;

use super::{Config, VolumeOptions};
use crate::volume::OptionsStore;

/// Writes `[volume]` back into the config file and optionally tells another
/// observer (the bridge) about every change.
pub struct ConfigStore {
    cfg: Config,
    path: Option<PathBuf>,
    publish_tx: Option<mpsc::UnboundedSender<VolumeOptions>>,
}

impl ConfigStore {
    pub fn new(cfg: Config, path: Option<PathBuf>) -> Self {
        Self {
            cfg,
            path,
            publish_tx: None,
        }
    }

    pub fn with_publisher(mut self, tx: mpsc::UnboundedSender<VolumeOptions>) -> Self {
        self.publish_tx = Some(tx);
        self
    }
}

impl OptionsStore for ConfigStore {
    fn persist(&mut self, options: &VolumeOptions) -> anyhow::Result<()> {
        self.cfg.volume = options.clone();
        super::save(&self.cfg, self.path.as_deref())?;
        tracing::debug!(saved_volume = ?options.saved_volume, "volume options saved");
        Ok(())
    }

    fn publish(&mut self, options: &VolumeOptions) {
        if let Some(tx) = &self.publish_tx
            && tx.send(options.clone()).is_err()
        {
            tracing::debug!("options observer gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_keeps_other_sections() {
        let dir = std::env::temp_dir().join(format!("void-plugins-store-{}", std::process::id()));
        let path = dir.join("config.toml");
        let mut cfg = Config::default();
        cfg.lyrics.timeout_secs = 3;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut store = ConfigStore::new(cfg, Some(path.clone())).with_publisher(tx);
        let opts = VolumeOptions {
            saved_volume: Some(64),
            ..VolumeOptions::default()
        };
        store.persist(&opts).unwrap();
        store.publish(&opts);

        let loaded = super::super::load(Some(&path)).unwrap();
        assert_eq!(loaded.volume.saved_volume, Some(64));
        assert_eq!(loaded.lyrics.timeout_secs, 3);
        assert_eq!(rx.try_recv().unwrap().saved_volume, Some(64));
        let _ = std::fs::remove_dir_all(dir);
    }
}
