use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// Tunables for the synchronization core. Defaults match the shipped app: a
/// ~60fps display loop against a 1s backend tick with a heartbeat every 10s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreSettings {
    pub display_tick_ms: u64,
    pub event_capacity: usize,
    pub backend_tick_ms: u64,
    pub heartbeat_every_ticks: u32,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            display_tick_ms: 16,
            event_capacity: 64,
            backend_tick_ms: 1000,
            heartbeat_every_ticks: 10,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<CoreSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            CoreSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn core(&self) -> CoreSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update_core(&self, settings: CoreSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &CoreSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
