use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    // If None, use OS default autosave directory
    pub autosave_override: Option<PathBuf>,
    // Create-node popup dimensions
    #[serde(default = "AppSettings::default_palette_width")]
    pub palette_width: f32,
    #[serde(default = "AppSettings::default_palette_height")]
    pub palette_height: f32,
    // Hide node labels below this zoom level
    pub label_min_zoom: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            autosave_override: None,
            palette_width: Self::default_palette_width(),
            palette_height: Self::default_palette_height(),
            label_min_zoom: 0.5,
        }
    }
}

impl AppSettings {
    fn config_dir() -> PathBuf {
        // Cross-platform user config dir
        #[cfg(target_os = "macos")]
        {
            // ~/Library/Application Support/Node-Weave
            let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("~"));
            return home.join("Library").join("Application Support").join("Node-Weave");
        }
        #[cfg(target_os = "windows")]
        {
            // %APPDATA%\Node-Weave
            if let Ok(appdata) = std::env::var("APPDATA") {
                return PathBuf::from(appdata).join("Node-Weave");
            }
            return PathBuf::from("Node-Weave");
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            // $XDG_CONFIG_HOME/node-weave or ~/.config/node-weave
            if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
                return PathBuf::from(xdg).join("node-weave");
            }
            let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("~"));
            return home.join(".config").join("node-weave");
        }
    }

    fn autosave_default_dir() -> PathBuf {
        // Cross-platform user-writable autosave dir
        #[cfg(target_os = "macos")]
        {
            let tmp = std::env::var_os("TMPDIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("/tmp"));
            return tmp.join("Node-Weave");
        }
        #[cfg(target_os = "windows")]
        {
            // %LOCALAPPDATA%\Node-Weave\Autosave else TEMP
            if let Ok(local) = std::env::var("LOCALAPPDATA") {
                return PathBuf::from(local).join("Node-Weave").join("Autosave");
            }
            if let Ok(temp) = std::env::var("TEMP") {
                return PathBuf::from(temp).join("Node-Weave");
            }
            return PathBuf::from("Node-Weave");
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            // $XDG_STATE_HOME/node-weave or ~/.local/state/node-weave, else /tmp/Node-Weave
            if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
                return PathBuf::from(xdg).join("node-weave");
            }
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(".local").join("state").join("node-weave");
            }
            return PathBuf::from("/tmp").join("Node-Weave");
        }
    }

    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_dir().join("settings.json");
        if path.exists() {
            let mut f = std::fs::File::open(path)?;
            let mut s = String::new();
            f.read_to_string(&mut s)?;
            let v: Self = serde_json::from_str(&s)?;
            return Ok(v);
        }
        Ok(Self::default())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join("settings.json");
        let s = serde_json::to_string_pretty(self)?;
        let mut f = std::fs::File::create(path)?;
        f.write_all(s.as_bytes())?;
        Ok(())
    }

    pub fn autosave_dir(&self) -> PathBuf {
        if let Some(p) = &self.autosave_override { return p.clone(); }
        Self::autosave_default_dir()
    }

    /// Return the directory where the settings file (settings.json) is stored.
    /// This is OS-specific and resolves to a per-user configuration directory.
    pub fn settings_dir() -> PathBuf {
        Self::config_dir()
    }

    pub(crate) fn default_palette_width() -> f32 { 320.0 }
    pub(crate) fn default_palette_height() -> f32 { 420.0 }
}
