use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use super::settings::AppSettings;
use crate::graph_utils::graph::GraphDocument;

#[derive(Debug, Serialize, Deserialize)]
pub struct AppStateFile {
    pub doc: GraphDocument,
    // view transform; node positions live on the nodes themselves
    pub pan: (f32, f32),
    pub zoom: f32,
}

impl AppStateFile {
    pub fn from_runtime(doc: &GraphDocument, pan: egui::Vec2, zoom: f32) -> Self {
        Self { doc: doc.clone(), pan: (pan.x, pan.y), zoom }
    }

    /// Convert a persisted AppStateFile into runtime structures.
    ///
    /// This intentionally consumes `self` to avoid cloning the document.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_runtime(self) -> (GraphDocument, egui::Vec2, f32) {
        let pan = egui::vec2(self.pan.0, self.pan.1);
        (self.doc, pan, self.zoom)
    }
}

static SETTINGS_OVERRIDE: OnceCell<AppSettings> = OnceCell::new();

/// Install the settings the process uses from here on. First caller wins;
/// later calls are ignored.
pub fn set_settings_override(settings: AppSettings) {
    let _ = SETTINGS_OVERRIDE.set(settings);
}

/// The installed settings, or a fresh load when none were installed.
pub fn effective_settings() -> AppSettings {
    match SETTINGS_OVERRIDE.get() {
        Some(settings) => settings.clone(),
        None => AppSettings::load().unwrap_or_default(),
    }
}

fn autosave_dir() -> PathBuf {
    effective_settings().autosave_dir()
}

pub fn active_state_path() -> PathBuf {
    autosave_dir().join("state.ron")
}

pub fn versioned_state_path_now() -> PathBuf {
    let now = OffsetDateTime::now_utc();
    let fmt = format_description!("[year][month][day]_[hour][minute][second]");
    let stamp = now.format(fmt).unwrap_or_else(|_| "unknown".to_string());
    autosave_dir().join(format!("state_{}.ron", stamp))
}

fn ensure_autosave_dir() -> std::io::Result<()> {
    fs::create_dir_all(autosave_dir())
}

fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("ron.tmp");
    {
        let mut f = File::create(&tmp_path)?;
        f.write_all(data)?;
        f.flush()?;
    }
    fs::rename(tmp_path, path)?;
    Ok(())
}

pub fn save_active(state: &AppStateFile) -> anyhow::Result<PathBuf> {
    ensure_autosave_dir()?;
    let pretty = PrettyConfig::new()
        .separate_tuple_members(true)
        .enumerate_arrays(true);
    let s = ron::ser::to_string_pretty(state, pretty)?;
    let path = active_state_path();
    atomic_write(&path, s.as_bytes())?;
    Ok(path)
}

pub fn save_versioned(state: &AppStateFile) -> anyhow::Result<PathBuf> {
    ensure_autosave_dir()?;
    let pretty = PrettyConfig::new()
        .separate_tuple_members(true)
        .enumerate_arrays(true);
    let s = ron::ser::to_string_pretty(state, pretty)?;
    let path = versioned_state_path_now();
    atomic_write(&path, s.as_bytes())?;
    Ok(path)
}

pub fn load_active() -> anyhow::Result<Option<AppStateFile>> {
    let path = active_state_path();
    if !path.exists() {
        return Ok(None);
    }
    load_from_path(&path).map(Some)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppStateFile> {
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let state: AppStateFile = ron::from_str(&buf)?;
    Ok(state)
}

pub fn list_versions() -> anyhow::Result<Vec<PathBuf>> {
    let dir = autosave_dir();
    let mut entries: Vec<PathBuf> = Vec::new();
    if dir.exists() {
        for e in fs::read_dir(dir)? {
            let p = e?.path();
            if let Some(name) = p.file_name().and_then(|s| s.to_str())
                && name.starts_with("state_")
                && name.ends_with(".ron")
            {
                entries.push(p);
            }
        }
    }
    // sort descending by filename (timestamp)
    entries.sort();
    entries.reverse();
    Ok(entries)
}
