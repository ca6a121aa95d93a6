use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ClipError, Result};
use super::store::{ConfigStore, CLIP_DIRECTORY_KEY, VIDEO_DIRECTORY_KEY};
use super::time::ClipTime;

/// Static settings read from an optional TOML file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    /// External tool locations
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Stream selection
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the ffmpeg executable
    #[serde(default)]
    pub ffmpeg: Option<PathBuf>,
    /// Path to the yt-dlp executable
    #[serde(default)]
    pub ytdlp: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Container the downloaded stream must use (default: mp4)
    #[serde(default = "default_container")]
    pub container: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            container: default_container(),
        }
    }
}

fn default_container() -> String {
    String::from("mp4")
}

impl Settings {
    /// Default settings location, `<config dir>/clipmaker/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("clipmaker").join("config.toml"))
    }

    /// Load settings from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the settings file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ClipError::filesystem(path, e))?;
        toml::from_str(&content)
            .map_err(|e| ClipError::Settings(format!("{}: {}", path.display(), e)))
    }

    /// Load the explicit file if given, else the default file if it exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!("Using settings from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// The inputs every run needs, checked before anything touches disk or network
#[derive(Debug, Clone)]
pub struct ClipRequest {
    pub source_url: String,
    pub start: ClipTime,
    pub end: ClipTime,
}

impl ClipRequest {
    pub fn parse(url: &str, start: &str, end: &str) -> Result<Self> {
        let source_url = url.trim();
        if source_url.is_empty() {
            return Err(ClipError::Validation("a source url is required".to_string()));
        }
        if start.trim().is_empty() {
            return Err(ClipError::Validation("a start time is required".to_string()));
        }
        if end.trim().is_empty() {
            return Err(ClipError::Validation("an end time is required".to_string()));
        }

        Ok(Self {
            source_url: source_url.to_string(),
            start: start.parse()?,
            end: end.parse()?,
        })
    }
}

/// Everything one run needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source_url: String,
    pub start: ClipTime,
    pub end: ClipTime,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub delete_after: bool,
}

impl RunOptions {
    pub fn new(request: ClipRequest, directories: Directories, delete_after: bool) -> Self {
        Self {
            source_url: request.source_url,
            start: request.start,
            end: request.end,
            output_dir: directories.output_dir,
            temp_dir: directories.temp_dir,
            delete_after,
        }
    }
}

/// Working and output directories after stored values and CLI overrides are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    pub temp_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Directories {
    fn default() -> Self {
        let temp_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("clipmaker")
            .join("Temp");

        Self {
            temp_dir,
            output_dir: PathBuf::from("Clips"),
        }
    }
}

impl Directories {
    /// Seed from stored entries, then apply the CLI overrides and persist them
    ///
    /// # Arguments
    /// * `store` - Initialized configuration store
    /// * `temp_base` - Value of `--tempdir`; the working directory becomes `<temp_base>/Temp`
    /// * `output_base` - Value of `--outputdir`; the output directory becomes `<output_base>/Clips`
    pub fn resolve(
        store: &ConfigStore,
        temp_base: Option<&str>,
        output_base: Option<&str>,
    ) -> Result<Self> {
        let entries = store.initialize()?;
        let mut directories = Self::default();

        if let Some(dir) = entries.get(VIDEO_DIRECTORY_KEY) {
            directories.temp_dir = PathBuf::from(dir);
        }
        if let Some(dir) = entries.get(CLIP_DIRECTORY_KEY) {
            directories.output_dir = PathBuf::from(dir);
        }

        if let Some(base) = non_blank(temp_base) {
            directories.temp_dir = Path::new(base).join("Temp");
            store.set(VIDEO_DIRECTORY_KEY, &directories.temp_dir.to_string_lossy())?;
            info!("Working directory set to {}", directories.temp_dir.display());
        }
        if let Some(base) = non_blank(output_base) {
            directories.output_dir = Path::new(base).join("Clips");
            store.set(CLIP_DIRECTORY_KEY, &directories.output_dir.to_string_lossy())?;
            info!("Output directory set to {}", directories.output_dir.display());
        }

        Ok(directories)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
