use chrono::Local;
use log::{debug, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::config::Settings;
use super::error::{ClipError, Result};
use super::time::ClipTime;
use super::tools::{locate_tool, ToolLookup};

/// A trimmed clip written to the output directory
#[derive(Debug, Clone)]
pub struct Clip {
    pub path: PathBuf,
    /// Local time the clip was named after, `YYYY-MM-DD-HH-mm-ss`
    pub slug: String,
}

/// Runs ffmpeg to cut clips out of downloaded videos
pub struct FFmpeg {
    path: PathBuf,
}

impl FFmpeg {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Find ffmpeg from `--ffmpeg`, `FFMPEG_PATH`, the settings file, or PATH
    pub fn locate(explicit: Option<&Path>, settings: &Settings) -> Result<Self> {
        let path = locate_tool(&ToolLookup {
            name: "ffmpeg",
            explicit,
            env_var: "FFMPEG_PATH",
            configured: settings.tools.ffmpeg.as_deref(),
            fallback: "ffmpeg",
            version_arg: "-version",
        })?;
        Ok(Self::new(path))
    }

    /// Cuts `start..end` out of the input without re-encoding
    ///
    /// # Arguments
    /// * `input_path` - Path to the downloaded video
    /// * `start` - Start of the clip
    /// * `end` - End of the clip
    /// * `output_dir` - Directory the clip is written to
    pub fn extract(
        &self,
        input_path: &Path,
        start: ClipTime,
        end: ClipTime,
        output_dir: &Path,
    ) -> Result<Clip> {
        let slug = generate_slug();
        let output_path = clip_path(output_dir, &slug);
        let args = trim_args(input_path, start, end, &output_path);

        info!("Trimming {} to {}", start, end);
        debug!(
            "Running {} {}",
            self.path.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        // stdout is captured but not reported
        let output = Command::new(&self.path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ClipError::ToolNotFound {
                tool: "ffmpeg",
                path: self.path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ClipError::ClipExtraction {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(Clip {
            path: output_path,
            slug,
        })
    }
}

/// Arguments for a stream-copy trim of `input` between `start` and `end`
pub fn trim_args(input: &Path, start: ClipTime, end: ClipTime, output: &Path) -> Vec<OsString> {
    vec![
        "-i".into(),
        input.as_os_str().to_owned(),
        "-ss".into(),
        start.to_string().into(),
        "-to".into(),
        end.to_string().into(),
        "-c:v".into(),
        "copy".into(), // Copy video stream without re-encoding
        "-c:a".into(),
        "copy".into(), // Copy audio stream without re-encoding
        output.as_os_str().to_owned(),
        "-y".into(),
    ]
}

/// Current local time as `YYYY-MM-DD-HH-mm-ss`
pub fn generate_slug() -> String {
    Local::now().format("%Y-%m-%d-%H-%M-%S").to_string()
}

/// `clip_<slug>.mp4` in `output_dir`, with `-1`, `-2`, ... appended if that name is taken
pub fn clip_path(output_dir: &Path, slug: &str) -> PathBuf {
    let first = output_dir.join(format!("clip_{}.mp4", slug));
    if !first.exists() {
        return first;
    }

    (1u32..)
        .map(|n| output_dir.join(format!("clip_{}-{}.mp4", slug, n)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}
