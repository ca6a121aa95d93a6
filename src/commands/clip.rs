use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

use crate::utils::{
    Clip, ClipRequest, ConfigStore, Directories, FFmpeg, MediaSource, Removal, RunOptions,
    Settings, VideoFetcher, Workspace, YtDlp,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ClipArgs {
    /// Url of the video to be trimmed
    #[arg(short, long)]
    pub url: String,

    /// Start time of the clip, format hh-mm-ss
    #[arg(short = 's', long = "starttime")]
    pub start_time: String,

    /// End time of the clip, format hh-mm-ss
    #[arg(short = 'e', long = "endtime")]
    pub end_time: String,

    /// Directory the Clips folder is created in (remembered for later runs)
    #[arg(short = 'o', long = "outputdir")]
    pub output_dir: Option<String>,

    /// Directory the Temp folder for downloads is created in (remembered for later runs)
    #[arg(short = 't', long = "tempdir")]
    pub temp_dir: Option<String>,

    /// Delete the Temp folder once the clip is written
    #[arg(short, long)]
    pub delete: bool,

    /// Path to a TOML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the configuration database
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Path to the ffmpeg executable
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the yt-dlp executable
    #[arg(long)]
    pub ytdlp: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: ClipArgs) -> Result<()> {
    // Nothing is read or written until the required inputs check out
    let request = ClipRequest::parse(&args.url, &args.start_time, &args.end_time)?;

    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;

    // Stored directories are only rewritten once the run can actually proceed
    let ffmpeg = FFmpeg::locate(args.ffmpeg.as_deref(), &settings)?;
    let ytdlp = YtDlp::locate(args.ytdlp.as_deref(), &settings)?;

    let db_path = args.db.clone().unwrap_or_else(ConfigStore::default_path);
    let store = ConfigStore::open(&db_path).context("Failed to open configuration database")?;
    let directories = Directories::resolve(
        &store,
        args.temp_dir.as_deref(),
        args.output_dir.as_deref(),
    )
    .context("Failed to load stored directories")?;
    let options = RunOptions::new(request, directories, args.delete);
    debug!("Run options: {:?}", options);

    let fetcher = VideoFetcher::new(ytdlp, settings.fetch.container.as_str());

    execute(&options, &fetcher, &ffmpeg)?;
    Ok(())
}

/// Download, trim, then optionally clean up, strictly in that order
pub fn execute<S: MediaSource>(
    options: &RunOptions,
    fetcher: &VideoFetcher<S>,
    ffmpeg: &FFmpeg,
) -> Result<Clip> {
    let workspace = Workspace::new(options.temp_dir.clone(), options.output_dir.clone());
    workspace
        .ensure()
        .context("Failed to create working directories")?;

    info!("Fetching {}", options.source_url);
    let video = fetcher
        .fetch(&options.source_url, workspace.temp_dir())
        .context("Failed to download video")?;

    let clip = ffmpeg
        .extract(&video.path, options.start, options.end, workspace.output_dir())
        .context("Failed to trim video")?;
    println!("Trimming successful. {}", clip.path.display());

    if options.delete_after {
        match workspace.cleanup() {
            Removal::Deleted => println!("Folder deleted successfully."),
            Removal::NotFound => println!("Folder does not exist."),
            Removal::Failed(reason) => println!("Folder could not be deleted: {}", reason),
        }
    }

    Ok(clip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{ClipError, ClipTime, StreamInfo, VIDEO_DIRECTORY_KEY};
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct MockSource;

    impl MediaSource for MockSource {
        fn streams(&self, url: &str) -> crate::utils::Result<Vec<StreamInfo>> {
            Ok(vec![StreamInfo {
                format_id: "18".to_string(),
                url: url.to_string(),
                container: "mp4".to_string(),
                has_video: true,
                has_audio: true,
                height: 360,
                fps: 30.0,
                http_headers: HashMap::new(),
            }])
        }

        fn download(&self, _stream: &StreamInfo, destination: &Path) -> crate::utils::Result<()> {
            fs::write(destination, "video").map_err(|e| ClipError::Filesystem {
                path: destination.to_path_buf(),
                source: e,
            })
        }
    }

    fn options(root: &Path, delete_after: bool) -> RunOptions {
        RunOptions {
            source_url: "https://example.com/watch?v=abc".to_string(),
            start: ClipTime::new(0, 0, 5),
            end: ClipTime::new(0, 0, 10),
            output_dir: root.join("out").join("Clips"),
            temp_dir: root.join("work").join("Temp"),
            delete_after,
        }
    }

    fn args(url: &str, db: &Path) -> ClipArgs {
        ClipArgs {
            url: url.to_string(),
            start_time: "00-00-05".to_string(),
            end_time: "00-00-10".to_string(),
            output_dir: None,
            temp_dir: None,
            delete: false,
            config: None,
            db: Some(db.to_path_buf()),
            ffmpeg: None,
            ytdlp: None,
            verbose: false,
        }
    }

    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path, body: &str) -> FFmpeg {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ffmpeg");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        FFmpeg::new(path)
    }

    #[cfg(unix)]
    const WRITE_OUTPUT: &str =
        "prev=\"\"; for arg; do out=\"$prev\"; prev=\"$arg\"; done\necho clip > \"$out\"";

    fn clip_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_keeps_download_without_delete() -> Result<()> {
        let root = TempDir::new()?;
        let ffmpeg = fake_ffmpeg(root.path(), WRITE_OUTPUT);
        let options = options(root.path(), false);

        let clip = execute(&options, &VideoFetcher::new(MockSource, "mp4"), &ffmpeg)?;

        assert!(options.temp_dir.join("video.mp4").exists());
        let files = clip_files(&options.output_dir);
        assert_eq!(files, vec![format!("clip_{}.mp4", clip.slug)]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_deletes_working_directory() -> Result<()> {
        let root = TempDir::new()?;
        let ffmpeg = fake_ffmpeg(root.path(), WRITE_OUTPUT);
        let options = options(root.path(), true);

        let clip = execute(&options, &VideoFetcher::new(MockSource, "mp4"), &ffmpeg)?;

        assert!(!options.temp_dir.exists());
        assert!(clip.path.exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_trim_leaves_download_behind() {
        let root = TempDir::new().unwrap();
        let ffmpeg = fake_ffmpeg(root.path(), "echo 'bad input' >&2\nexit 1");
        let options = options(root.path(), true);

        let err = execute(&options, &VideoFetcher::new(MockSource, "mp4"), &ffmpeg).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClipError>(),
            Some(ClipError::ClipExtraction { .. })
        ));
        assert!(options.temp_dir.join("video.mp4").exists());
        assert!(clip_files(&options.output_dir).is_empty());
    }

    #[test]
    fn test_run_rejects_empty_url_before_side_effects() {
        let root = TempDir::new().unwrap();
        let db = root.path().join("clipmaker.db");

        let err = run(args("", &db)).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClipError>(),
            Some(ClipError::Validation(_))
        ));
        assert!(!db.exists());
    }

    #[test]
    fn test_missing_tool_leaves_stored_directories_alone() {
        let root = TempDir::new().unwrap();
        let db = root.path().join("clipmaker.db");
        {
            let store = ConfigStore::open(&db).unwrap();
            store.initialize().unwrap();
            store.set(VIDEO_DIRECTORY_KEY, "/previous/Temp").unwrap();
        }

        let mut args = args("https://example.com/watch?v=abc", &db);
        args.temp_dir = Some(root.path().join("new").to_string_lossy().into_owned());
        args.ffmpeg = Some(root.path().join("no-such-ffmpeg"));

        let err = run(args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClipError>(),
            Some(ClipError::ToolNotFound { .. })
        ));

        let entries = ConfigStore::open(&db).unwrap().initialize().unwrap();
        assert_eq!(entries[VIDEO_DIRECTORY_KEY], "/previous/Temp");
        assert!(!root.path().join("new").exists());
    }

    #[test]
    fn test_run_rejects_malformed_time() {
        let root = TempDir::new().unwrap();
        let db = root.path().join("clipmaker.db");
        let mut args = args("https://example.com/watch?v=abc", &db);
        args.end_time = "ten seconds".to_string();

        assert!(run(args).is_err());
        assert!(!db.exists());
    }
}
