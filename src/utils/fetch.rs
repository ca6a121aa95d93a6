use log::{debug, info};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use youtube_dl::YoutubeDl;

use super::config::Settings;
use super::error::{ClipError, Result};
use super::tools::{locate_tool, ToolLookup};

const BUFFER_SIZE: usize = 8192; // 8KB buffer size

/// One downloadable variant of a source video
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub format_id: String,
    pub url: String,
    /// Container extension, e.g. `mp4` or `webm`
    pub container: String,
    pub has_video: bool,
    pub has_audio: bool,
    /// Frame height in pixels
    pub height: u32,
    pub fps: f64,
    /// Headers the host expects on the download request
    pub http_headers: HashMap<String, String>,
}

/// Ordered by height, then frame rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VideoQuality {
    pub height: u32,
    pub framerate: u32,
}

impl StreamInfo {
    pub fn video_quality(&self) -> VideoQuality {
        VideoQuality {
            height: self.height,
            framerate: self.fps.round() as u32,
        }
    }

    pub fn is_muxed(&self) -> bool {
        self.has_video && self.has_audio
    }
}

/// The source video after it has been written to the working directory
#[derive(Debug, Clone)]
pub struct DownloadedVideo {
    pub path: PathBuf,
}

/// Something that can list the streams behind a URL and download one of them
pub trait MediaSource {
    fn streams(&self, url: &str) -> Result<Vec<StreamInfo>>;
    fn download(&self, stream: &StreamInfo, destination: &Path) -> Result<()>;
}

/// Resolves streams with yt-dlp and downloads them over HTTP
pub struct YtDlp {
    path: PathBuf,
}

impl YtDlp {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Find yt-dlp from `--ytdlp`, `YTDLP_PATH`, the settings file, or PATH
    pub fn locate(explicit: Option<&Path>, settings: &Settings) -> Result<Self> {
        let path = locate_tool(&ToolLookup {
            name: "yt-dlp",
            explicit,
            env_var: "YTDLP_PATH",
            configured: settings.tools.ytdlp.as_deref(),
            fallback: "yt-dlp",
            version_arg: "--version",
        })?;
        Ok(Self::new(path))
    }
}

impl MediaSource for YtDlp {
    fn streams(&self, url: &str) -> Result<Vec<StreamInfo>> {
        debug!("Resolving streams for {} with {}", url, self.path.display());
        let output = YoutubeDl::new(url)
            .youtube_dl_path(&self.path)
            .extra_arg("--no-playlist")
            .extra_arg("--no-warnings")
            .run()
            .map_err(|e| ClipError::Retrieval(format!("could not resolve {}: {}", url, e)))?;

        let video = output.into_single_video().ok_or_else(|| {
            ClipError::Retrieval(format!("{} resolved to a playlist, not a single video", url))
        })?;

        let mut streams = Vec::new();
        for format in video.formats.unwrap_or_default() {
            let format = serde_json::to_value(&format)
                .map_err(|e| ClipError::Retrieval(format!("unreadable stream metadata: {}", e)))?;
            streams.extend(stream_from_format(&format));
        }
        Ok(streams)
    }

    fn download(&self, stream: &StreamInfo, destination: &Path) -> Result<()> {
        download_file(&stream.url, &stream.http_headers, destination)
    }
}

fn has_codec(format: &Value, key: &str) -> bool {
    format[key].as_str().map(|c| c != "none").unwrap_or(false)
}

/// Map one yt-dlp format entry to a stream, skipping anything not served over plain HTTP
pub fn stream_from_format(format: &Value) -> Option<StreamInfo> {
    if !matches!(format["protocol"].as_str(), Some("http") | Some("https")) {
        return None;
    }

    let http_headers: HashMap<String, String> = format["http_headers"]
        .as_object()
        .map(|headers| {
            headers
                .iter()
                .filter_map(|(name, value)| Some((name.clone(), value.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Some(StreamInfo {
        format_id: format["format_id"].as_str()?.to_string(),
        url: format["url"].as_str()?.to_string(),
        container: format["ext"].as_str().unwrap_or_default().to_string(),
        has_video: has_codec(format, "vcodec"),
        has_audio: has_codec(format, "acodec"),
        height: format["height"].as_f64().unwrap_or(0.0) as u32,
        fps: format["fps"].as_f64().unwrap_or(0.0),
        http_headers,
    })
}

/// Pick the muxed stream in `container` with the highest video quality.
/// On equal quality the first listed stream wins.
pub fn select_stream<'a>(streams: &'a [StreamInfo], container: &str) -> Option<&'a StreamInfo> {
    streams
        .iter()
        .filter(|s| s.is_muxed() && s.container.eq_ignore_ascii_case(container))
        .min_by(|a, b| b.video_quality().cmp(&a.video_quality()))
}

/// Downloads the best muxed stream of a video into a directory
pub struct VideoFetcher<S: MediaSource> {
    source: S,
    container: String,
}

impl<S: MediaSource> VideoFetcher<S> {
    pub fn new(source: S, container: impl Into<String>) -> Self {
        Self {
            source,
            container: container.into(),
        }
    }

    /// Download `url` to `<destination_dir>/video.<container>`, replacing any previous file
    pub fn fetch(&self, url: &str, destination_dir: &Path) -> Result<DownloadedVideo> {
        let streams = self.source.streams(url)?;
        debug!("Found {} downloadable streams", streams.len());

        let stream = select_stream(&streams, &self.container).ok_or_else(|| {
            ClipError::Retrieval(format!(
                "no {} stream with both audio and video is available for {}",
                self.container, url
            ))
        })?;

        info!(
            "Downloading format {} ({}p, {})",
            stream.format_id, stream.height, stream.container
        );
        let path = destination_dir.join(format!("video.{}", stream.container));
        self.source.download(stream, &path)?;

        info!("Downloaded video to {}", path.display());
        Ok(DownloadedVideo { path })
    }
}

/// Download a file from a URL to a specific path
///
/// Uses buffered I/O to efficiently handle large files without loading them entirely into memory.
/// The download is processed in chunks of BUFFER_SIZE bytes.
pub fn download_file(
    url: &str,
    headers: &HashMap<String, String>,
    output_path: &Path,
) -> Result<()> {
    debug!("Downloading from URL: {}", url);
    let mut request = ureq::get(url);
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    let mut response = request
        .call()
        .map_err(|e| ClipError::Retrieval(format!("download request failed: {}", e)))?;
    debug!("Got response from server");

    let file = File::create(output_path).map_err(|e| ClipError::filesystem(output_path, e))?;
    let mut writer = BufWriter::new(file);
    let mut reader = response.body_mut().as_reader();
    let mut buffer = vec![0; BUFFER_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break, // EOF
            Ok(n) => {
                writer
                    .write_all(&buffer[..n])
                    .map_err(|e| ClipError::filesystem(output_path, e))?;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ClipError::Retrieval(format!("download interrupted: {}", e)));
            }
        }
    }

    writer
        .flush()
        .map_err(|e| ClipError::filesystem(output_path, e))?;
    debug!("Successfully downloaded file to {}", output_path.display());
    Ok(())
}
