pub mod commands;

pub mod utils {
    mod config;
    mod error;
    pub mod fetch;
    mod ffmpeg;
    mod store;
    mod time;
    mod tools;
    pub mod workspace;
    pub use config::{ClipRequest, Directories, RunOptions, Settings};
    pub use error::{ClipError, Result};
    pub use fetch::{DownloadedVideo, MediaSource, StreamInfo, VideoFetcher, YtDlp};
    pub use ffmpeg::{Clip, FFmpeg};
    pub use store::{ConfigStore, CLIP_DIRECTORY_KEY, VIDEO_DIRECTORY_KEY};
    pub use time::ClipTime;
    pub use workspace::{Removal, Workspace};
}

// Re-export commonly used types at the crate root for convenience
pub use utils::{
    ClipError, ClipTime, ConfigStore, FFmpeg, RunOptions, Settings, VideoFetcher, Workspace, YtDlp,
};
