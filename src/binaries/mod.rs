//! Localisation, validation et installation de yt-dlp.

mod diagnostics;
mod download;
mod install;
mod python_env;
mod resolver;
mod validation;

pub use diagnostics::{summarize_attempts, AcquisitionAttempt, ToolStatus};
pub use download::YTDLP_RELEASE_URLS;
pub use install::{
    AcquisitionChain, AcquisitionStrategy, BinaryDownloadStrategy, UserPipStrategy, VenvStrategy,
};
pub use resolver::{
    ensure_executable, is_executable, InvocationDescriptor, Provenance, ToolLayout, ToolLocator,
    TOOL_UNAVAILABLE_HINT, YT_DLP,
};
pub use validation::is_valid_yt_dlp_binary;
