// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fs_dataset;
pub mod source_libav;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FfmpegEncoder;
pub use fs_dataset::DatasetLayout;
pub use source_libav::LibavSourceOpener;
pub use toml_config::TomlConfigAdapter;
