pub mod classifier;
pub mod config;
pub mod converter;
pub mod metrics;
pub mod orchestrator;
pub mod testing;

pub use classifier::{classify, extension_of, supported_extensions, MediaFamily};
pub use config::{
    config_path_from_env, load_config, load_config_from_str, validate_config, Config,
    ConfigError, ServerConfig, UploadConfig,
};
pub use converter::{
    ConversionInput, ConversionOutput, Converter, ConverterConfig, ConverterError,
    FfmpegConverter, ImageConverter, LibreOfficeConverter,
};
pub use orchestrator::{ConversionOrchestrator, ConversionRequest, UploadGuard, UploadedFile};
