//! FFmpeg-based media adapter shared by the video and audio families.
//!
//! The engine runs in its own task and reports back through a oneshot
//! channel, so every invocation settles exactly once. If the caller stops
//! waiting (timeout, dropped request) the task notices the closed channel,
//! kills ffmpeg and removes whatever it wrote.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::ConversionInput;

const ENGINE: &str = "ffmpeg";

/// Upper bound on captured stderr, in bytes.
const MAX_ERROR_OUTPUT: usize = 16 * 1024;

type EngineOutcome = Result<(), ConverterError>;

/// FFmpeg-based converter implementation.
pub struct FfmpegConverter {
    config: ConverterConfig,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    /// Where the transcoded file is written: `<input path>.<format>`.
    pub fn output_path(input_path: &Path, format: &str) -> PathBuf {
        let mut path = input_path.as_os_str().to_owned();
        path.push(".");
        path.push(format);
        PathBuf::from(path)
    }

    /// Maps a file extension token to the ffmpeg muxer that writes it.
    fn muxer_for(format: &str) -> &str {
        match format {
            "mkv" => "matroska",
            "m4a" => "ipod",
            "aac" => "adts",
            "wmv" | "wma" => "asf",
            "ts" => "mpegts",
            "mpg" | "mpeg" => "mpeg",
            other => other,
        }
    }

    /// Builds ffmpeg arguments for a container/format conversion.
    fn build_args(&self, input_path: &Path, output_path: &Path, format: &str) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
        ];

        args.extend(["-f".to_string(), Self::muxer_for(format).to_string()]);
        args.push(output_path.to_string_lossy().to_string());

        args
    }

    /// Starts ffmpeg in a background task and returns the settlement channel.
    fn spawn_engine(
        &self,
        args: Vec<String>,
        output_path: &Path,
    ) -> oneshot::Receiver<EngineOutcome> {
        let (tx, rx) = oneshot::channel();

        let mut command = Command::new(&self.config.ffmpeg_path);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tokio::spawn(run_engine(
            command,
            self.config.ffmpeg_path.clone(),
            output_path.to_path_buf(),
            tx,
        ));

        rx
    }
}

async fn run_engine(
    mut command: Command,
    ffmpeg_path: PathBuf,
    output_path: PathBuf,
    mut tx: oneshot::Sender<EngineOutcome>,
) {
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            let message = if e.kind() == std::io::ErrorKind::NotFound {
                format!("FFmpeg not found at path: {}", ffmpeg_path.display())
            } else {
                format!("Failed to start ffmpeg: {}", e)
            };
            let _ = tx.send(Err(ConverterError::engine_failure(ENGINE, message)));
            return;
        }
    };

    let stderr = child.stderr.take();
    let exited = tokio::select! {
        outcome = wait_for_exit(&mut child, stderr) => Some(outcome),
        _ = tx.closed() => None,
    };

    match exited {
        Some(outcome) => {
            if tx.send(outcome).is_err() {
                // Receiver vanished right as ffmpeg finished; nobody will read the output.
                discard_output(&output_path).await;
            }
        }
        None => {
            warn!(
                "Conversion abandoned, stopping ffmpeg writing {}",
                output_path.display()
            );
            let _ = child.kill().await;
            discard_output(&output_path).await;
        }
    }
}

async fn wait_for_exit(child: &mut Child, stderr: Option<ChildStderr>) -> EngineOutcome {
    let mut error_output = String::new();

    // Drain stderr to EOF; closing the pipe early would kill ffmpeg with SIGPIPE.
    if let Some(stderr) = stderr {
        let mut reader = BufReader::new(stderr);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    if error_output.len() < MAX_ERROR_OUTPUT {
                        let text = String::from_utf8_lossy(&line);
                        let text = text.trim_end_matches(['\n', '\r']);
                        if !error_output.is_empty() {
                            error_output.push('\n');
                        }
                        error_output.push_str(text);
                    }
                }
                Err(e) => {
                    warn!("Failed to read ffmpeg stderr: {}", e);
                    break;
                }
            }
        }
    }

    let status = child.wait().await?;
    if status.success() {
        return Ok(());
    }

    let message = match error_output.trim() {
        "" => format!("FFmpeg exited with code: {:?}", status.code()),
        trimmed => trimmed.to_string(),
    };
    Err(ConverterError::engine_failure(ENGINE, message))
}

async fn discard_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed transcoder output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove transcoder output {}: {}", path.display(), e),
    }
}

/// Removes the transcoder output if the adapter is dropped mid-read.
struct OutputFile {
    path: PathBuf,
    armed: bool,
}

impl OutputFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn remove(mut self) {
        self.armed = false;
        discard_output(&self.path).await;
    }
}

impl Drop for OutputFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        ENGINE
    }

    async fn convert(&self, input: &ConversionInput) -> Result<Vec<u8>, ConverterError> {
        let output = OutputFile::new(Self::output_path(&input.path, &input.target_format));
        let args = self.build_args(&input.path, output.path(), &input.target_format);
        debug!("Running ffmpeg {}", args.join(" "));

        let settled = self
            .spawn_engine(args, output.path())
            .await
            .unwrap_or_else(|_| {
                Err(ConverterError::engine_failure(
                    ENGINE,
                    "FFmpeg terminated without reporting a result",
                ))
            });

        if let Err(e) = settled {
            // A failed run may still leave a partial file behind.
            output.remove().await;
            return Err(e);
        }

        let bytes = tokio::fs::read(output.path()).await;
        output.remove().await;

        bytes.map_err(|e| {
            ConverterError::engine_failure(
                ENGINE,
                format!("FFmpeg finished but its output could not be read: {}", e),
            )
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        match result {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(ConverterError::engine_failure(
                ENGINE,
                format!("ffmpeg -version exited with code: {:?}", output.status.code()),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConverterError::engine_failure(
                    ENGINE,
                    format!(
                        "FFmpeg not found at path: {}",
                        self.config.ffmpeg_path.display()
                    ),
                ))
            }
            Err(e) => Err(ConverterError::Io(e)),
        }
    }
}
