//! Document adapter driving LibreOffice in headless mode.
//!
//! Each call gets a private scratch directory holding the source copy, the
//! output directory and a throwaway LibreOffice user profile. Separate
//! profiles let several `soffice` processes run side by side.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::ConversionInput;

const ENGINE: &str = "libreoffice";

/// Base name of the source copy inside the scratch directory.
const SOURCE_STEM: &str = "source";

/// Converts documents by shelling out to `soffice --convert-to`.
pub struct LibreOfficeConverter {
    soffice_path: PathBuf,
}

impl LibreOfficeConverter {
    /// Creates a new LibreOffice converter with the given configuration.
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            soffice_path: config.soffice_path.clone(),
        }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(&ConverterConfig::default())
    }

    fn build_args(
        profile_dir: &Path,
        output_dir: &Path,
        source_path: &Path,
        target_format: &str,
    ) -> Vec<String> {
        vec![
            format!("-env:UserInstallation={}", Self::profile_url(profile_dir)),
            "--headless".to_string(),
            "--norestore".to_string(),
            "--convert-to".to_string(),
            target_format.to_string(),
            "--outdir".to_string(),
            output_dir.to_string_lossy().to_string(),
            source_path.to_string_lossy().to_string(),
        ]
    }

    /// `file://` URL for the profile directory, each path segment percent-encoded.
    fn profile_url(profile_dir: &Path) -> String {
        let path = profile_dir.to_string_lossy();
        let encoded: Vec<_> = path.split('/').map(urlencoding::encode).collect();
        format!("file://{}", encoded.join("/"))
    }

    /// Runs soffice on `data` and returns the converted bytes.
    async fn render(
        &self,
        data: &[u8],
        source_extension: &str,
        target_format: &str,
    ) -> Result<Vec<u8>, ConverterError> {
        let scratch = TempDir::new()?;
        let output_dir = scratch.path().join("out");
        let profile_dir = scratch.path().join("profile");
        tokio::fs::create_dir_all(&output_dir).await?;

        let source_path = if source_extension.is_empty() {
            scratch.path().join(SOURCE_STEM)
        } else {
            scratch
                .path()
                .join(format!("{}.{}", SOURCE_STEM, source_extension))
        };
        tokio::fs::write(&source_path, data).await?;

        let args = Self::build_args(&profile_dir, &output_dir, &source_path, target_format);
        debug!("Running {} {}", self.soffice_path.display(), args.join(" "));

        let output = Command::new(&self.soffice_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::engine_failure(
                        ENGINE,
                        format!(
                            "LibreOffice not found at path: {}",
                            self.soffice_path.display()
                        ),
                    )
                } else {
                    ConverterError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(ConverterError::engine_failure(
                ENGINE,
                format!(
                    "LibreOffice exited with code {}: {}",
                    output.status.code().unwrap_or(-1),
                    detail
                ),
            ));
        }

        let expected = output_dir.join(format!("{}.{}", SOURCE_STEM, target_format));

        match tokio::fs::read(&expected).await {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            Ok(_) => Err(ConverterError::engine_failure(
                ENGINE,
                "LibreOffice conversion produced an empty file",
            )),
            // soffice exits 0 even when it has no filter for the requested format
            Err(_) => Err(ConverterError::engine_failure(
                ENGINE,
                format!(
                    "LibreOffice could not convert the document to {}",
                    target_format
                ),
            )),
        }
    }
}

#[async_trait]
impl Converter for LibreOfficeConverter {
    fn name(&self) -> &str {
        ENGINE
    }

    async fn convert(&self, input: &ConversionInput) -> Result<Vec<u8>, ConverterError> {
        let data = tokio::fs::read(&input.path).await?;
        self.render(&data, &input.source_extension(), &input.target_format)
            .await
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        let result = Command::new(&self.soffice_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await;

        match result {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(ConverterError::engine_failure(
                ENGINE,
                format!(
                    "soffice --version exited with code: {:?}",
                    output.status.code()
                ),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConverterError::engine_failure(
                    ENGINE,
                    format!(
                        "LibreOffice not found at path: {}",
                        self.soffice_path.display()
                    ),
                ))
            }
            Err(e) => Err(ConverterError::Io(e)),
        }
    }
}
