use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::converter::ConverterConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow any origin, method and header.
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: default_cors_permissive(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    3000
}

fn default_cors_permissive() -> bool {
    true
}

/// Temporary storage for uploaded files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Directory uploads are written to before conversion.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
    /// Largest accepted request body.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_size_bytes: default_max_size_bytes(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_size_bytes() -> u64 {
    512 * 1024 * 1024
}
