use clap::Parser;
use joblib::{WorkerConfig, DEFAULT_MAX_ASSET_BYTES, DEFAULT_OUTPUT_LIMIT};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Image processing job server
///
/// Every option can also be set through the environment (or a `.env` file).
#[derive(Debug, Clone, Parser)]
#[command(name = "server", version)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory holding uploaded and produced assets
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_ASSET_BYTES)]
    pub max_upload_bytes: usize,

    /// Worker executable
    #[arg(long, env = "WORKER_PROGRAM", default_value = "uv")]
    pub worker_program: String,

    /// Comma separated arguments placed before the asset path
    #[arg(
        long,
        env = "WORKER_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_value = "run,python,main.py"
    )]
    pub worker_args: Vec<String>,

    /// Working directory of worker processes
    #[arg(long, env = "WORKER_DIR", default_value = ".")]
    pub worker_dir: PathBuf,

    /// Bytes of stdout/stderr kept per job and stream
    #[arg(long, env = "OUTPUT_LIMIT_BYTES", default_value_t = DEFAULT_OUTPUT_LIMIT)]
    pub output_limit: usize,

    /// Mailbox capacity of the job registry
    #[arg(long, env = "REGISTRY_CAPACITY", default_value_t = 64)]
    pub registry_capacity: usize,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn worker(&self) -> WorkerConfig {
        WorkerConfig {
            program: self.worker_program.clone(),
            args: self.worker_args.clone(),
            working_dir: self.worker_dir.clone(),
            output_limit: self.output_limit,
        }
    }
}
