use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Talk to an image processing job server
#[derive(Debug, Parser)]
pub struct ArgParser {
    /// Base URL of the server
    #[arg(
        short = 's',
        long = "server",
        env = "JOBS_SERVER",
        default_value = "http://localhost:3000"
    )]
    pub server: String,

    /// Seconds between status polls when waiting on a job
    #[arg(long, default_value = "2", value_parser = parse_seconds)]
    pub interval: Duration,

    /// The sub-command to use
    #[command(subcommand)]
    pub sub_command: SubCommand,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum SubCommand {
    /// upload an image
    Upload {
        /// file to upload
        path: PathBuf,
    },
    /// start processing an uploaded image
    Process {
        /// stored image name, as printed by `upload`
        image_id: String,

        #[arg(long)]
        /// apply the light transformation
        light: bool,

        #[arg(long)]
        /// apply the heavy transformation
        heavy: bool,

        #[arg(long)]
        /// poll until the job finishes
        wait: bool,
    },
    /// get a job's status
    Status {
        /// job id
        job_id: Uuid,
    },
    /// poll a job until it finishes
    Wait {
        /// job id
        job_id: Uuid,
    },
    /// list all jobs
    Jobs,
    /// download a stored image
    Download {
        /// stored file name
        filename: String,

        #[arg(short, long)]
        /// where to write the file, defaults to the file name
        out: Option<PathBuf>,
    },
}

/// value_parser for poll intervals given in (possibly fractional) seconds
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("`{s}` is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|err| err.to_string())
}
