mod arg_parser;
mod client_cli;

use arg_parser::{ArgParser, SubCommand};
use client_cli::ClientCli;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ArgParser::parse();
    let client = ClientCli::connect(&args.server, args.interval);

    match args.sub_command {
        SubCommand::Upload { path } => {
            client.upload(&path).await?;
        }
        SubCommand::Process {
            image_id,
            light,
            heavy,
            wait,
        } => {
            client.process(&image_id, light, heavy, wait).await?;
        }
        SubCommand::Status { job_id } => {
            client.query_status(job_id).await?;
        }
        SubCommand::Wait { job_id } => {
            client.wait(job_id).await?;
        }
        SubCommand::Jobs => {
            client.list_jobs().await?;
        }
        SubCommand::Download { filename, out } => {
            client.download(&filename, out.as_deref()).await?;
        }
    }

    Ok(())
}
