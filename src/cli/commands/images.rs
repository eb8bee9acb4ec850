use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::upload::{ctrl_c_token, upload_image};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ImageCommands {
    #[command(about = "Upload an image and print its public URL")]
    Upload {
        #[arg(help = "Path to the image file")]
        path: PathBuf,
    },
}

pub async fn handle(cmd: ImageCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ImageCommands::Upload { path } => {
            let cancel = ctrl_c_token();
            let image = upload_image(client, &path, &cancel).await?;
            output_success(
                output_format,
                &format!("Uploaded {}", image.url),
                Some(json!({ "url": image.url, "key": image.key })),
            )
        }
    }
}
