use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_empty_collection, output_json, output_success, print_glossary};
use crate::cli::OutputFormat;
use crate::database::models::Glossary;

#[derive(Subcommand)]
pub enum GlossaryCommands {
    #[command(about = "List your glossaries")]
    List,

    #[command(about = "Create a glossary")]
    Create {
        #[arg(help = "Title")]
        title: String,
        #[arg(long, help = "Optional description")]
        description: Option<String>,
    },

    #[command(about = "Show one glossary")]
    Show {
        #[arg(help = "Glossary id")]
        id: i64,
    },
}

pub async fn handle(cmd: GlossaryCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        GlossaryCommands::List => {
            let glossaries: Vec<Glossary> = client.get("/api/glossaries").await?;
            if glossaries.is_empty() {
                return output_empty_collection(output_format, "glossaries", "No glossaries yet");
            }
            match output_format {
                OutputFormat::Json => output_json(&glossaries)?,
                OutputFormat::Text => glossaries.iter().for_each(print_glossary),
            }
            Ok(())
        }
        GlossaryCommands::Create { title, description } => {
            let glossary: Glossary = client
                .post("/api/glossaries", &json!({ "title": title, "description": description }))
                .await?;
            output_success(
                output_format,
                &format!("Created glossary {} '{}'", glossary.id, glossary.title),
                Some(json!({ "glossary": glossary })),
            )
        }
        GlossaryCommands::Show { id } => {
            let glossary: Option<Glossary> = client.get(&format!("/api/glossaries/{}", id)).await?;
            let glossary = glossary.ok_or_else(|| anyhow::anyhow!("Glossary {} not found", id))?;
            match output_format {
                OutputFormat::Json => output_json(&glossary)?,
                OutputFormat::Text => print_glossary(&glossary),
            }
            Ok(())
        }
    }
}
