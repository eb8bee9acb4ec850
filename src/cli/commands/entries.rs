use std::path::PathBuf;

use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::upload::{ctrl_c_token, upload_image};
use crate::cli::utils::{output_empty_collection, output_json, output_success, print_entry, print_organized};
use crate::cli::OutputFormat;
use crate::database::models::Entry;
use crate::organizer::ViewState;

#[derive(Subcommand)]
pub enum EntryCommands {
    #[command(about = "List entries grouped by initial")]
    List {
        #[arg(help = "Glossary id")]
        glossary_id: i64,
        #[arg(long, help = "Only entries whose term or definition contains this text")]
        search: Option<String>,
        #[arg(long, help = "Only entries starting with this letter (ignored while searching)")]
        letter: Option<String>,
    },

    #[command(about = "Show one entry")]
    Show {
        #[arg(help = "Entry id")]
        id: i64,
    },

    #[command(about = "Add an entry to a glossary")]
    Add {
        #[arg(help = "Glossary id")]
        glossary_id: i64,
        #[arg(help = "Term")]
        term: String,
        #[arg(help = "Definition (Markdown)")]
        definition: String,
        #[arg(long, conflicts_with = "image_url", help = "Upload this image and attach it")]
        image: Option<PathBuf>,
        #[arg(long, help = "Attach an already hosted image")]
        image_url: Option<String>,
    },

    #[command(about = "Change an entry")]
    Update {
        #[arg(help = "Entry id")]
        id: i64,
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        definition: Option<String>,
        #[arg(long, conflicts_with = "clear_image")]
        image_url: Option<String>,
        #[arg(long, help = "Remove the attached image")]
        clear_image: bool,
    },

    #[command(about = "Delete an entry")]
    Delete {
        #[arg(help = "Entry id")]
        id: i64,
    },
}

pub async fn handle(cmd: EntryCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        EntryCommands::List { glossary_id, search, letter } => {
            let view = view_state(search, letter.as_deref())?;
            list(client, glossary_id, &view, output_format).await
        }
        EntryCommands::Show { id } => {
            let entry: Option<Entry> = client.get(&format!("/api/entries/{}", id)).await?;
            let entry = entry.ok_or_else(|| anyhow::anyhow!("Entry {} not found", id))?;
            match output_format {
                OutputFormat::Json => output_json(&entry)?,
                OutputFormat::Text => print_entry(&entry),
            }
            Ok(())
        }
        EntryCommands::Add { glossary_id, term, definition, image, image_url } => {
            let image_url = match image {
                Some(path) => Some(upload_image(client, &path, &ctrl_c_token()).await?.url),
                None => image_url,
            };

            let entry: Entry = client
                .post(
                    &format!("/api/glossaries/{}/entries", glossary_id),
                    &json!({ "term": term, "definition": definition, "imageUrl": image_url }),
                )
                .await?;

            output_success(
                output_format,
                &format!("Added entry {} '{}'", entry.id, entry.term),
                Some(json!({ "entry": entry })),
            )
        }
        EntryCommands::Update { id, term, definition, image_url, clear_image } => {
            let image_url = if clear_image { Some(String::new()) } else { image_url };
            let body = update_body(term, definition, image_url);
            if body.is_empty() {
                anyhow::bail!("Nothing to update; pass --term, --definition, --image-url or --clear-image");
            }

            let entry: Entry = client.patch(&format!("/api/entries/{}", id), &body).await?;
            output_success(
                output_format,
                &format!("Updated entry {} '{}'", entry.id, entry.term),
                Some(json!({ "entry": entry })),
            )
        }
        EntryCommands::Delete { id } => {
            let _: Value = client.delete(&format!("/api/entries/{}", id)).await?;
            output_success(output_format, &format!("Deleted entry {}", id), Some(json!({ "id": id })))
        }
    }
}

async fn list(client: &ApiClient, glossary_id: i64, view: &ViewState, output_format: OutputFormat) -> anyhow::Result<()> {
    let all: Vec<Entry> = client
        .get(&format!("/api/glossaries/{}/entries", glossary_id))
        .await?;

    let results: Vec<Entry> = if view.is_searching() {
        client
            .get_with_query(
                &format!("/api/glossaries/{}/entries/search", glossary_id),
                &[("q", view.search_term.as_str())],
            )
            .await?
    } else {
        Vec::new()
    };

    let organized = view.organize(&all, &results);
    if organized.is_empty() {
        let message = if view.is_searching() {
            format!("No entries match '{}'", view.search_term)
        } else {
            "No entries".to_string()
        };
        return output_empty_collection(output_format, "entries", &message);
    }

    match output_format {
        OutputFormat::Json => output_json(&organized)?,
        OutputFormat::Text => print_organized(&organized),
    }
    Ok(())
}

/// Search wins over the letter, as in the browsing view
fn view_state(search: Option<String>, letter: Option<&str>) -> anyhow::Result<ViewState> {
    let mut view = ViewState::default();
    if let Some(letter) = letter.map(str::trim).filter(|l| !l.is_empty()) {
        if letter.chars().count() != 1 {
            anyhow::bail!("--letter must be a single character, got '{}'", letter);
        }
        view.select_letter(letter);
    }
    if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
        view.set_search(search);
    }
    Ok(view)
}

fn update_body(term: Option<String>, definition: Option<String>, image_url: Option<String>) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(term) = term {
        body.insert("term".into(), Value::String(term));
    }
    if let Some(definition) = definition {
        body.insert("definition".into(), Value::String(definition));
    }
    if let Some(url) = image_url {
        body.insert("imageUrl".into(), Value::String(url));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_state_prefers_search() {
        let view = view_state(Some("or".into()), Some("b")).unwrap();
        assert_eq!(view.search_term, "or");
        assert!(view.selected_letter.is_none());

        let view = view_state(None, Some("b")).unwrap();
        assert_eq!(view.selected_letter.as_deref(), Some("B"));
    }

    #[test]
    fn view_state_keeps_search_spaces_and_ignores_blank_search() {
        let view = view_state(Some("e ".into()), None).unwrap();
        assert_eq!(view.search_term, "e ");

        let view = view_state(Some("   ".into()), Some("c")).unwrap();
        assert!(!view.is_searching());
        assert_eq!(view.selected_letter.as_deref(), Some("C"));
    }

    #[test]
    fn view_state_rejects_multi_character_letter() {
        assert!(view_state(None, Some("AB")).is_err());
    }

    #[test]
    fn update_body_only_carries_given_fields() {
        let body = update_body(None, Some("new".into()), Some(String::new()));
        assert_eq!(Value::Object(body), json!({ "definition": "new", "imageUrl": "" }));
        assert!(update_body(None, None, None).is_empty());
    }
}
