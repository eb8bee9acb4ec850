use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::database::models::{Entry, Glossary};
use crate::organizer::OrganizedEntries;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_glossary(glossary: &Glossary) {
    println!("[{}] {}", glossary.id, glossary.title);
    if let Some(description) = &glossary.description {
        println!("    {}", description);
    }
}

pub fn print_entry(entry: &Entry) {
    println!("[{}] {}", entry.id, entry.term);
    for line in entry.definition.lines() {
        println!("    {}", line);
    }
    if let Some(url) = &entry.image_url {
        println!("    image: {}", url);
    }
}

/// Heading of the bucket for entries with an empty term; no initial can produce it
pub const BLANK_HEADING: &str = "(blank)";

/// Letter headings followed by their terms
pub fn print_organized(organized: &OrganizedEntries) {
    for (letter, entries) in &organized.groups {
        let heading = if letter.is_empty() { BLANK_HEADING } else { letter.as_str() };
        println!("{}", heading);
        for entry in entries {
            println!("  [{}] {}  {}", entry.id, entry.term, summary_line(&entry.definition, 60));
        }
    }
    println!("{} entries", organized.entries.len());
}

/// First line of a Markdown definition, cut to `max_chars`
pub fn summary_line(definition: &str, max_chars: usize) -> String {
    let first = definition.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if first.chars().count() <= max_chars {
        first.to_string()
    } else {
        let cut: String = first.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
