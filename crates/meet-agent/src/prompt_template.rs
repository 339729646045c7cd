use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

use crate::tools::{DRIVE_DOWNLOAD_FILE, DRIVE_LIST_FILES};

const SYSTEM_PROMPT: &str = include_str!("prompts/system.md");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

#[derive(Serialize)]
struct SystemContext<'a> {
    weekday: String,
    date: String,
    year: i32,
    drive_enabled: bool,
    list_files_tool: &'a str,
    download_file_tool: &'a str,
}

/// Render the system prompt for a conversation happening on `today`.
///
/// Drive instructions are only included when Drive tools are offered.
pub fn system_prompt(today: NaiveDate, drive_enabled: bool) -> Result<String, TeraError> {
    let context = SystemContext {
        weekday: today.format("%A").to_string(),
        date: today.format("%B %d, %Y").to_string(),
        year: today.year(),
        drive_enabled,
        list_files_tool: DRIVE_LIST_FILES,
        download_file_tool: DRIVE_DOWNLOAD_FILE,
    };
    load_prompt(SYSTEM_PROMPT, &context)
}
