//! Prompt loading utilities
//!
//! Each prompt file is a markdown document with Usage and Prompt sections.
//! Prompts are embedded at compile time using `include_str!`.

use crate::{Error, Result};

// Embed prompt files at compile time
const PLANNER_PERSONA_MD: &str = include_str!("../../../../prompts/planner_persona.md");
const TASK_PLANNING_MD: &str = include_str!("../../../../prompts/task_planning.md");

/// Loads a prompt by name
///
/// # Errors
/// Returns an error if the prompt name is unknown or the prompt section cannot be extracted
pub fn load_prompt(name: &str) -> Result<String> {
    let content = match name {
        "planner_persona" => PLANNER_PERSONA_MD,
        "task_planning" => TASK_PLANNING_MD,
        _ => return Err(Error::Config(format!("Unknown prompt: {name}"))),
    };

    extract_prompt_section(content)
}

/// Replaces every `{key}` placeholder in `template` with its value.
#[must_use]
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_owned(), |rendered, (key, value)| {
            rendered.replace(&format!("{{{key}}}"), value)
        })
}

/// Extracts the Prompt section from a markdown file
///
/// # Errors
/// Returns an error if the Prompt section cannot be found
fn extract_prompt_section(content: &str) -> Result<String> {
    let prompt_start = content
        .find("## Prompt")
        .ok_or_else(|| Error::Config("Prompt section not found".to_owned()))?;

    // Skip past the header line
    let prompt_content_start = content[prompt_start..]
        .find('\n')
        .ok_or_else(|| Error::Config("Invalid prompt format".to_owned()))?
        + prompt_start
        + 1;

    // All prompt files have ## Prompt as the last top-level section
    Ok(content[prompt_content_start..].trim().to_owned())
}
