//! Best-effort extraction of phases from free-form model output.
//!
//! Formats are tried in order: JSON (fenced or bare), numbered lines, then
//! markdown headings. An empty result means the response was unusable.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use taskpilot_core::Phase;

/// Keys that may hold the phase array in a JSON object
const PHASE_KEYS: &[&str] = &["phases", "steps", "plan"];
/// Keys that may hold a phase name
const NAME_KEYS: &[&str] = &["name", "title", "phase"];
/// Keys that may hold a phase description
const DESCRIPTION_KEYS: &[&str] = &["description", "details", "summary"];

static FENCED_BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"(?s)```[A-Za-z]*\s*\n(.*?)```") {
        Ok(regex) => regex,
        Err(err) => panic!("Fenced block regex is invalid: {err}"),
    });

static NUMBERED_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"(?i)^\s*(?:#{1,6}\s*)?(?:[-*]\s+)?(\*\*)?(?:step|phase)?\s*\d+\s*[.):-]\s*(.+)$") {
        Ok(regex) => regex,
        Err(err) => panic!("Numbered line regex is invalid: {err}"),
    }
});

static HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^(#{1,6})\s+(.+)$") {
    Ok(regex) => regex,
    Err(err) => panic!("Heading regex is invalid: {err}"),
});

static PHASE_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"(?i)^(?:step|phase)\s*\d+\s*[.):-]?\s*") {
        Ok(regex) => regex,
        Err(err) => panic!("Phase prefix regex is invalid: {err}"),
    });

/// Extracts ordered phases from a model response.
///
/// Returns an empty list when no recognizable structure is present.
#[must_use]
pub fn parse_phases(response: &str) -> Vec<Phase> {
    if let Some(phases) = parse_json(response) {
        tracing::debug!("Parsed {} phases from JSON", phases.len());
        return phases;
    }

    let numbered = parse_numbered(response);
    if !numbered.is_empty() {
        tracing::debug!("Parsed {} phases from numbered lines", numbered.len());
        return numbered;
    }

    let headed = parse_headings(response);
    if !headed.is_empty() {
        tracing::debug!("Parsed {} phases from headings", headed.len());
    }
    headed
}

/// Tries fenced blocks, the whole text, then the outermost brace or bracket span.
fn parse_json(response: &str) -> Option<Vec<Phase>> {
    let mut candidates: Vec<&str> = FENCED_BLOCK_REGEX
        .captures_iter(response)
        .filter_map(|captures| captures.get(1).map(|block| block.as_str()))
        .collect();
    candidates.push(response.trim());
    candidates.extend(outer_span(response, '{', '}'));
    candidates.extend(outer_span(response, '[', ']'));

    candidates.into_iter().find_map(|candidate| {
        serde_json::from_str::<Value>(candidate.trim())
            .ok()
            .and_then(|value| phases_from_value(&value))
    })
}

fn outer_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn phases_from_value(value: &Value) -> Option<Vec<Phase>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => PHASE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))?,
        _ => return None,
    };

    let phases: Vec<Phase> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| phase_from_item(index, item))
        .collect();

    (!phases.is_empty()).then_some(phases)
}

fn phase_from_item(index: usize, item: &Value) -> Option<Phase> {
    match item {
        Value::String(text) => phase_from_text(text),
        Value::Object(map) => {
            let first_string = |keys: &[&str]| {
                keys.iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
            };
            let description = first_string(DESCRIPTION_KEYS);
            let name = first_string(NAME_KEYS)
                .map(clean_name)
                .filter(|name| !name.is_empty());

            match (name, description) {
                (None, None) => None,
                (Some(name), None) => Some(Phase::new(name.clone(), name)),
                (name, Some(description)) => Some(Phase::new(
                    name.unwrap_or_else(|| format!("Phase {}", index + 1)),
                    description,
                )),
            }
        }
        _ => None,
    }
}

/// Builds a phase from one line of text: `**Name** rest`, `Name: rest`, or `Name - rest`.
fn phase_from_text(text: &str) -> Option<Phase> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (raw_name, description) = split_name(text);
    let name = clean_name(raw_name);
    if name.is_empty() {
        return None;
    }
    let description = if description.is_empty() {
        raw_name.trim().to_owned()
    } else {
        description.to_owned()
    };
    Some(Phase::new(name, description))
}

fn split_name(text: &str) -> (&str, &str) {
    if let Some(rest) = text.strip_prefix("**")
        && let Some(end) = rest.find("**")
    {
        let description = rest[end + 2..].trim_start_matches([':', '-', ' ', '\u{2013}']);
        return (&rest[..end], description.trim());
    }

    [": ", " - ", " \u{2013} "]
        .iter()
        .find_map(|separator| text.split_once(separator))
        .map_or((text, ""), |(name, description)| (name, description.trim()))
}

/// Strips "Phase N:" prefixes and markdown emphasis from a phase name.
fn clean_name(raw: &str) -> String {
    let stripped = raw.replace(['*', '`'], "");
    let stripped = stripped.trim().trim_end_matches(':').trim();
    PHASE_PREFIX_REGEX.replace(stripped, "").trim().to_owned()
}

fn parse_numbered(response: &str) -> Vec<Phase> {
    let mut phases = Vec::new();
    let mut continuation = Vec::new();

    let flush = |phases: &mut Vec<Phase>, continuation: &mut Vec<String>| {
        if let Some(last) = phases.last_mut()
            && !continuation.is_empty()
        {
            let extra = continuation.join(" ");
            if last.description == last.name {
                last.description = extra;
            } else {
                last.description = format!("{} {extra}", last.description);
            }
        }
        continuation.clear();
    };

    for line in response.lines() {
        if let Some(captures) = NUMBERED_LINE_REGEX.captures(line) {
            flush(&mut phases, &mut continuation);
            let body = captures.get(2).map_or("", |body| body.as_str());
            // "**1. Name**" puts the opening emphasis before the number.
            let body = if captures.get(1).is_some() && body.contains("**") {
                format!("**{body}")
            } else {
                body.to_owned()
            };
            if let Some(phase) = phase_from_text(&body) {
                phases.push(phase);
            }
        } else if !phases.is_empty() {
            let trimmed = line.trim().trim_start_matches(['-', '*']).trim();
            if HEADING_REGEX.is_match(line.trim()) {
                flush(&mut phases, &mut continuation);
            } else if !trimmed.is_empty() {
                continuation.push(trimmed.to_owned());
            }
        }
    }
    flush(&mut phases, &mut continuation);

    phases
}

/// Uses level-2+ headings as phase names and the text below as descriptions.
fn parse_headings(response: &str) -> Vec<Phase> {
    let mut sections: Vec<(String, Vec<String>)> = Vec::new();
    let mut in_section = false;

    for line in response.lines() {
        if let Some(captures) = HEADING_REGEX.captures(line.trim()) {
            let level = captures.get(1).map_or(0, |hashes| hashes.as_str().len());
            let title = captures.get(2).map_or("", |title| title.as_str());
            in_section = level >= 2;
            if in_section {
                sections.push((title.to_owned(), Vec::new()));
            }
        } else if in_section
            && let Some((_, body)) = sections.last_mut()
        {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                body.push(trimmed.to_owned());
            }
        }
    }

    sections
        .into_iter()
        .filter_map(|(title, body)| {
            let name = clean_name(&title);
            if name.is_empty() {
                return None;
            }
            let description = if body.is_empty() {
                title.trim().to_owned()
            } else {
                body.join(" ")
            };
            Some(Phase::new(name, description))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_core::PhaseStatus;

    fn names(phases: &[Phase]) -> Vec<&str> {
        phases.iter().map(|phase| phase.name.as_str()).collect()
    }

    #[test]
    fn test_parse_json_object() {
        let response = r#"{"phases": [
            {"name": "Analyze", "description": "Survey the layout"},
            {"name": "Move", "description": "Move `main.py` to `src/main.py`"}
        ]}"#;
        let phases = parse_phases(response);
        assert_eq!(names(&phases), ["Analyze", "Move"]);
        assert_eq!(phases[1].description, "Move `main.py` to `src/main.py`");
        assert!(phases.iter().all(|phase| phase.status == PhaseStatus::Pending));
    }

    #[test]
    fn test_parse_fenced_json_with_prose() {
        let response = "Here is the plan:\n```json\n{\"steps\": [{\"title\": \"Phase 1: Inspect\", \"details\": \"Look around\"}, \"Validate: run tests\"]}\n```\nGood luck!";
        let phases = parse_phases(response);
        assert_eq!(names(&phases), ["Inspect", "Validate"]);
        assert_eq!(phases[0].description, "Look around");
        assert_eq!(phases[1].description, "run tests");
    }

    #[test]
    fn test_parse_bare_array_embedded_in_text() {
        let response = "Sure. [{\"name\": \"Analyze\"}, {\"description\": \"Create directory `docs`\"}]";
        let phases = parse_phases(response);
        assert_eq!(names(&phases), ["Analyze", "Phase 2"]);
        assert_eq!(phases[0].description, "Analyze");
        assert_eq!(phases[1].description, "Create directory `docs`");
    }

    #[test]
    fn test_parse_numbered_list_with_continuations() {
        let response = "Plan:\n1. **Analyze** - Review the structure\n   of the project\n2) Organize: Move `a.txt` to `docs/a.txt`\nStep 3: Validate\n";
        let phases = parse_phases(response);
        assert_eq!(names(&phases), ["Analyze", "Organize", "Validate"]);
        assert_eq!(phases[0].description, "Review the structure of the project");
        assert_eq!(phases[1].description, "Move `a.txt` to `docs/a.txt`");
        assert_eq!(phases[2].description, "Validate");
    }

    #[test]
    fn test_parse_numbered_without_separator_keeps_backticks() {
        let phases = parse_phases("1. Create directory `docs`\n2. Move `README.txt` to `docs/`");
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].name, "Create directory docs");
        assert_eq!(phases[0].description, "Create directory `docs`");
    }

    #[test]
    fn test_parse_markdown_headings() {
        let response = "# Plan\nIntro text\n## Analyze\nRead the code.\n## Execute\nApply changes.\nCarefully.\n### Validate\n";
        let phases = parse_phases(response);
        assert_eq!(names(&phases), ["Analyze", "Execute", "Validate"]);
        assert_eq!(phases[1].description, "Apply changes. Carefully.");
        assert_eq!(phases[2].description, "Validate");
    }

    #[test]
    fn test_unstructured_response_yields_nothing() {
        assert!(parse_phases("I cannot help with that.").is_empty());
        assert!(parse_phases("").is_empty());
        assert!(parse_phases("{\"answer\": 42}").is_empty());
    }
}
