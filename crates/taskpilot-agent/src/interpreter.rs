//! Instruction parsing: keyword matching from free text to a `TaskDescriptor`.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use taskpilot_core::{Action, Error, Priority, Result, TaskDescriptor};

/// Words, allowing inner apostrophes ("don't")
static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"[A-Za-z][A-Za-z'’]*") {
    Ok(regex) => regex,
    Err(err) => panic!("Word regex is invalid: {err}"),
});

/// Goal markers, longest first so "with the goal to" is not cut at "with the goal".
const GOAL_MARKERS: &[&str] = &[
    "with the goal to ",
    "with the goal of ",
    "with goal to ",
    "with goal of ",
    "with the goal ",
    "with goal ",
];

/// Sentence openers that make a sentence a constraint.
const CONSTRAINT_MARKERS: &[&str] = &["only ", "don't ", "don’t ", "do not ", "must "];

/// Words after which a path-like token is taken as the target.
const TARGET_PREPOSITIONS: &[&str] = &["on", "in", "under", "at", "inside"];

const HIGH_PRIORITY_MARKERS: &[&str] = &["urgent", "critical", "asap", "high priority"];
const LOW_PRIORITY_MARKERS: &[&str] = &["low priority", "when possible", "eventually"];

/// Parses instructions of the form "ACTION [on TARGET] with goal to GOAL. [constraints]".
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskInterpreter;

impl TaskInterpreter {
    /// Create a new interpreter
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse an instruction into a task descriptor.
    ///
    /// # Errors
    /// Returns `Error::Interpretation` if no action keyword is present.
    pub fn parse(&self, instruction: &str) -> Result<TaskDescriptor> {
        let trimmed = instruction.trim();
        if trimmed.is_empty() {
            return Err(Error::Interpretation("instruction is empty".to_owned()));
        }

        let (constraints, body): (Vec<&str>, Vec<&str>) = split_sentences(trimmed)
            .into_iter()
            .partition(|sentence| is_constraint(sentence));

        // Everything before the goal marker is where the action and target live.
        let mut head = String::new();
        let mut goal = None;
        for sentence in &body {
            if let Some((before, after)) = split_at_goal_marker(sentence) {
                head.push_str(before);
                goal = Some(after.trim().to_owned());
                break;
            }
            head.push_str(sentence);
            head.push_str(". ");
        }

        let (action, keyword_end) = find_action(&head)
            .or_else(|| find_action(trimmed).map(|(action, _)| (action, head.len())))
            .ok_or_else(|| {
                Error::Interpretation(format!(
                    "no recognizable action in '{trimmed}' (expected one of: {})",
                    Action::ALL
                        .iter()
                        .map(|action| action.verb())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;

        let target = find_target(&head);

        let goal = goal
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| remainder_goal(&head, keyword_end, target.as_deref(), action));

        let descriptor = TaskDescriptor {
            action,
            target: target.map_or_else(|| PathBuf::from("."), PathBuf::from),
            goal,
            constraints: constraints.into_iter().map(str::to_owned).collect(),
            priority: detect_priority(trimmed),
        };

        tracing::debug!(
            "Interpreted instruction: action={}, target={}, goal={:?}, constraints={}",
            descriptor.action,
            descriptor.target.display(),
            descriptor.goal,
            descriptor.constraints.len()
        );

        Ok(descriptor)
    }
}

/// Splits text into trimmed sentences at `.`, `!`, `?`, `;` or newlines.
///
/// A period only ends a sentence when followed by whitespace or the end of the
/// text, so file names like `main.rs` stay intact.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, character)) = chars.next() {
        let next_is_break = chars
            .peek()
            .is_none_or(|(_, next)| next.is_whitespace());
        let ends = match character {
            '\n' | ';' => true,
            '.' | '!' | '?' => next_is_break,
            _ => false,
        };
        if ends {
            sentences.push(&text[start..index]);
            start = index + character.len_utf8();
        }
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

fn is_constraint(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();
    CONSTRAINT_MARKERS
        .iter()
        .any(|marker| lower.starts_with(marker))
}

/// Splits a sentence around the first goal marker.
fn split_at_goal_marker(sentence: &str) -> Option<(&str, &str)> {
    // ASCII lowercasing keeps byte offsets aligned with the original text.
    let lower = sentence.to_ascii_lowercase();
    GOAL_MARKERS.iter().find_map(|marker| {
        lower
            .find(marker)
            .map(|position| (&sentence[..position], &sentence[position + marker.len()..]))
    })
}

/// Maps a single lowercase word to an action.
fn action_for_word(word: &str) -> Option<Action> {
    const PREFIXES: &[(&str, Action)] = &[
        ("organiz", Action::Organize),
        ("organis", Action::Organize),
        ("reorganiz", Action::Organize),
        ("reorganis", Action::Organize),
        ("refactor", Action::Refactor),
        ("upgrad", Action::Upgrade),
        ("analyz", Action::Analyze),
        ("analys", Action::Analyze),
        ("document", Action::Document),
        ("optimiz", Action::Optimize),
        ("optimis", Action::Optimize),
        ("secur", Action::Secure),
    ];
    const EXACT: &[(&str, Action)] = &[
        ("test", Action::Test),
        ("tests", Action::Test),
        ("testing", Action::Test),
        ("tested", Action::Test),
        ("fix", Action::Fix),
        ("fixes", Action::Fix),
        ("fixing", Action::Fix),
        ("fixed", Action::Fix),
    ];

    EXACT
        .iter()
        .find(|(exact, _)| word == *exact)
        .or_else(|| PREFIXES.iter().find(|(prefix, _)| word.starts_with(prefix)))
        .map(|(_, action)| *action)
}

/// First action keyword in reading order, with the byte offset just past it.
fn find_action(text: &str) -> Option<(Action, usize)> {
    WORD_REGEX.find_iter(text).find_map(|found| {
        action_for_word(&found.as_str().to_lowercase()).map(|action| (action, found.end()))
    })
}

/// Strips quotes, backticks, and trailing punctuation from a token.
fn clean_token(token: &str) -> &str {
    const TRAILING: [char; 4] = [',', ':', ';', '.'];
    token
        .trim_end_matches(TRAILING)
        .trim_matches(|character: char| matches!(character, '`' | '"' | '\'' | '(' | ')'))
        .trim_end_matches(TRAILING)
}

/// Whether a token names a path rather than an ordinary word.
fn is_path_like(token: &str) -> bool {
    let cleaned = clean_token(token);
    if cleaned.is_empty() || cleaned.contains("://") {
        return false;
    }
    cleaned.contains('/')
        || cleaned.contains('\\')
        || cleaned.starts_with('~')
        || cleaned.starts_with('.')
        || is_file_name(cleaned)
}

/// `name.ext` with an extension that starts with a letter; rejects version
/// numbers ("v1.2") and dotted abbreviations ("e.g").
fn is_file_name(token: &str) -> bool {
    let Some((stem, ext)) = token.rsplit_once('.') else {
        return false;
    };
    let abbreviation = token.split('.').all(|segment| segment.chars().count() == 1);
    !stem.is_empty()
        && ext.starts_with(|character: char| character.is_ascii_alphabetic())
        && !abbreviation
}

/// First path-like token right after an action keyword or a target preposition.
fn find_target(head: &str) -> Option<String> {
    let tokens: Vec<&str> = head.split_whitespace().collect();
    tokens.windows(2).find_map(|pair| {
        let previous = clean_token(pair[0]).to_lowercase();
        let introduces_target = TARGET_PREPOSITIONS.contains(&previous.as_str())
            || action_for_word(&previous).is_some();
        (introduces_target && is_path_like(pair[1])).then(|| clean_token(pair[1]).to_owned())
    })
}

/// Goal taken from the text after the action keyword when no goal marker exists.
fn remainder_goal(head: &str, keyword_end: usize, target: Option<&str>, action: Action) -> String {
    let mut remainder = head.get(keyword_end..).unwrap_or_default().trim();
    remainder = remainder.trim_end_matches(['.', ' ']);

    if let Some(target) = target {
        let mut words = remainder.splitn(2, char::is_whitespace);
        if words.next().is_some_and(|first| clean_token(first) == target) {
            remainder = words.next().unwrap_or_default().trim();
        }
    }

    let remainder = remainder.strip_prefix("to ").unwrap_or(remainder).trim();
    if remainder.is_empty() {
        action.verb().to_owned()
    } else {
        remainder.to_owned()
    }
}

fn detect_priority(instruction: &str) -> Priority {
    let lower = instruction.to_lowercase();
    if HIGH_PRIORITY_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
    {
        Priority::High
    } else if LOW_PRIORITY_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
    {
        Priority::Low
    } else {
        Priority::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(instruction: &str) -> TaskDescriptor {
        TaskInterpreter::new()
            .parse(instruction)
            .unwrap_or_else(|err| panic!("'{instruction}' should parse: {err}"))
    }

    #[test]
    fn test_organize_with_goal() {
        let task = parse("Use assistant to organize the codebase with goal to improve maintainability");
        assert_eq!(task.action, Action::Organize);
        assert_eq!(task.goal, "improve maintainability");
        assert_eq!(task.target, PathBuf::from("."));
        assert!(task.constraints.is_empty());
        assert_eq!(task.priority, Priority::Normal);
    }

    #[test]
    fn test_every_action_keyword() {
        let cases = [
            ("Organise the repo", Action::Organize),
            ("please REFACTOR the parser", Action::Refactor),
            ("Upgrade dependencies", Action::Upgrade),
            ("Run an analysis of the code", Action::Analyze),
            ("Add tests for the cache", Action::Test),
            ("Write documentation for the API", Action::Document),
            ("Fix the failing build", Action::Fix),
            ("Optimize the hot loop", Action::Optimize),
            ("Improve security of the login flow", Action::Secure),
        ];
        for (instruction, expected) in cases {
            assert_eq!(parse(instruction).action, expected, "{instruction}");
        }
    }

    #[test]
    fn test_first_keyword_in_head_wins() {
        let task = parse("Refactor and test the parser with goal to fix edge cases");
        assert_eq!(task.action, Action::Refactor);
        assert_eq!(task.goal, "fix edge cases");
    }

    #[test]
    fn test_keyword_only_in_goal_is_used() {
        let task = parse("Look over the module with goal to fix the crash");
        assert_eq!(task.action, Action::Fix);
        assert_eq!(task.goal, "fix the crash");
    }

    #[test]
    fn test_fixture_is_not_fix() {
        let result = TaskInterpreter::new().parse("Update the fixtures folder");
        assert!(matches!(result, Err(Error::Interpretation(_))));
    }

    #[test]
    fn test_no_keyword_is_interpretation_error() {
        let result = TaskInterpreter::new().parse("Do something vague");
        assert!(matches!(result, Err(Error::Interpretation(ref message)) if message.contains("Do something vague")));
    }

    #[test]
    fn test_empty_instruction() {
        let result = TaskInterpreter::new().parse("   ");
        assert!(matches!(result, Err(Error::Interpretation(_))));
    }

    #[test]
    fn test_target_and_constraints() {
        let task = parse(
            "Refactor src/parser.rs with goal to reduce duplication. Only touch the parser module. \
             Don't change public APIs. Must keep tests green.",
        );
        assert_eq!(task.action, Action::Refactor);
        assert_eq!(task.target, PathBuf::from("src/parser.rs"));
        assert_eq!(task.goal, "reduce duplication");
        assert_eq!(
            task.constraints,
            vec![
                "Only touch the parser module".to_owned(),
                "Don't change public APIs".to_owned(),
                "Must keep tests green".to_owned(),
            ]
        );
    }

    #[test]
    fn test_target_after_preposition() {
        let task = parse("Perform document on `docs/` with goal to explain setup");
        assert_eq!(task.action, Action::Document);
        assert_eq!(task.target, PathBuf::from("docs/"));
    }

    #[test]
    fn test_version_number_is_not_a_target() {
        let task = parse("Fix the crash in v1.2");
        assert_eq!(task.action, Action::Fix);
        assert_eq!(task.target, PathBuf::from("."));

        assert_eq!(parse("Upgrade to 2.0").target, PathBuf::from("."));
    }

    #[test]
    fn test_abbreviation_is_not_a_target() {
        let task = parse("Document in e.g. plain English with goal to help newcomers");
        assert_eq!(task.target, PathBuf::from("."));
        assert!(!is_path_like("e.g."));
        assert!(!is_path_like("i.e.,"));
    }

    #[test]
    fn test_file_names_are_path_like() {
        assert!(is_path_like("main.py"));
        assert!(is_path_like("archive.tar.gz"));
        assert!(is_path_like("`Cargo.toml`,"));
        assert!(is_path_like("src/v1.2"));
        assert!(!is_path_like("v1.2"));
        assert_eq!(clean_token("`Cargo.toml`,"), "Cargo.toml");
    }

    #[test]
    fn test_goal_from_remainder_without_marker() {
        let task = parse("Optimize ./engine to reduce allocations");
        assert_eq!(task.target, PathBuf::from("./engine"));
        assert_eq!(task.goal, "reduce allocations");

        let bare = parse("Analyze");
        assert_eq!(bare.goal, "analyze");
    }

    #[test]
    fn test_priority_markers() {
        assert_eq!(parse("Urgent: fix the login bug").priority, Priority::High);
        assert_eq!(
            parse("Document the CLI when possible").priority,
            Priority::Low
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let instruction = "Secure the api/ folder with goal to remove hardcoded secrets. Only edit config files.";
        assert_eq!(parse(instruction), parse(instruction));
    }

    #[test]
    fn test_split_sentences_keeps_file_names() {
        assert_eq!(
            split_sentences("Move main.rs now. Then stop!"),
            vec!["Move main.rs now", "Then stop"]
        );
    }
}
