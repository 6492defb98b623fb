//! Line classifier: turns raw output from a running JaCaMo application into
//! annotated [`LogLine`] values.
//!
//! The classifier is an ordered rule table. Each rule pairs a predicate with
//! a categorizer; the first rule whose predicate matches decides the
//! category and the display text. Lines no rule claims pass through as
//! [`Category::Plain`]. Nothing here can fail.
//!
//! ```text
//! chunk --split('\n')--> lines --drop blank--> rule table --> Vec<LogLine>
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Markers prepended to the display text of a classified line.
pub mod marker {
    pub const INFO: &str = "ℹ️";
    pub const ERROR: &str = "❌";
    pub const NOTE: &str = "📝";
    pub const SUCCESS: &str = "✅";
    pub const NETWORK: &str = "🌐";
    pub const SPARKLE: &str = "✨";
    pub const ADDED: &str = "➕";
    pub const REMOVED: &str = "➖";
    pub const WARNING: &str = "⚠️";
}

/// Icon attached to an agent message, derived from what the message says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentIcon {
    Treasure,
    Trophy,
    Smug,
    Map,
    Check,
    Blocked,
    Megaphone,
    Bird,
    Agent,
}

impl AgentIcon {
    /// The rendered glyph for this icon.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Treasure => "💰",
            Self::Trophy => "🏆",
            Self::Smug => "😏",
            Self::Map => "🗺️",
            Self::Check => "✔️",
            Self::Blocked => "🚫",
            Self::Megaphone => "📢",
            Self::Bird => "🐦",
            Self::Agent => "🤖",
        }
    }

    /// Pick the icon for an agent's free-text message.
    ///
    /// Matching is case-insensitive; the first matching group wins and the
    /// generic agent icon is the fallback.
    pub fn for_message(message: &str) -> Self {
        const GROUPS: &[(&[&str], AgentIcon)] = &[
            (&["gold"], AgentIcon::Treasure),
            (&["winning", "winner", "leader"], AgentIcon::Trophy),
            (&["brag"], AgentIcon::Smug),
            (
                &["location", "going to", "moving to", "near"],
                AgentIcon::Map,
            ),
            (&["reached"], AgentIcon::Check),
            (&["not reachable", "unreachable"], AgentIcon::Blocked),
            (&["broadcast"], AgentIcon::Megaphone),
            (&["tweet"], AgentIcon::Bird),
        ];

        let lower = message.to_lowercase();
        GROUPS
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
            .map(|(_, icon)| *icon)
            .unwrap_or(AgentIcon::Agent)
    }
}

/// The closed set of categories a line can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "icon", rename_all = "snake_case")]
pub enum Category {
    /// A line the runtime labels `Error:` that is really a status message.
    Informational,
    Error,
    RawOutput,
    BuildSuccess,
    ServiceUp,
    ParseOk,
    AgentMessage(AgentIcon),
    BeliefAdded,
    BeliefRemoved,
    /// Anything written to stderr.
    Warning,
    Plain,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Informational => "informational",
            Self::Error => "error",
            Self::RawOutput => "raw_output",
            Self::BuildSuccess => "build_success",
            Self::ServiceUp => "service_up",
            Self::ParseOk => "parse_ok",
            Self::AgentMessage(_) => "agent_message",
            Self::BeliefAdded => "belief_added",
            Self::BeliefRemoved => "belief_removed",
            Self::Warning => "warning",
            Self::Plain => "plain",
        };
        f.write_str(s)
    }
}

/// One classified line of process output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    /// The line as received, without the trailing newline.
    pub raw: String,
    pub category: Category,
    /// The rewritten line with its marker, ready for the sink.
    pub display_text: String,
}

impl LogLine {
    fn new(raw: &str, category: Category, display_text: String) -> Self {
        Self {
            raw: raw.to_string(),
            category,
            display_text,
        }
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Substrings that turn an `Error:` line into an informational one.
const BENIGN_ERROR_MARKERS: &[&str] = &["[Moise]", "[Cartago]", "focus on", "join workspace"];

/// Substrings announcing that one of the runtime's services is up.
const SERVICE_MARKERS: &[&str] = &[
    "Runtime Services",
    "Agent mind inspector",
    "CArtAgO Http Server",
    "Moise Http Server",
];

/// A single classification rule.
struct Rule {
    matches: fn(&str) -> bool,
    categorize: fn(&str) -> (Category, String),
}

/// Rules in priority order. The `Error:` informational check must stay
/// ahead of the generic `Error:` check.
const STDOUT_RULES: &[Rule] = &[
    Rule {
        matches: |line| {
            line.contains("Error:") && BENIGN_ERROR_MARKERS.iter().any(|m| line.contains(m))
        },
        categorize: |line| {
            (
                Category::Informational,
                prefixed(marker::INFO, &strip_label(line, "Error:")),
            )
        },
    },
    Rule {
        matches: |line| line.contains("Error:"),
        categorize: |line| {
            (
                Category::Error,
                prefixed(marker::ERROR, &strip_label(line, "Error:")),
            )
        },
    },
    Rule {
        matches: |line| line.contains("Output:"),
        categorize: |line| {
            (
                Category::RawOutput,
                prefixed(marker::NOTE, &strip_label(line, "Output:")),
            )
        },
    },
    Rule {
        matches: |line| line.contains("BUILD SUCCESSFUL"),
        categorize: |line| (Category::BuildSuccess, prefixed(marker::SUCCESS, line.trim())),
    },
    Rule {
        matches: |line| SERVICE_MARKERS.iter().any(|m| line.contains(m)),
        categorize: |line| (Category::ServiceUp, prefixed(marker::NETWORK, line.trim())),
    },
    Rule {
        matches: |line| line.contains("parsed successfully"),
        categorize: |line| (Category::ParseOk, prefixed(marker::SPARKLE, line.trim())),
    },
    Rule {
        matches: |line| agent_message(line).is_some(),
        categorize: |line| match agent_message(line) {
            Some((name, message)) => {
                let icon = AgentIcon::for_message(message);
                (
                    Category::AgentMessage(icon),
                    format!("{} [{name}] {message}", icon.glyph()),
                )
            }
            None => (Category::Plain, line.trim().to_string()),
        },
    },
    Rule {
        matches: |line| line.trim().starts_with('+'),
        categorize: |line| (Category::BeliefAdded, prefixed(marker::ADDED, line.trim())),
    },
    Rule {
        matches: |line| line.trim().starts_with('-'),
        categorize: |line| (Category::BeliefRemoved, prefixed(marker::REMOVED, line.trim())),
    },
];

fn prefixed(marker: &str, text: &str) -> String {
    format!("{marker} {text}")
}

/// Remove the first occurrence of `label` and trim what is left.
fn strip_label(line: &str, label: &str) -> String {
    line.replacen(label, "", 1).trim().to_string()
}

fn agent_message_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*\[([^\[\]]+)\]\s*(\S.*?)\s*$").expect("agent message pattern is valid")
    })
}

/// Split `[name] message` into its parts.
fn agent_message(line: &str) -> Option<(&str, &str)> {
    let caps = agent_message_pattern().captures(line)?;
    let name = caps.get(1)?.as_str();
    let message = caps.get(2)?.as_str();
    Some((name, message))
}

fn classify_line(line: &str) -> LogLine {
    for rule in STDOUT_RULES {
        if (rule.matches)(line) {
            let (category, display_text) = (rule.categorize)(line);
            return LogLine::new(line, category, display_text);
        }
    }
    LogLine::new(line, Category::Plain, line.trim().to_string())
}

fn non_blank_lines(chunk: &str) -> impl Iterator<Item = &str> {
    chunk.split('\n').filter(|line| !line.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Classify a chunk of standard output.
pub fn classify_stdout(chunk: &str) -> Vec<LogLine> {
    non_blank_lines(chunk).map(classify_line).collect()
}

/// Classify a chunk of standard error. Every non-blank line is a warning.
pub fn classify_stderr(chunk: &str) -> Vec<LogLine> {
    non_blank_lines(chunk)
        .map(|line| {
            LogLine::new(
                line,
                Category::Warning,
                prefixed(marker::WARNING, line.trim()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(line: &str) -> LogLine {
        let mut lines = classify_stdout(line);
        assert_eq!(lines.len(), 1, "expected exactly one line for {line:?}");
        lines.remove(0)
    }

    #[test]
    fn whitespace_only_chunk_yields_nothing() {
        assert!(classify_stdout("").is_empty());
        assert!(classify_stdout("   \n\t\n \r\n").is_empty());
        assert!(classify_stderr("\n\n   ").is_empty());
    }

    #[test]
    fn splits_on_newlines_and_keeps_order() {
        let lines = classify_stdout("first\n\nsecond\r\nthird");
        let texts: Vec<_> = lines.iter().map(|l| l.display_text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn moise_error_is_informational() {
        let line = one("[Moise] Error: group created");
        assert_eq!(line.category, Category::Informational);
        assert_eq!(line.display_text, "ℹ️ [Moise] group created");
    }

    #[test]
    fn every_benign_marker_downgrades_error() {
        for text in [
            "[Cartago] Error: artifact made",
            "Error: bob focus on art1",
            "Error: alice join workspace w1",
        ] {
            assert_eq!(one(text).category, Category::Informational, "{text}");
        }
    }

    #[test]
    fn plain_error_is_error() {
        let line = one("  Error: could not parse agent bob  ");
        assert_eq!(line.category, Category::Error);
        assert_eq!(line.display_text, "❌ could not parse agent bob");
    }

    #[test]
    fn only_first_error_label_is_stripped() {
        let line = one("Error: nested Error: again");
        assert_eq!(line.display_text, "❌ nested Error: again");
    }

    #[test]
    fn error_takes_priority_over_output() {
        let line = one("Output: Error: both");
        assert_eq!(line.category, Category::Error);
    }

    #[test]
    fn output_label_is_raw_output() {
        let line = one("Output: 42");
        assert_eq!(line.category, Category::RawOutput);
        assert_eq!(line.display_text, "📝 42");
    }

    #[test]
    fn build_success() {
        let line = one("BUILD SUCCESSFUL in 3s");
        assert_eq!(line.category, Category::BuildSuccess);
        assert_eq!(line.display_text, "✅ BUILD SUCCESSFUL in 3s");
    }

    #[test]
    fn service_lines() {
        for text in [
            "JaCaMo Runtime Services (JRS) running on 127.0.0.1",
            "Agent mind inspector is running at http://127.0.0.1:3272",
            "CArtAgO Http Server running on http://127.0.0.1:3273",
            "Moise Http Server running on http://127.0.0.1:3271",
        ] {
            let line = one(text);
            assert_eq!(line.category, Category::ServiceUp, "{text}");
            assert!(line.display_text.starts_with("🌐 "));
        }
    }

    #[test]
    fn parsed_successfully() {
        assert_eq!(one("bob.asl parsed successfully!").category, Category::ParseOk);
    }

    #[test]
    fn agent_message_with_gold() {
        let line = one("[bob] found gold near the cave");
        assert_eq!(line.category, Category::AgentMessage(AgentIcon::Treasure));
        assert_eq!(line.display_text, "💰 [bob] found gold near the cave");
    }

    #[test]
    fn agent_message_icons_follow_priority() {
        let cases = [
            ("[a] I am the winner", AgentIcon::Trophy),
            ("[a] current LEADER is me", AgentIcon::Trophy),
            ("[a] let me brag a bit", AgentIcon::Smug),
            ("[a] moving to (3,4)", AgentIcon::Map),
            ("[a] my location is 3,4", AgentIcon::Map),
            ("[a] target reached", AgentIcon::Check),
            ("[a] target unreachable", AgentIcon::Blocked),
            ("[a] host not reachable", AgentIcon::Blocked),
            ("[a] broadcast sent", AgentIcon::Megaphone),
            ("[a] new tweet", AgentIcon::Bird),
            ("[a] hello world", AgentIcon::Agent),
        ];
        for (text, icon) in cases {
            assert_eq!(one(text).category, Category::AgentMessage(icon), "{text}");
        }
    }

    #[test]
    fn agent_message_is_normalised() {
        let line = one("   [alice]    hi there   ");
        assert_eq!(line.display_text, "🤖 [alice] hi there");
        assert_eq!(line.raw, "   [alice]    hi there   ");
    }

    #[test]
    fn bracket_without_message_is_plain() {
        assert_eq!(one("[alice]").category, Category::Plain);
    }

    #[test]
    fn belief_changes() {
        let added = one("  +at(home)");
        assert_eq!(added.category, Category::BeliefAdded);
        assert_eq!(added.display_text, "➕ +at(home)");

        let removed = one("-at(home)");
        assert_eq!(removed.category, Category::BeliefRemoved);
        assert_eq!(removed.display_text, "➖ -at(home)");
    }

    #[test]
    fn unmatched_line_is_plain_and_trimmed() {
        let line = one("  just some text \t");
        assert_eq!(line.category, Category::Plain);
        assert_eq!(line.display_text, "just some text");
    }

    #[test]
    fn stderr_is_always_warning() {
        let lines = classify_stderr("Error: [Moise] x\nBUILD SUCCESSFUL\n[bob] gold\n");
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.category, Category::Warning);
            assert!(line.display_text.starts_with("⚠️ "));
        }
    }

    #[test]
    fn markers_never_trigger_a_rule() {
        let markers = [
            marker::INFO,
            marker::ERROR,
            marker::NOTE,
            marker::SUCCESS,
            marker::NETWORK,
            marker::SPARKLE,
            marker::ADDED,
            marker::REMOVED,
            marker::WARNING,
            AgentIcon::Treasure.glyph(),
            AgentIcon::Trophy.glyph(),
            AgentIcon::Smug.glyph(),
            AgentIcon::Map.glyph(),
            AgentIcon::Check.glyph(),
            AgentIcon::Blocked.glyph(),
            AgentIcon::Megaphone.glyph(),
            AgentIcon::Bird.glyph(),
            AgentIcon::Agent.glyph(),
        ];
        for m in markers {
            let line = one(&format!("{m} plain words"));
            assert_eq!(line.category, Category::Plain, "marker {m} acted as a trigger");
        }
    }

    #[test]
    fn reclassifying_display_text_is_stable() {
        let chunk = "Error: boom\nOutput: 1\n[bob] gold\n+b\nsomething";
        let first = classify_stdout(chunk);
        let again: String = first
            .iter()
            .map(|l| l.display_text.clone())
            .collect::<Vec<_>>()
            .join("\n");
        let second = classify_stdout(&again);
        assert_eq!(second.len(), first.len());
        // Stripped labels and leading markers leave nothing to match.
        assert!(second.iter().all(|l| l.category == Category::Plain));
    }
}
