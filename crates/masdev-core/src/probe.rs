//! Run registry probe: which applications does the toolchain report as
//! running right now?
//!
//! The probe is advisory. Every failure degrades to an empty set so the
//! orchestrator can always proceed.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::sink::Sink;
use crate::toolchain::Toolchain;

/// One instance reported by `mas list`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunningInstance {
    pub name: String,
}

/// Names of the running instances at one point in time.
pub type RunningSet = BTreeSet<String>;

fn instance_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Lines look like "  aprenda@hostname".
    PATTERN.get_or_init(|| Regex::new(r"(?m)^\s*(\S+)@").expect("instance pattern is valid"))
}

/// Extract the instances from `mas list` output, in the order listed.
pub fn parse_instances(stdout: &str) -> Vec<RunningInstance> {
    instance_pattern()
        .captures_iter(stdout)
        .filter_map(|caps| caps.get(1))
        .map(|m| RunningInstance {
            name: m.as_str().to_string(),
        })
        .collect()
}

/// Ask the toolchain for running instances.
///
/// Returns an empty set when nothing is running, when the tool says its
/// REST service is not running, or on any other failure. Failures other
/// than "not running" are written to the sink.
pub async fn list_running(toolchain: &dyn Toolchain, cwd: &Path, sink: &mut dyn Sink) -> RunningSet {
    match toolchain.list_instances(cwd).await {
        Ok(out) => {
            let running: RunningSet = parse_instances(&out.stdout)
                .into_iter()
                .map(|i| i.name)
                .collect();
            debug!(count = running.len(), "probed running instances");
            running
        }
        Err(e) if e.is_not_running() => {
            debug!(error = %e, "toolchain service not running; assuming no instances");
            RunningSet::new()
        }
        Err(e) => {
            warn!(error = %e, "failed to list running instances");
            sink.append_line(&format!("⚠️ Error listing MAS: {e}"));
            RunningSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_before_at() {
        let out = "Running MAS:\n  aprenda@my-host\nbob_mas@10.0.0.1 (pid 42)\n";
        let names: Vec<_> = parse_instances(out).into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["aprenda", "bob_mas"]);
    }

    #[test]
    fn ignores_lines_without_at() {
        assert!(parse_instances("no MAS running\n\n").is_empty());
        assert!(parse_instances("").is_empty());
    }

    #[test]
    fn requires_token_directly_before_at() {
        // "@" preceded by whitespace has no name token.
        assert!(parse_instances("   @host\n").is_empty());
    }

    #[test]
    fn only_first_token_of_line_counts() {
        let names: Vec<_> = parse_instances("  alpha@h1 beta@h2\n")
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["alpha"]);
    }
}
