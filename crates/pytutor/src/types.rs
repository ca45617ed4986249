//! Foundational public types for the pytutor library.
//!
//! This module defines the core data structures used throughout the library:
//! - [`ExecutionSettings`] — configuration for a single snippet execution
//! - [`ExecutionResult`] / [`ExecutionOutcome`] / [`Fault`] — structured run results
//! - [`GeneratedExample`] — a labeled, generated example program
//! - [`DEFAULT_ALLOWED_MODULES`] — the default set of permitted stdlib modules

use serde::{Deserialize, Serialize};

/// The default set of Python standard library modules tutor snippets may import.
///
/// Covers what lesson examples and learner experiments commonly reach for,
/// while excluding network, filesystem, and subprocess modules that would
/// defeat the sandbox.
pub const DEFAULT_ALLOWED_MODULES: &[&str] = &[
    "math",
    "string",
    "random",
    "collections",
    "itertools",
    "functools",
    "re",
    "json",
];

/// Configuration that governs how a single snippet is executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Maximum wall-clock time in milliseconds before the run is abandoned.
    /// Default: 2,000 ms.
    pub timeout_ms: u64,

    /// Maximum number of bytes that may be written to stdout + stderr combined.
    /// Default: 65,536 bytes (64 KiB).
    pub max_output_bytes: usize,

    /// Python module names the snippet is permitted to import. An `import` of
    /// anything else produces [`Fault::ImportDenied`].
    pub allowed_modules: Vec<String>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            max_output_bytes: 65_536,
            allowed_modules: DEFAULT_ALLOWED_MODULES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A fault raised while compiling or running a snippet.
///
/// Serialized with an internally-tagged `"kind"` discriminator so JSON
/// consumers can switch on `fault.kind` without a wrapper object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Fault {
    /// The source could not be parsed.
    Syntax {
        /// Human-readable description of the parse error.
        message: String,
        /// 1-based line number, or 0 if unknown.
        line: u32,
        /// 1-based column number, or 0 if unknown.
        col: u32,
    },

    /// A Python exception escaped the snippet.
    Runtime {
        /// The exception message (e.g. `"division by zero"`).
        message: String,
        /// Python-formatted traceback, or empty if unavailable.
        traceback: String,
    },

    /// Combined stdout + stderr exceeded [`ExecutionSettings::max_output_bytes`].
    OutputLimit {
        /// The byte budget that was exceeded.
        limit_bytes: usize,
    },

    /// The snippet imported a module outside the allowlist.
    ImportDenied {
        /// The exact module name that was denied.
        module: String,
    },
}

/// How a snippet execution ended.
///
/// A fault aborts the remaining statements; output captured up to the fault
/// point is preserved on the surrounding [`ExecutionResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ExecutionOutcome {
    /// The snippet ran to completion.
    Completed,

    /// The run exceeded [`ExecutionSettings::timeout_ms`] and was abandoned.
    TimedOut {
        /// The timeout limit that was exceeded, in milliseconds.
        limit_ms: u64,
    },

    /// The run was terminated by a [`Fault`].
    Faulted { fault: Fault },
}

impl ExecutionOutcome {
    /// `true` when the snippet ran to completion.
    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed)
    }

    /// The fault that ended the run, if any.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            ExecutionOutcome::Faulted { fault } => Some(fault),
            _ => None,
        }
    }
}

/// The result of executing a snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Everything written to `sys.stdout` during the run (UTF-8).
    pub stdout: String,

    /// Everything written to `sys.stderr` during the run (UTF-8).
    pub stderr: String,

    /// How the run ended.
    pub outcome: ExecutionOutcome,

    /// Elapsed wall-clock time in milliseconds.
    pub duration_ms: u64,
}

/// A generated example program: display label plus source text.
///
/// Ephemeral — produced per display request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedExample {
    /// Display label, `"Example 1"`, `"Example 2"`, …
    pub label: String,
    /// The example's Python source text.
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── ExecutionSettings::default() field assertions ─────────────────────────

    #[test]
    fn test_execution_settings_default_timeout_ms() {
        let settings = ExecutionSettings::default();
        assert_eq!(settings.timeout_ms, 2_000);
    }

    #[test]
    fn test_execution_settings_default_max_output_bytes() {
        let settings = ExecutionSettings::default();
        assert_eq!(settings.max_output_bytes, 65_536);
    }

    #[test]
    fn test_execution_settings_default_allowed_modules() {
        let settings = ExecutionSettings::default();
        assert_eq!(settings.allowed_modules.len(), DEFAULT_ALLOWED_MODULES.len());
        for module in DEFAULT_ALLOWED_MODULES {
            assert!(
                settings.allowed_modules.contains(&module.to_string()),
                "Expected '{}' in default allowed_modules",
                module
            );
        }
    }

    // ── Outcome helpers ───────────────────────────────────────────────────────

    #[test]
    fn test_outcome_is_completed() {
        assert!(ExecutionOutcome::Completed.is_completed());
        assert!(!ExecutionOutcome::TimedOut { limit_ms: 100 }.is_completed());
    }

    #[test]
    fn test_outcome_fault_accessor() {
        let outcome = ExecutionOutcome::Faulted {
            fault: Fault::ImportDenied {
                module: "socket".to_string(),
            },
        };
        match outcome.fault() {
            Some(Fault::ImportDenied { module }) => assert_eq!(module, "socket"),
            other => panic!("expected ImportDenied fault, got {:?}", other),
        }
        assert!(ExecutionOutcome::Completed.fault().is_none());
    }

    // ── Serde round-trips ─────────────────────────────────────────────────────

    #[test]
    fn test_fault_syntax_round_trip() {
        let fault = Fault::Syntax {
            message: "invalid syntax".to_string(),
            line: 1,
            col: 5,
        };
        let json = serde_json::to_string(&fault).expect("serialize Syntax");
        assert!(
            json.contains(r#""kind":"Syntax""#),
            "JSON should contain kind discriminator: {json}"
        );
        assert!(json.contains(r#""line":1"#));
        let back: Fault = serde_json::from_str(&json).expect("deserialize Syntax");
        assert_eq!(back, fault);
    }

    #[test]
    fn test_fault_runtime_round_trip() {
        let fault = Fault::Runtime {
            message: "division by zero".to_string(),
            traceback: "Traceback (most recent call last):\n  ...".to_string(),
        };
        let json = serde_json::to_string(&fault).expect("serialize Runtime");
        assert!(json.contains(r#""kind":"Runtime""#));
        assert!(json.contains(r#""message":"division by zero""#));
        let back: Fault = serde_json::from_str(&json).expect("deserialize Runtime");
        assert_eq!(back, fault);
    }

    #[test]
    fn test_outcome_timed_out_round_trip() {
        let outcome = ExecutionOutcome::TimedOut { limit_ms: 2_000 };
        let json = serde_json::to_string(&outcome).expect("serialize TimedOut");
        assert!(
            json.contains(r#""status":"TimedOut""#),
            "JSON should contain status discriminator: {json}"
        );
        assert!(json.contains(r#""limit_ms":2000"#));
        let back: ExecutionOutcome = serde_json::from_str(&json).expect("deserialize TimedOut");
        assert_eq!(back, outcome);
    }

    #[test]
    fn test_outcome_faulted_output_limit_round_trip() {
        let outcome = ExecutionOutcome::Faulted {
            fault: Fault::OutputLimit { limit_bytes: 65_536 },
        };
        let json = serde_json::to_string(&outcome).expect("serialize Faulted");
        assert!(json.contains(r#""status":"Faulted""#));
        assert!(json.contains(r#""kind":"OutputLimit""#));
        assert!(json.contains(r#""limit_bytes":65536"#));
        let back: ExecutionOutcome = serde_json::from_str(&json).expect("deserialize Faulted");
        assert_eq!(back, outcome);
    }

    #[test]
    fn test_generated_example_round_trip() {
        let example = GeneratedExample {
            label: "Example 1".to_string(),
            source: "print(1)".to_string(),
        };
        let json = serde_json::to_string(&example).expect("serialize GeneratedExample");
        let back: GeneratedExample = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, example);
    }
}
