//! One learner's tutoring session: catalog + generator + sandbox, wired.
//!
//! The control flow mirrors the tutor UI: selecting a topic produces a batch
//! of generated examples; any example (or learner-typed code) can then be
//! dispatched to the sandbox on demand; quiz answers are graded against the
//! catalog. The session owns the generator's random source, so a session
//! built with [`TutorSession::with_seed`] replays identically.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::content::Catalog;
use crate::generator;
use crate::sandbox::Sandbox;
use crate::types::{ExecutionResult, ExecutionSettings, GeneratedExample};

/// Number of examples generated per topic selection, matching the tutor UI.
pub const EXAMPLES_PER_TOPIC: usize = 5;

pub struct TutorSession {
    rng: StdRng,
    sandbox: Sandbox,
    settings: ExecutionSettings,
}

impl TutorSession {
    /// A session with an entropy-seeded generator.
    pub fn new(settings: ExecutionSettings) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            sandbox: Sandbox::new(),
            settings,
        }
    }

    /// A session whose generated examples replay deterministically.
    pub fn with_seed(seed: u64, settings: ExecutionSettings) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            sandbox: Sandbox::new(),
            settings,
        }
    }

    pub fn catalog(&self) -> &'static Catalog {
        Catalog::global()
    }

    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Generated examples for a topic selection, or `None` for topics without
    /// generator templates (their lessons still come from the catalog).
    pub fn generated_examples(
        &mut self,
        topic_id: &str,
        count: usize,
    ) -> Option<Vec<GeneratedExample>> {
        if !generator::supports(topic_id) {
            return None;
        }
        Some(generator::generate_batch(&mut self.rng, topic_id, count))
    }

    /// Run one example (or learner-typed code) in the session's sandbox.
    pub fn run(&self, source: &str) -> ExecutionResult {
        self.sandbox.execute(source, &self.settings)
    }

    /// Grade a quiz answer: `None` when the topic has no quiz or the question
    /// index is out of range, otherwise whether `choice` is correct.
    pub fn grade(&self, topic_id: &str, question: usize, choice: usize) -> Option<bool> {
        let bank = self.catalog().quiz(topic_id)?;
        bank.get(question).map(|q| q.check(choice))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
