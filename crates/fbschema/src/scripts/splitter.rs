//! Statement splitting strategies.

use super::Phase;

/// Splits a script into individually executable statements.
pub trait StatementSplitter: Send + Sync {
    fn split<'a>(&self, script: &'a str) -> Vec<&'a str>;
}

/// Splits on every `;`.
///
/// Does not understand string literals, comments or PSQL blocks; a `;`
/// inside any of them ends the statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemicolonSplitter;

impl StatementSplitter for SemicolonSplitter {
    fn split<'a>(&self, script: &'a str) -> Vec<&'a str> {
        script
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// The whole script is one statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeScript;

impl StatementSplitter for WholeScript {
    fn split<'a>(&self, script: &'a str) -> Vec<&'a str> {
        let trimmed = script.trim();
        if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed]
        }
    }
}

/// Default splitter for a phase: procedure bodies contain semicolons and
/// run whole; everything else is split.
pub fn splitter_for(phase: Phase) -> Box<dyn StatementSplitter> {
    match phase {
        Phase::Procedure => Box::new(WholeScript),
        Phase::Domain | Phase::Table => Box::new(SemicolonSplitter),
    }
}
