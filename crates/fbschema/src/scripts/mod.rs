//! Script discovery and phase classification.
//!
//! Scripts are assigned to a phase by a case-insensitive keyword match on
//! the file name: `domain`, `table` or `procedure`. Only `*.sql` files are
//! considered; within a phase, files run in file-name order.

mod splitter;

pub use splitter::{splitter_for, SemicolonSplitter, StatementSplitter, WholeScript};

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::MultiMatchPolicy;
use crate::error::{Result, SchemaError};

/// Execution phase. Phases always run in the order of [`Phase::ORDERED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Domain,
    Table,
    Procedure,
}

impl Phase {
    /// Dependency order: domains, then tables, then procedures.
    pub const ORDERED: [Phase; 3] = [Phase::Domain, Phase::Table, Phase::Procedure];

    /// File-name keyword selecting this phase.
    pub fn keyword(self) -> &'static str {
        match self {
            Phase::Domain => "domain",
            Phase::Table => "table",
            Phase::Procedure => "procedure",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Scripts grouped by phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifiedScripts {
    pub domain_files: Vec<PathBuf>,
    pub table_files: Vec<PathBuf>,
    pub procedure_files: Vec<PathBuf>,
    /// `*.sql` files matching no keyword. Never executed.
    pub unclassified: Vec<PathBuf>,
}

impl ClassifiedScripts {
    /// Files of one phase.
    pub fn files(&self, phase: Phase) -> &[PathBuf] {
        match phase {
            Phase::Domain => &self.domain_files,
            Phase::Table => &self.table_files,
            Phase::Procedure => &self.procedure_files,
        }
    }

    fn files_mut(&mut self, phase: Phase) -> &mut Vec<PathBuf> {
        match phase {
            Phase::Domain => &mut self.domain_files,
            Phase::Table => &mut self.table_files,
            Phase::Procedure => &mut self.procedure_files,
        }
    }

    /// Phases with their files, in execution order.
    pub fn phases(&self) -> impl Iterator<Item = (Phase, &[PathBuf])> {
        Phase::ORDERED.into_iter().map(move |p| (p, self.files(p)))
    }

    /// Number of phase entries (a file counted once per phase it runs in).
    pub fn scheduled(&self) -> usize {
        self.domain_files.len() + self.table_files.len() + self.procedure_files.len()
    }
}

/// Phases whose keyword occurs in `file_name`, in priority order.
pub fn matching_phases(file_name: &str) -> Vec<Phase> {
    let lower = file_name.to_lowercase();
    Phase::ORDERED
        .into_iter()
        .filter(|p| lower.contains(p.keyword()))
        .collect()
}

/// Classify the `*.sql` files of `dir`.
///
/// Fails with [`SchemaError::DirectoryNotFound`] when `dir` is not a
/// directory, and with [`SchemaError::AmbiguousScript`] when a name matches
/// several phases under [`MultiMatchPolicy::Reject`].
pub fn classify(dir: &Path, policy: MultiMatchPolicy) -> Result<ClassifiedScripts> {
    if !dir.is_dir() {
        return Err(SchemaError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_sql_file(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut scripts = ClassifiedScripts::default();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let phases = matching_phases(&name);

        let selected: &[Phase] = match (phases.len(), policy) {
            (0, _) => {
                warn!("Skipping {}: name matches no phase keyword", path.display());
                scripts.unclassified.push(path);
                continue;
            }
            (1, _) | (_, MultiMatchPolicy::AllMatches) => &phases,
            (_, MultiMatchPolicy::FirstMatch) => &phases[..1],
            (_, MultiMatchPolicy::Reject) => {
                return Err(SchemaError::AmbiguousScript {
                    file: path,
                    phases: join_phases(&phases),
                });
            }
        };

        if selected.len() > 1 {
            warn!(
                "{} matches several phases and will run in each: {}",
                path.display(),
                join_phases(selected)
            );
        }
        for phase in selected {
            debug!("{} -> {} phase", path.display(), phase);
            scripts.files_mut(*phase).push(path.clone());
        }
    }

    Ok(scripts)
}

fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("sql"))
        .unwrap_or(false)
}

fn join_phases(phases: &[Phase]) -> String {
    phases
        .iter()
        .map(|p| p.keyword())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scripts_dir(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            fs::write(dir.path().join(name), "-- script\n").unwrap();
        }
        dir
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_classify_by_keyword_case_insensitive() {
        let dir = scripts_dir(&[
            "02_Tables.sql",
            "01_DOMAINS.sql",
            "03_procedures.SQL",
            "01_tables.sql",
            "readme.txt",
            "seed_data.sql",
        ]);

        let scripts = classify(dir.path(), MultiMatchPolicy::Reject).unwrap();

        assert_eq!(names(&scripts.domain_files), ["01_DOMAINS.sql"]);
        assert_eq!(names(&scripts.table_files), ["01_tables.sql", "02_Tables.sql"]);
        assert_eq!(names(&scripts.procedure_files), ["03_procedures.SQL"]);
        assert_eq!(names(&scripts.unclassified), ["seed_data.sql"]);
        assert_eq!(scripts.scheduled(), 4);
    }

    #[test]
    fn test_phases_iterate_in_dependency_order() {
        let dir = scripts_dir(&["procedure.sql", "table.sql", "domain.sql"]);
        let scripts = classify(dir.path(), MultiMatchPolicy::Reject).unwrap();

        let order: Vec<Phase> = scripts.phases().map(|(p, _)| p).collect();
        assert_eq!(order, Phase::ORDERED);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let err = classify(&missing, MultiMatchPolicy::Reject).unwrap_err();
        assert!(matches!(err, SchemaError::DirectoryNotFound(ref p) if *p == missing));
    }

    #[test]
    fn test_multi_match_rejected_by_default() {
        let dir = scripts_dir(&["domain_table_fix.sql"]);

        let err = classify(dir.path(), MultiMatchPolicy::Reject).unwrap_err();
        match err {
            SchemaError::AmbiguousScript { phases, .. } => assert_eq!(phases, "domain, table"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_multi_match_first_match() {
        let dir = scripts_dir(&["table_procedure.sql"]);

        let scripts = classify(dir.path(), MultiMatchPolicy::FirstMatch).unwrap();
        assert_eq!(names(&scripts.table_files), ["table_procedure.sql"]);
        assert!(scripts.procedure_files.is_empty());
    }

    #[test]
    fn test_multi_match_all_matches() {
        let dir = scripts_dir(&["domain_table_procedure.sql"]);

        let scripts = classify(dir.path(), MultiMatchPolicy::AllMatches).unwrap();
        assert_eq!(scripts.domain_files.len(), 1);
        assert_eq!(scripts.table_files.len(), 1);
        assert_eq!(scripts.procedure_files.len(), 1);
        assert_eq!(scripts.scheduled(), 3);
    }

    #[test]
    fn test_matching_phases() {
        assert_eq!(matching_phases("MyProcedures.sql"), [Phase::Procedure]);
        assert_eq!(matching_phases("tables_and_domains.sql"), [Phase::Domain, Phase::Table]);
        assert!(matching_phases("seed.sql").is_empty());
    }
}
