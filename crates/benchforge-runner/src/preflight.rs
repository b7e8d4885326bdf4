//! Program lookup before a batch starts.
//!
//! Only bare program names (`lfc`, `java`) are looked up on `PATH`. A
//! program written as a path, such as `bin/CountingBenchmark`, is usually
//! produced by an earlier build step and cannot be checked up front.

use std::collections::BTreeSet;
use std::env;
use std::ffi::OsStr;
use std::fmt;
use std::path::{self, Path, PathBuf};

use benchforge_core::Experiment;
use tracing::warn;

/// A bare program name that no `PATH` entry provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingProgram {
    pub experiment: String,
    pub program: String,
}

impl fmt::Display for MissingProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` (experiment `{}`) not found on PATH",
            self.program, self.experiment
        )
    }
}

/// Looks up every bare program name against the process `PATH`.
pub fn missing_programs(experiments: &[Experiment]) -> Vec<MissingProgram> {
    missing_programs_in(experiments, env::var_os("PATH").as_deref())
}

/// Looks up every bare program name against `search_path`, a list in the
/// platform's `PATH` syntax.
///
/// Each program is reported once per experiment, in pipeline order.
pub fn missing_programs_in(
    experiments: &[Experiment],
    search_path: Option<&OsStr>,
) -> Vec<MissingProgram> {
    let dirs: Vec<PathBuf> = search_path
        .map(|raw| {
            env::split_paths(raw)
                .filter(|dir| !dir.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default();

    let mut missing = Vec::new();
    for experiment in experiments {
        let mut seen = BTreeSet::new();
        for sequence in experiment.sequences() {
            for (_, steps) in sequence.pipelines() {
                for step in steps {
                    let program = step.program.as_str();
                    if program.contains(path::is_separator) || !seen.insert(program) {
                        continue;
                    }
                    if !dirs.iter().any(|dir| is_executable(&dir.join(program))) {
                        warn!(
                            event = "program_missing",
                            experiment = experiment.id(),
                            program,
                        );
                        missing.push(MissingProgram {
                            experiment: experiment.id().to_string(),
                            program: program.to_string(),
                        });
                    }
                }
            }
        }
    }
    missing
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use benchforge_core::{ParserKind, PipelineStep, Sequence, VariantSpec};

    use super::*;

    fn install(dir: &Path, name: &str, mode: u32) {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    fn experiment(id: &str, programs: &[&str]) -> Experiment {
        Experiment::new(id)
            .with_variant(VariantSpec::new("lf-c-1", ParserKind::LfC))
            .with_sequence(Sequence::new("1").with_pipeline(
                "lf-c-1",
                programs.iter().map(|p| PipelineStep::new(*p)).collect(),
            ))
            .with_sequence(Sequence::new("2").with_pipeline(
                "lf-c-1",
                programs.iter().map(|p| PipelineStep::new(*p)).collect(),
            ))
    }

    #[test]
    fn test_reports_bare_names_missing_from_path() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path(), "lfc", 0o755);
        let experiments = [experiment("Counting", &["lfc", "java", "bin/Counting"])];

        let missing = missing_programs_in(&experiments, Some(dir.path().as_os_str()));

        assert_eq!(
            missing,
            vec![MissingProgram {
                experiment: "Counting".to_string(),
                program: "java".to_string(),
            }]
        );
        assert_eq!(
            missing[0].to_string(),
            "`java` (experiment `Counting`) not found on PATH"
        );
    }

    #[test]
    fn test_non_executable_file_does_not_count() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path(), "lfc", 0o644);

        let missing = missing_programs_in(
            &[experiment("Counting", &["lfc"])],
            Some(dir.path().as_os_str()),
        );
        assert_eq!(missing.len(), 1);
    }

    #[test]
    fn test_each_experiment_reports_its_own_programs() {
        let experiments = [
            experiment("Counting", &["lfc"]),
            experiment("PingPong", &["lfc"]),
        ];

        let missing = missing_programs_in(&experiments, None);

        let owners: Vec<&str> = missing.iter().map(|m| m.experiment.as_str()).collect();
        assert_eq!(owners, vec!["Counting", "PingPong"]);
    }
}
