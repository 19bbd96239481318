use crate::config::{ARTIFACT_FILE, BuildConfig};
use crate::error::{BuildError, BuildResult};
use crate::progress::BuildProgress;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Produces deployable edge-function artifacts before the stack reads them.
pub trait ArtifactBuilder {
    /// Builds every target directory. Any failure aborts the whole run.
    fn prepare(&self, targets: &[PathBuf]) -> BuildResult<()>;

    /// Location of the compiled artifact for a target directory.
    fn artifact_path(&self, target: &Path) -> PathBuf;
}

/// Runs `install` then `build` in each function directory through the configured shell.
pub struct BuildPipeline {
    config: BuildConfig,
}

impl BuildPipeline {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    fn target_dir(&self, target: &Path) -> BuildResult<PathBuf> {
        let dir = self.config.project_root.join(target);
        if !dir.is_dir() {
            return Err(BuildError::SourceNotFound(dir));
        }
        Ok(dir)
    }

    fn run(&self, command: &str, dir: &Path) -> BuildResult<()> {
        tracing::debug!("Running: {} -c '{}' in {}", self.config.shell, command, dir.display());

        let status = Command::new(&self.config.shell)
            .arg("-c")
            .arg(command)
            .current_dir(dir)
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| BuildError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::CommandFailed {
                command: command.to_string(),
                dir: dir.to_path_buf(),
                code: status.code(),
            });
        }

        Ok(())
    }

    fn progress(&self, label: &str) -> BuildProgress {
        if self.config.show_progress {
            BuildProgress::new(label)
        } else {
            BuildProgress::hidden()
        }
    }
}

impl ArtifactBuilder for BuildPipeline {
    fn prepare(&self, targets: &[PathBuf]) -> BuildResult<()> {
        let dirs = targets
            .iter()
            .map(|t| self.target_dir(t))
            .collect::<BuildResult<Vec<_>>>()?;

        for dir in &dirs {
            let removed = clean_artifacts(dir, &self.config.artifact_suffixes)?;
            tracing::debug!("Removed {} stale artifact(s) from {}", removed, dir.display());

            let progress = self.progress(&dir.display().to_string());
            progress.set_message(&format!("{} ...", self.config.install_command));
            if let Err(e) = self.run(&self.config.install_command, dir) {
                progress.finish_error(&e.to_string());
                return Err(e);
            }
            progress.finish_success();
        }

        for dir in &dirs {
            let progress = self.progress(&dir.display().to_string());
            progress.set_message(&format!("{} ...", self.config.build_command));
            if let Err(e) = self.run(&self.config.build_command, dir) {
                progress.finish_error(&e.to_string());
                return Err(e);
            }
            progress.finish_success();

            tracing::info!("Built {}", dir.display());
        }

        Ok(())
    }

    fn artifact_path(&self, target: &Path) -> PathBuf {
        self.config.project_root.join(target).join(ARTIFACT_FILE)
    }
}

/// Removes top-level files whose names end in one of `suffixes`.
///
/// Subdirectories (including `node_modules`) are left untouched.
pub fn clean_artifacts(dir: &Path, suffixes: &[String]) -> BuildResult<usize> {
    let mut removed = 0;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if suffixes.iter().any(|s| name.ends_with(s.as_str())) {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn suffixes() -> Vec<String> {
        vec![".js".to_string(), ".d.ts".to_string()]
    }

    #[test]
    fn test_clean_artifacts() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("index.js"), "old").unwrap();
        fs::write(temp_dir.path().join("index.d.ts"), "old").unwrap();
        fs::write(temp_dir.path().join("index.ts"), "src").unwrap();
        fs::write(temp_dir.path().join("package.json"), "{}").unwrap();

        let nested = temp_dir.path().join("node_modules");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("dep.js"), "dep").unwrap();

        let removed = clean_artifacts(temp_dir.path(), &suffixes()).unwrap();
        assert_eq!(removed, 2);
        assert!(!temp_dir.path().join("index.js").exists());
        assert!(!temp_dir.path().join("index.d.ts").exists());
        assert!(temp_dir.path().join("index.ts").exists());
        assert!(temp_dir.path().join("package.json").exists());
        assert!(nested.join("dep.js").exists());
    }

    #[test]
    fn test_missing_source_dir() {
        let temp_dir = tempdir().unwrap();
        let pipeline = BuildPipeline::new(BuildConfig::new(temp_dir.path()));

        let result = pipeline.prepare(&[PathBuf::from("function")]);
        assert!(matches!(result, Err(BuildError::SourceNotFound(_))));
    }

    #[test]
    fn test_artifact_path() {
        let pipeline = BuildPipeline::new(BuildConfig::new("/project"));
        assert_eq!(
            pipeline.artifact_path(Path::new("function")),
            PathBuf::from("/project/function/index.js")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_prepare_runs_install_then_build() {
        let temp_dir = tempdir().unwrap();
        let function_dir = temp_dir.path().join("function");
        fs::create_dir(&function_dir).unwrap();
        fs::write(function_dir.join("index.js"), "stale").unwrap();

        let config = BuildConfig::new(temp_dir.path())
            .with_shell(Some("sh".to_string()))
            .with_commands(
                "echo install >> steps.log",
                "echo build >> steps.log && echo \"$OUT_BODY\" > index.js",
            )
            .with_env("OUT_BODY", "function handler(event) { return event.request; }");
        let pipeline = BuildPipeline::new(config);

        pipeline.prepare(&[PathBuf::from("function")]).unwrap();

        let steps = fs::read_to_string(function_dir.join("steps.log")).unwrap();
        assert_eq!(steps, "install\nbuild\n");
        let artifact = fs::read_to_string(function_dir.join("index.js")).unwrap();
        assert!(artifact.contains("function handler"));
    }

    #[cfg(unix)]
    #[test]
    fn test_install_failure_skips_build() {
        let temp_dir = tempdir().unwrap();
        let function_dir = temp_dir.path().join("function");
        fs::create_dir(&function_dir).unwrap();

        let config = BuildConfig::new(temp_dir.path())
            .with_shell(Some("sh".to_string()))
            .with_commands("exit 3", "touch built.marker");
        let pipeline = BuildPipeline::new(config);

        let result = pipeline.prepare(&[PathBuf::from("function")]);
        match result {
            Err(BuildError::CommandFailed { command, code, .. }) => {
                assert_eq!(command, "exit 3");
                assert_eq!(code, Some(3));
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
        assert!(!function_dir.join("built.marker").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_all_installs_run_before_builds() {
        let temp_dir = tempdir().unwrap();
        let log = temp_dir.path().join("order.log");
        for name in ["first", "second"] {
            fs::create_dir(temp_dir.path().join(name)).unwrap();
        }

        let config = BuildConfig::new(temp_dir.path())
            .with_shell(Some("sh".to_string()))
            .with_commands(
                "echo \"install $(basename $PWD)\" >> \"$ORDER_LOG\"",
                "echo \"build $(basename $PWD)\" >> \"$ORDER_LOG\"",
            )
            .with_env("ORDER_LOG", log.to_string_lossy());
        let pipeline = BuildPipeline::new(config);

        pipeline
            .prepare(&[PathBuf::from("first"), PathBuf::from("second")])
            .unwrap();

        let order = fs::read_to_string(&log).unwrap();
        assert_eq!(
            order,
            "install first\ninstall second\nbuild first\nbuild second\n"
        );
    }
}
