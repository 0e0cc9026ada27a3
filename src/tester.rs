//! The interestingness test: the reducer's only external collaborator.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ConfigId;
use crate::outcome::Outcome;

/// A callable taking `(content, configuration_id)` and returning an
/// [`Outcome`]. `configuration_id` identifies the atom-pass, cycle, and
/// subset/complement slot; implementations typically use it as a
/// scratch-directory name.
///
/// The reducer catches nothing from the tester: errors other than "the test
/// returned an outcome" propagate as [`crate::error::ReductionError::Exception`].
pub trait Tester: Send + Sync {
    fn test(&self, content: &str, config_id: &ConfigId) -> anyhow::Result<Outcome>;
}

/// Runs an external test command against a scratch file per dispatch.
///
/// Exit code 0 means "interesting" ([`Outcome::Fail`] — the input still
/// reproduces the phenomenon being minimized toward); any other exit code
/// means [`Outcome::Pass`]. This is the conventional delta-debugging
/// test-script contract.
pub struct SubprocessTester {
    command: PathBuf,
    work_dir: PathBuf,
    file_name: String,
    cleanup: bool,
}

impl SubprocessTester {
    pub fn new(command: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            work_dir: work_dir.into(),
            file_name: "test_case".to_string(),
            cleanup: true,
        }
    }

    /// Override the scratch file's base name (default: `test_case`).
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Whether to remove each dispatch's scratch directory after the test
    /// command returns. Default: `true`.
    pub fn cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    fn scratch_dir(&self, config_id: &ConfigId) -> PathBuf {
        self.work_dir.join(config_id.to_string())
    }
}

impl Tester for SubprocessTester {
    fn test(&self, content: &str, config_id: &ConfigId) -> anyhow::Result<Outcome> {
        let dir = self.scratch_dir(config_id);
        std::fs::create_dir_all(&dir)?;
        let file_path: PathBuf = dir.join(&self.file_name);
        std::fs::write(&file_path, content)?;

        let status = Command::new(&self.command)
            .arg(&file_path)
            .current_dir(&dir)
            .status()?;

        if self.cleanup {
            let _ = std::fs::remove_dir_all(&dir);
        }

        Ok(Outcome::from_exit_success(status.success()))
    }
}

/// Validate that `path` exists and is executable, per the startup
/// [`crate::error::ReductionError::Configuration`] contract.
pub fn validate_executable(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("tester program does not exist: {}", path.display()));
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)
            .map_err(|e| e.to_string())?
            .permissions()
            .mode();
        if mode & 0o111 == 0 {
            return Err(format!("tester program is not executable: {}", path.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let script = dir.join("tester.sh");
        let mut f = std::fs::File::create(&script).unwrap();
        writeln!(f, "#!/bin/sh\n{body}").unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script
    }

    #[test]
    fn subprocess_tester_maps_exit_codes() {
        let tmp = tempfile::tempdir().unwrap();
        let script = write_script(tmp.path(), "grep -q X \"$1\"");
        let tester = SubprocessTester::new(script, tmp.path());

        let config_id = ConfigId::new(["a0", "r0", "s0"]);
        assert_eq!(
            tester.test("has X in it", &config_id).unwrap(),
            Outcome::Fail
        );
        assert_eq!(
            tester.test("nope", &config_id).unwrap(),
            Outcome::Pass
        );
    }

    #[test]
    fn validate_executable_rejects_missing_file() {
        let err = validate_executable(Path::new("/no/such/tester")).unwrap_err();
        assert!(err.contains("does not exist"));
    }
}
