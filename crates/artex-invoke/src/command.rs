//! A single build tool invocation.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::thread;

use artex_platform::BuildMode;
use tracing::debug;

use crate::error::{InvokeError, Result};

/// Fed to modes that may prompt, so a selection prompt fails instead of
/// waiting for a terminal that is not there.
const PROMPT_ABORT: &[u8] = b"a";

/// Split a raw parameter string using POSIX shell word rules.
pub fn split_args(params: &str) -> Result<Vec<String>> {
    shell_words::split(params).map_err(|source| InvokeError::Args {
        params: params.to_string(),
        source,
    })
}

/// Output of a successful build.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    /// Standard error captured while it was forwarded to the terminal.
    /// Empty for modes that leave stderr inherited.
    pub stderr: String,
}

/// `<program> build <mode> [args...]`, run in a working directory.
#[derive(Debug, Clone)]
pub struct BuildCommand {
    program: String,
    mode: BuildMode,
    args: Vec<String>,
    dir: Option<PathBuf>,
}

impl BuildCommand {
    /// Start a `build <mode>` command line for `program`.
    pub fn new(program: impl Into<String>, mode: BuildMode) -> Self {
        Self {
            program: program.into(),
            mode,
            args: vec!["build".to_string(), mode.flag().to_string()],
            dir: None,
        }
    }

    /// Append extra arguments given in shell syntax.
    pub fn params(mut self, raw: &str) -> Result<Self> {
        self.args.extend(split_args(raw)?);
        Ok(self)
    }

    /// Set the working directory.
    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.dir = Some(dir.to_path_buf());
        self
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The command line, shell-quoted.
    pub fn printable(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(&self.args))
    }

    /// Run to completion.
    ///
    /// Stdout is inherited. In modes that may prompt, stdin receives
    /// [`PROMPT_ABORT`] and is closed, and stderr is copied to both the
    /// terminal and [`BuildOutput::stderr`].
    pub fn run(&self) -> Result<BuildOutput> {
        println!();
        println!("$ {}", self.printable());
        println!();

        let capture = self.mode.may_prompt();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdout(Stdio::inherit());
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        if capture {
            cmd.stdin(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null()).stderr(Stdio::inherit());
        }

        let mut child = cmd.spawn().map_err(|source| InvokeError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if capture {
            if let Err(source) = feed_stdin(&mut child) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.io_err(source));
            }
        }

        let tee = child
            .stderr
            .take()
            .map(|stderr| thread::spawn(move || tee_stderr(stderr)));

        let status = child.wait().map_err(|source| self.io_err(source))?;
        let stderr = match tee {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stderr reader panicked")))
                .map_err(|source| self.io_err(source))?,
            None => Vec::new(),
        };
        let stderr = String::from_utf8_lossy(&stderr).into_owned();

        debug!(program = %self.program, %status, "build tool exited");
        if !status.success() {
            return Err(InvokeError::Failed {
                command: self.printable(),
                status,
                stderr,
            });
        }
        Ok(BuildOutput { stderr })
    }

    fn io_err(&self, source: io::Error) -> InvokeError {
        InvokeError::Io {
            program: self.program.clone(),
            source,
        }
    }
}

fn feed_stdin(child: &mut Child) -> io::Result<()> {
    let Some(mut stdin) = child.stdin.take() else {
        return Ok(());
    };
    match stdin.write_all(PROMPT_ABORT) {
        // The tool may exit without ever reading.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn tee_stderr(mut stderr: ChildStderr) -> io::Result<Vec<u8>> {
    let mut captured = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut terminal = io::stderr();
    loop {
        let n = stderr.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        terminal.write_all(&chunk[..n])?;
        captured.extend_from_slice(&chunk[..n]);
    }
    terminal.flush()?;
    Ok(captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn argv_layout() {
        let cmd = BuildCommand::new("flutter", BuildMode::Aar)
            .params("--no-debug --build-number=\"1 2\"")
            .unwrap();
        assert_eq!(
            cmd.args(),
            &["build", "aar", "--no-debug", "--build-number=1 2"]
        );
        let printed = cmd.printable();
        assert!(printed.starts_with("flutter build aar"));
        assert_eq!(split_args(&printed).unwrap()[1..], cmd.args()[..]);
    }

    #[test]
    fn empty_params_add_nothing() {
        let cmd = BuildCommand::new("flutter", BuildMode::Web).params("").unwrap();
        assert_eq!(cmd.args(), &["build", "web"]);
    }

    #[test]
    fn malformed_params_fail_before_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let err = BuildCommand::new("touch", BuildMode::Aar)
            .params(&format!("{} \"unterminated", marker.display()))
            .unwrap_err();
        assert!(matches!(err, InvokeError::Args { .. }));
        assert!(!marker.exists());
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = BuildCommand::new("artex-no-such-build-tool", BuildMode::Web)
            .run()
            .unwrap_err();
        assert!(matches!(err, InvokeError::Spawn { .. }));
    }

    // `sh build <mode>` runs a script named `build` from the working directory,
    // which stands in for the build tool.
    #[cfg(unix)]
    fn fake_tool(script: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("build"), script).unwrap();
        dir
    }

    #[cfg(unix)]
    #[test]
    fn prompting_mode_feeds_stdin_and_captures_stderr() {
        let dir = fake_tool("read answer\necho \"mode=$1 answer=$answer\" >&2\n");
        let out = BuildCommand::new("sh", BuildMode::IosFramework)
            .current_dir(dir.path())
            .run()
            .unwrap();
        assert!(out.stderr.contains("mode=ios-framework answer=a"));
    }

    #[cfg(unix)]
    #[test]
    fn other_modes_do_not_capture() {
        let dir = fake_tool("echo visible >&2\n");
        let out = BuildCommand::new("sh", BuildMode::Aar)
            .current_dir(dir.path())
            .run()
            .unwrap();
        assert!(out.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_failure_with_stderr() {
        let dir = fake_tool("echo 'no signing identity' >&2\nexit 3\n");
        let err = BuildCommand::new("sh", BuildMode::IosFramework)
            .current_dir(dir.path())
            .run()
            .unwrap_err();
        match err {
            InvokeError::Failed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert!(stderr.contains("no signing identity"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_working_directory() {
        let dir = fake_tool("pwd > pwd.txt\n");
        BuildCommand::new("sh", BuildMode::Web)
            .current_dir(dir.path())
            .run()
            .unwrap();
        let pwd = fs::read_to_string(dir.path().join("pwd.txt")).unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(Path::new(pwd.trim()).canonicalize().unwrap(), expected);
    }
}
