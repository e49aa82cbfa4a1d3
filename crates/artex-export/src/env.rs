//! Environment value registration.
//!
//! The `EnvExporter` trait abstracts over where published values go. CI runs
//! use [`Envman`]; tests and dry runs use [`MemoryEnv`].

use std::io::{self, Write};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::EnvError;

/// Sink for published environment values.
pub trait EnvExporter {
    /// Register `value` under `key`. A later call with the same key wins.
    fn export(&mut self, key: &str, value: &str) -> Result<(), EnvError>;
}

/// Registers values with `envman add --key <key>`, the value on stdin.
#[derive(Debug, Clone)]
pub struct Envman {
    program: String,
}

impl Envman {
    /// Use `program` as the envman binary.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Envman {
    fn default() -> Self {
        Self::new("envman")
    }
}

impl EnvExporter for Envman {
    fn export(&mut self, key: &str, value: &str) -> Result<(), EnvError> {
        debug!(key, "registering environment value");
        let spawn_err = |source| EnvError::Spawn {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .args(["add", "--key", key])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(value.as_bytes()) {
                // envman exited early; its status says why.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                other => other.map_err(spawn_err)?,
            }
        }
        let output = child.wait_with_output().map_err(spawn_err)?;
        if !output.status.success() {
            return Err(EnvError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// In-memory exporter recording every registration in order.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnv {
    history: Vec<(String, String)>,
}

impl MemoryEnv {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `key`: the last one registered.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every registration, in call order.
    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl EnvExporter for MemoryEnv {
    fn export(&mut self, key: &str, value: &str) -> Result<(), EnvError> {
        self.history.push((key.to_string(), value.to_string()));
        Ok(())
    }
}
