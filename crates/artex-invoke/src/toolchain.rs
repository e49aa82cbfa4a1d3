//! Toolchain abstraction used by the pipeline driver.

use artex_platform::PlatformSpec;

use crate::command::{BuildCommand, BuildOutput};
use crate::error::Result;

/// Builds one platform specification.
pub trait Toolchain {
    /// Run the build for `spec` and wait for it to finish.
    fn build(&self, spec: &PlatformSpec) -> Result<BuildOutput>;
}

/// The Flutter CLI, or any tool with the same `build <mode>` surface.
#[derive(Debug, Clone)]
pub struct FlutterToolchain {
    program: String,
}

impl FlutterToolchain {
    /// Use `program` as the build tool.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The command that [`Toolchain::build`] would run for `spec`.
    pub fn command(&self, spec: &PlatformSpec) -> Result<BuildCommand> {
        Ok(BuildCommand::new(self.program.as_str(), spec.mode)
            .params(&spec.additional_params)?
            .current_dir(&spec.project_location))
    }
}

impl Default for FlutterToolchain {
    fn default() -> Self {
        Self::new("flutter")
    }
}

impl Toolchain for FlutterToolchain {
    fn build(&self, spec: &PlatformSpec) -> Result<BuildOutput> {
        self.command(spec)?.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artex_platform::{BuildMode, Selection};
    use std::path::Path;

    #[test]
    fn command_for_spec() {
        let spec = PlatformSpec::new(
            "iOS",
            BuildMode::IosFramework,
            vec![Selection::Ios],
            vec!["*.xcframework".into()],
            Path::new("/work/app"),
        )
        .unwrap()
        .with_params("--no-profile --output=out");
        let cmd = FlutterToolchain::default().command(&spec).unwrap();
        assert_eq!(
            cmd.args(),
            &["build", "ios-framework", "--no-profile", "--output=out"]
        );
        assert!(cmd.printable().starts_with("flutter build ios-framework"));
    }

    #[test]
    fn malformed_spec_params() {
        let spec = PlatformSpec::new(
            "Web",
            BuildMode::Web,
            vec![Selection::Web],
            vec!["*/build/web".into()],
            Path::new("/work/app"),
        )
        .unwrap()
        .with_params("'oops");
        assert!(FlutterToolchain::new("flutter").build(&spec).is_err());
    }
}
