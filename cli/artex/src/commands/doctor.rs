//! `artex doctor`: check that the external tools can be launched.

use std::process::Command;

use anyhow::Result;

/// Print the status of the build tool and the registration tool.
pub fn run(build_tool: &str, envman: &str) -> Result<()> {
    println!("=== artex doctor ===");
    println!();
    println!("artex version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("--- External Tools ---");
    let mut missing = Vec::new();
    for tool in [build_tool, envman] {
        match tool_version(tool) {
            Some(version) => println!("  {tool}: {version}"),
            None => {
                println!("  {tool}: not found");
                missing.push(tool);
            }
        }
    }

    if !missing.is_empty() {
        println!();
        println!("Missing tools: {}", missing.join(", "));
    }
    Ok(())
}

/// First line of `<tool> --version`, or `None` if it cannot be run.
fn tool_version(tool: &str) -> Option<String> {
    let output = Command::new(tool).arg("--version").output().ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().next().unwrap_or("(unknown version)");
    Some(line.trim().to_string())
}
