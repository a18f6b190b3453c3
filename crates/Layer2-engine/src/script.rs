//! Launch Script Generator
//!
//! Renders the `run` command of a [`ContainerSpec`] as a bash script so the
//! container can be recreated outside the installer (autostart, manual use).

use crate::error::EngineError;
use crate::spec::ContainerSpec;
use std::path::Path;
use webui_foundation::ContainerRuntime;

/// Mode for a script without embedded secrets
pub const SCRIPT_MODE: u32 = 0o755;

/// Mode once secret values are written into the script
pub const PRIVATE_SCRIPT_MODE: u32 = 0o700;

const INDENT: &str = "    ";

#[derive(Debug, Clone)]
pub struct LaunchScript<'a> {
    runtime: ContainerRuntime,
    spec: &'a ContainerSpec,
    mode: u32,
}

impl<'a> LaunchScript<'a> {
    pub fn new(runtime: ContainerRuntime, spec: &'a ContainerSpec) -> Self {
        Self {
            runtime,
            spec,
            mode: SCRIPT_MODE,
        }
    }

    /// Owner-only permissions
    pub fn private(mut self) -> Self {
        self.mode = PRIVATE_SCRIPT_MODE;
        self
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Script text: shebang, then one flag (with its value) per line
    pub fn render(&self) -> Result<String, EngineError> {
        let args = self
            .spec
            .build_args(self.runtime)
            .into_iter()
            .map(|arg| quote(&arg))
            .collect::<Result<Vec<_>, _>>()?;

        // `<runtime> run -d` on the first line
        let (head, rest) = args.split_at(args.len().min(3));
        let mut lines = vec![head.join(" ")];

        let mut iter = rest.iter().peekable();
        while let Some(arg) = iter.next() {
            match iter.next_if(|_| arg.starts_with('-')) {
                Some(value) => lines.push(format!("{}{} {}", INDENT, arg, value)),
                None => lines.push(format!("{}{}", INDENT, arg)),
            }
        }

        Ok(format!("#!/bin/bash\n{}\n", lines.join(" \\\n")))
    }

    /// Write the script and set its permissions
    pub fn write(&self, path: &Path) -> Result<(), EngineError> {
        let content = self.render()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        set_mode(path, self.mode)?;
        tracing::debug!("Wrote launch script {} (mode {:o})", path.display(), self.mode);
        Ok(())
    }
}

/// Plain tokens stay readable; anything else goes through shlex
fn quote(arg: &str) -> Result<String, EngineError> {
    let plain = !arg.is_empty()
        && arg
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"-_./:=@,+%".contains(&b));
    if plain {
        return Ok(arg.to_string());
    }

    shlex::try_quote(arg)
        .map(|q| q.into_owned())
        .map_err(|e| EngineError::Script(format!("cannot quote {:?}: {}", arg, e)))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
