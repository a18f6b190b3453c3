//! Autostart - macOS launchd agent that runs the launch script at login

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};
use webui_foundation::{Error, InstallPaths, OsType, Result};

/// launchd job label
pub const AGENT_LABEL: &str = "com.openwebui.openwebui";

pub const AUTOSTART_UNSUPPORTED: &str = "Autostart is only supported on macOS";

pub const LAUNCH_SCRIPT_MISSING: &str =
    "Launch script not found. Please run 'openwebui-installer install' first.";

const STDOUT_LOG: &str = "openwebui.log";
const STDERR_LOG: &str = "openwebui.err";

// ============================================================================
// Service manager
// ============================================================================

/// Registers and unregisters agent definitions
#[async_trait]
pub trait ServiceManager: Send + Sync {
    async fn load(&self, plist: &Path) -> Result<()>;

    async fn unload(&self, plist: &Path) -> Result<()>;
}

/// `launchctl load -w` / `launchctl unload -w`
#[derive(Debug, Default)]
pub struct Launchctl;

impl Launchctl {
    async fn run(action: &str, plist: &Path) -> Result<()> {
        debug!("launchctl {} -w {}", action, plist.display());
        let output = Command::new("launchctl")
            .arg(action)
            .arg("-w")
            .arg(plist)
            .output()
            .await
            .map_err(|e| Error::installer(format!("Failed to run launchctl: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::installer(format!(
                "launchctl {} failed: {}",
                action,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceManager for Launchctl {
    async fn load(&self, plist: &Path) -> Result<()> {
        Self::run("load", plist).await
    }

    async fn unload(&self, plist: &Path) -> Result<()> {
        Self::run("unload", plist).await
    }
}

// ============================================================================
// Autostart manager
// ============================================================================

pub struct AutostartManager {
    paths: InstallPaths,
    agents_dir: PathBuf,
    os: OsType,
    manager: Arc<dyn ServiceManager>,
}

impl AutostartManager {
    /// Agents under `~/Library/LaunchAgents`, registered with launchctl
    pub fn new(paths: InstallPaths, os: OsType) -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Cannot determine home directory".into()))?;
        Ok(Self::with_agents_dir(
            paths,
            os,
            home.join("Library").join("LaunchAgents"),
        ))
    }

    pub fn with_agents_dir(paths: InstallPaths, os: OsType, agents_dir: PathBuf) -> Self {
        Self {
            paths,
            agents_dir,
            os,
            manager: Arc::new(Launchctl),
        }
    }

    pub fn with_manager(mut self, manager: Arc<dyn ServiceManager>) -> Self {
        self.manager = manager;
        self
    }

    pub fn plist_path(&self) -> PathBuf {
        self.agents_dir.join(format!("{}.plist", AGENT_LABEL))
    }

    pub fn is_enabled(&self) -> bool {
        self.plist_path().is_file()
    }

    fn ensure_supported(&self) -> Result<()> {
        if self.os != OsType::MacOS {
            return Err(Error::installer(AUTOSTART_UNSUPPORTED));
        }
        Ok(())
    }

    /// Write the agent plist and load it
    pub async fn enable(&self) -> Result<PathBuf> {
        self.ensure_supported()?;

        let script = self.paths.launch_script();
        if !script.is_file() {
            return Err(Error::installer(LAUNCH_SCRIPT_MISSING));
        }

        let config_dir = self.paths.config_dir();
        let plist = render_plist(
            AGENT_LABEL,
            &script,
            &config_dir.join(STDOUT_LOG),
            &config_dir.join(STDERR_LOG),
        );

        std::fs::create_dir_all(&self.agents_dir)?;
        let path = self.plist_path();
        std::fs::write(&path, plist)?;
        self.manager.load(&path).await?;

        info!("Autostart enabled: {}", path.display());
        Ok(path)
    }

    /// Unload and delete the agent; `false` when it was not enabled
    pub async fn disable(&self) -> Result<bool> {
        self.ensure_supported()?;

        let path = self.plist_path();
        if !path.is_file() {
            return Ok(false);
        }

        self.manager.unload(&path).await?;
        std::fs::remove_file(&path)?;

        info!("Autostart disabled");
        Ok(true)
    }
}

/// launchd agent definition
pub fn render_plist(label: &str, script: &Path, stdout: &Path, stderr: &Path) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{label}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{script}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <true/>
    <key>StandardOutPath</key>
    <string>{stdout}</string>
    <key>StandardErrorPath</key>
    <string>{stderr}</string>
</dict>
</plist>
"#,
        label = xml_escape(label),
        script = xml_escape(&script.to_string_lossy()),
        stdout = xml_escape(&stdout.to_string_lossy()),
        stderr = xml_escape(&stderr.to_string_lossy()),
    )
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plist() {
        let plist = render_plist(
            AGENT_LABEL,
            Path::new("/Users/me/.openwebui/launch-openwebui.sh"),
            Path::new("/Users/me/.openwebui/openwebui.log"),
            Path::new("/Users/me/.openwebui/openwebui.err"),
        );

        assert!(plist.contains("<string>com.openwebui.openwebui</string>"));
        assert!(plist.contains("<string>/Users/me/.openwebui/launch-openwebui.sh</string>"));
        assert!(plist.contains("<key>RunAtLoad</key>\n    <true/>"));
        assert!(plist.contains("<key>KeepAlive</key>\n    <true/>"));
        assert!(plist.contains("<string>/Users/me/.openwebui/openwebui.err</string>"));
    }

    #[test]
    fn test_paths_are_escaped() {
        let plist = render_plist(
            AGENT_LABEL,
            Path::new("/tmp/a&b/launch.sh"),
            Path::new("/tmp/o"),
            Path::new("/tmp/e"),
        );
        assert!(plist.contains("/tmp/a&amp;b/launch.sh"));
    }
}
