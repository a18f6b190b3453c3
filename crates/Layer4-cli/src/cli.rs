//! Command dispatch

use crate::output;
use crate::{Args, Command};
use anyhow::Context;
use std::sync::Arc;
use webui_foundation::{logging, ContainerRuntime, HostInfo, InstallPaths, LogConfig};
use webui_installer::{AutostartManager, InstallOptions, Installer};
use webui_provider::{ModelRuntime, OllamaClient};

/// Run one subcommand to completion
pub async fn run(args: Args) -> anyhow::Result<()> {
    let paths = InstallPaths::global()?;
    init_logging(&paths, args.verbose);

    let host = HostInfo::detect();
    tracing::debug!("Host: {}", host.summary());

    // Autostart only touches launchd files, no engine needed
    match &args.command {
        Command::EnableAutostart => return autostart(&paths, &host, Some(true)).await,
        Command::Autostart { enable, disable } => {
            let wanted = match (enable, disable) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            return autostart(&paths, &host, wanted).await;
        }
        _ => {}
    }

    let runtime = ContainerRuntime::from(args.runtime);
    let engine = webui_engine::connect(runtime, &host)
        .await
        .with_context(|| format!("Failed to connect to {}", runtime.display_name()))?;
    let models: Arc<dyn ModelRuntime> = Arc::new(OllamaClient::from_env()?);
    let installer = Installer::new(paths, engine, models, host);

    match args.command {
        Command::Install {
            model,
            port,
            force,
            image,
        } => {
            output::info("Installing Open WebUI...");
            let options = InstallOptions {
                model,
                port,
                force,
                image,
            };
            let config = installer.install(&options).await?;
            output::success("Installation complete!");
            output::info(&format!(
                "\nOpen WebUI is now available at: http://localhost:{}",
                config.port
            ));
        }
        Command::Uninstall { yes } => {
            if !yes && !output::confirm("Are you sure you want to uninstall Open WebUI?")? {
                output::info("Uninstallation aborted.");
                return Ok(());
            }
            installer.uninstall().await?;
            output::success("Uninstallation complete!");
        }
        Command::Start => {
            installer.start().await?;
            output::success("Open WebUI started");
        }
        Command::Stop => {
            installer.stop().await?;
            output::success("Open WebUI stopped");
        }
        Command::Restart => {
            installer.restart().await?;
            output::success("Open WebUI restarted");
        }
        Command::Update { image } => {
            let config = installer.update(image.as_deref()).await?;
            output::success(&format!("Open WebUI updated to {}", config.image));
        }
        Command::Status { json } => {
            let status = installer.get_status().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                output::print_status(&status);
            }
        }
        Command::Logs { tail, follow } => {
            if follow {
                follow_logs(&installer, tail).await?;
            } else {
                print!("{}", installer.logs(tail).await?);
            }
        }
        Command::EnableAutostart | Command::Autostart { .. } => {}
    }

    Ok(())
}

/// Log file under the config dir; stderr only if that cannot be opened
fn init_logging(paths: &InstallPaths, verbose: bool) {
    let config = LogConfig::new(verbose).with_log_dir(paths.log_dir());
    if let Err(e) = logging::init(&config) {
        let _ = logging::init(&LogConfig::new(verbose));
        tracing::warn!("File logging disabled: {}", e);
    }
}

async fn follow_logs(installer: &Installer, tail: usize) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    let mut sink = |chunk: &str| output::write_chunk(&mut stdout, chunk);

    tokio::select! {
        result = installer.follow_logs(tail, &mut sink) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("Log streaming interrupted");
        }
    }
    Ok(())
}

/// `Some(true)` enables, `Some(false)` disables, `None` reports
async fn autostart(paths: &InstallPaths, host: &HostInfo, wanted: Option<bool>) -> anyhow::Result<()> {
    let manager = AutostartManager::new(paths.clone(), host.os)?;

    match wanted {
        Some(true) => {
            let plist = manager.enable().await?;
            output::success(&format!("Autostart enabled via {}", plist.display()));
        }
        Some(false) => {
            if manager.disable().await? {
                output::success("Autostart disabled");
            } else {
                output::warning("Autostart was not enabled");
            }
        }
        None if manager.is_enabled() => {
            output::info(&format!("Autostart is enabled ({})", manager.plist_path().display()));
        }
        None => output::info("Autostart is disabled"),
    }
    Ok(())
}
