//! Open WebUI Installer CLI - Main entry point

mod cli;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use webui_foundation::{ContainerRuntime, DEFAULT_MODEL, DEFAULT_PORT};

/// Open WebUI Installer - Install and manage Open WebUI with Ollama integration
#[derive(Parser, Debug)]
#[command(name = "openwebui-installer")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Container runtime to use
    #[arg(long, global = true, value_enum, default_value_t = RuntimeArg::Docker)]
    pub runtime: RuntimeArg,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuntimeArg {
    Docker,
    Podman,
}

impl From<RuntimeArg> for ContainerRuntime {
    fn from(arg: RuntimeArg) -> Self {
        match arg {
            RuntimeArg::Docker => ContainerRuntime::Docker,
            RuntimeArg::Podman => ContainerRuntime::Podman,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install Open WebUI and configure Ollama integration
    Install {
        /// Ollama model to install
        #[arg(short, long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Port to run Open WebUI on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Force installation even if already installed
        #[arg(short, long)]
        force: bool,

        /// Custom Open WebUI image to use
        #[arg(long)]
        image: Option<String>,
    },
    /// Uninstall Open WebUI
    Uninstall {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Start the Open WebUI container
    Start,
    /// Stop the Open WebUI container
    Stop,
    /// Restart the Open WebUI container
    Restart,
    /// Pull the Open WebUI image and recreate the container
    Update {
        /// Custom Open WebUI image to use
        #[arg(long)]
        image: Option<String>,
    },
    /// Check Open WebUI installation status
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show logs from the Open WebUI container
    Logs {
        /// Number of log lines to show
        #[arg(short = 'n', long = "tail", visible_alias = "lines", default_value_t = 100)]
        tail: usize,

        /// Keep streaming new lines
        #[arg(short, long)]
        follow: bool,
    },
    /// Configure macOS to start Open WebUI automatically at login
    EnableAutostart,
    /// Enable or disable autostart at login (macOS)
    Autostart {
        /// Enable autostart
        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        /// Disable autostart
        #[arg(long)]
        disable: bool,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = cli::run(args).await {
        tracing::debug!("Command failed: {:?}", e);
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_install_defaults() {
        let args = parse(&["openwebui-installer", "install"]);
        assert_eq!(args.runtime, RuntimeArg::Docker);
        assert!(!args.verbose);
        match args.command {
            Command::Install {
                model,
                port,
                force,
                image,
            } => {
                assert_eq!(model, "llama2");
                assert_eq!(port, 3000);
                assert!(!force);
                assert!(image.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_install_options() {
        let args = parse(&[
            "openwebui-installer",
            "--runtime",
            "podman",
            "install",
            "-m",
            "mistral",
            "-p",
            "8080",
            "-f",
            "--image",
            "custom:tag",
        ]);
        assert_eq!(ContainerRuntime::from(args.runtime), ContainerRuntime::Podman);
        match args.command {
            Command::Install {
                model,
                port,
                force,
                image,
            } => {
                assert_eq!(model, "mistral");
                assert_eq!(port, 8080);
                assert!(force);
                assert_eq!(image.as_deref(), Some("custom:tag"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["openwebui-installer", "status", "--runtime", "podman", "-v"]);
        assert_eq!(args.runtime, RuntimeArg::Podman);
        assert!(args.verbose);
    }

    #[test]
    fn test_logs_aliases() {
        for flag in ["--tail", "--lines", "-n"] {
            let args = parse(&["openwebui-installer", "logs", flag, "20"]);
            match args.command {
                Command::Logs { tail, follow } => {
                    assert_eq!(tail, 20);
                    assert!(!follow);
                }
                other => panic!("unexpected command: {:?}", other),
            }
        }
    }

    #[test]
    fn test_autostart_flags_conflict() {
        assert!(Args::try_parse_from([
            "openwebui-installer",
            "autostart",
            "--enable",
            "--disable"
        ])
        .is_err());
    }

    #[test]
    fn test_unknown_runtime_rejected() {
        assert!(Args::try_parse_from(["openwebui-installer", "--runtime", "lxc", "start"]).is_err());
    }

    #[test]
    fn test_enable_autostart_name() {
        let args = parse(&["openwebui-installer", "enable-autostart"]);
        assert!(matches!(args.command, Command::EnableAutostart));
    }
}
