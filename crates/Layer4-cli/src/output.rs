//! Terminal output helpers
//!
//! 색상 출력은 crossterm 사용. 실패 메시지는 stderr 로 보낸다.

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, BufRead, Write};
use webui_installer::{InstallState, Status};

fn mark(out: &mut impl Write, color: Color, symbol: &str, message: &str) -> io::Result<()> {
    execute!(
        out,
        SetForegroundColor(color),
        Print(symbol),
        ResetColor,
        Print(format!(" {}\n", message))
    )
}

pub fn success(message: &str) {
    let _ = mark(&mut io::stdout(), Color::Green, "✓", message);
}

pub fn warning(message: &str) {
    let _ = mark(&mut io::stdout(), Color::Yellow, "!", message);
}

pub fn info(message: &str) {
    let _ = execute!(io::stdout(), Print(format!("{}\n", message)));
}

/// Streamed log text, written as received
pub fn write_chunk(out: &mut impl Write, chunk: &str) {
    let _ = out.write_all(chunk.as_bytes()).and_then(|()| out.flush());
}

/// `Error: <msg>` on stderr
pub fn error(message: &str) {
    let _ = execute!(
        io::stderr(),
        SetForegroundColor(Color::Red),
        Print("Error:"),
        ResetColor,
        Print(format!(" {}\n", message))
    );
}

/// Yes/no prompt; anything but `y`/`yes` (or EOF) answers no
pub fn confirm(question: &str) -> io::Result<bool> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(format!("{} [y/N]: ", question)))?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(parse_answer(&answer))
}

fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// ============================================================================
// Status
// ============================================================================

pub fn print_status(status: &Status) {
    if !status.installed {
        warning("Open WebUI is not installed");
        return;
    }

    success("Open WebUI is installed");
    for line in status_lines(status) {
        info(&line);
    }
}

fn status_lines(status: &Status) -> Vec<String> {
    let unknown = || "unknown".to_string();
    let mut lines = vec![
        format!(
            "Version: {}",
            status.version.clone().unwrap_or_else(unknown)
        ),
        format!(
            "Port: {}",
            status.port.map(|p| p.to_string()).unwrap_or_else(unknown)
        ),
        format!("Model: {}", status.model.clone().unwrap_or_else(unknown)),
    ];
    if let Some(image) = &status.image {
        lines.push(format!("Image: {}", image));
    }
    if let Some(runtime) = status.runtime {
        lines.push(format!("Runtime: {}", runtime.display_name()));
    }

    let state = match &status.state {
        InstallState::InstalledRunning => "Running".to_string(),
        InstallState::InstalledUnknown(reason) => format!("Unknown ({})", reason),
        _ => "Stopped".to_string(),
    };
    lines.push(format!("Status: {}", state));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use webui_foundation::{ContainerRuntime, InstallationConfig};

    #[test]
    fn test_parse_answer() {
        assert!(parse_answer("y\n"));
        assert!(parse_answer(" YES "));
        assert!(!parse_answer("\n"));
        assert!(!parse_answer("no"));
        assert!(!parse_answer(""));
    }

    #[test]
    fn test_write_chunk_keeps_engine_newlines() {
        let mut out = Vec::new();
        write_chunk(&mut out, "hello\n");
        write_chunk(&mut out, "partial");
        write_chunk(&mut out, " line\n");
        assert_eq!(String::from_utf8(out).unwrap(), "hello\npartial line\n");
    }

    #[test]
    fn test_status_lines_running() {
        let config = InstallationConfig::new("ghcr.io/open-webui/open-webui:main", 3000, "llama2")
            .with_runtime(ContainerRuntime::Podman);
        let status = Status::new(
            Some(&config),
            Some("running".into()),
            InstallState::InstalledRunning,
        );

        let lines = status_lines(&status);
        assert!(lines.contains(&"Port: 3000".to_string()));
        assert!(lines.contains(&"Model: llama2".to_string()));
        assert!(lines.contains(&"Runtime: Podman".to_string()));
        assert_eq!(lines.last().unwrap(), "Status: Running");
    }

    #[test]
    fn test_status_lines_unknown() {
        let status = Status::new(
            None,
            None,
            InstallState::InstalledUnknown("engine unreachable".into()),
        );

        let lines = status_lines(&status);
        assert_eq!(lines[0], "Version: unknown");
        assert_eq!(lines.last().unwrap(), "Status: Unknown (engine unreachable)");
    }
}
