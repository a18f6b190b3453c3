//! Environment Detection - 호스트 OS/도구 자동 감지
//!
//! 설치 전 요구사항 검사와 런타임 선택에 필요한 정보를 제공합니다.

/// 운영체제 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    Windows,
    MacOS,
    Linux,
    Unknown,
}

impl OsType {
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOS
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Unknown
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::MacOS => "macOS",
            Self::Linux => "Linux",
            Self::Unknown => "Unknown",
        }
    }

    /// Hosts the installer runs on
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::MacOS | Self::Linux)
    }
}

/// 호스트 환경 정보
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub os: OsType,
    pub arch: &'static str,
    pub has_docker: bool,
    pub has_podman: bool,
    pub has_ollama: bool,
    pub has_launchctl: bool,
}

impl HostInfo {
    /// 현재 환경 감지
    pub fn detect() -> Self {
        Self {
            os: OsType::detect(),
            arch: std::env::consts::ARCH,
            has_docker: which::which("docker").is_ok(),
            has_podman: which::which("podman").is_ok(),
            has_ollama: which::which("ollama").is_ok(),
            has_launchctl: which::which("launchctl").is_ok(),
        }
    }

    /// A host description with no tools found; tests fill in what they need
    pub fn bare(os: OsType) -> Self {
        Self {
            os,
            arch: std::env::consts::ARCH,
            has_docker: false,
            has_podman: false,
            has_ollama: false,
            has_launchctl: false,
        }
    }

    pub fn summary(&self) -> String {
        let mut tools = Vec::new();
        if self.has_docker {
            tools.push("docker");
        }
        if self.has_podman {
            tools.push("podman");
        }
        if self.has_ollama {
            tools.push("ollama");
        }
        if self.has_launchctl {
            tools.push("launchctl");
        }

        let tools = if tools.is_empty() {
            "none".to_string()
        } else {
            tools.join(", ")
        };
        format!("{} ({}), tools: {}", self.os.name(), self.arch, tools)
    }
}

impl Default for HostInfo {
    fn default() -> Self {
        Self::detect()
    }
}
