//! # webui-engine
//!
//! Container engine layer for the Open WebUI installer:
//! - ContainerEngine: Docker/Podman 공통 인터페이스 (async trait)
//! - BollardEngine: Docker Engine API 구현 (Podman 소켓 호환)
//! - ContainerSpec: 컨테이너 실행 명세
//! - LaunchScript: 동일한 명세를 bash 스크립트로 출력
//! - runtime: 시작 시 한 번 Docker/Podman 선택

pub mod docker;
pub mod engine;
pub mod error;
pub mod runtime;
pub mod script;
pub mod spec;

pub use docker::{split_image_ref, BollardEngine};
pub use engine::{ContainerEngine, ContainerStatus, EngineVersion, LogSink, DEFAULT_STOP_TIMEOUT};
pub use error::EngineError;
pub use runtime::{connect, podman_socket_path, resolve_runtime};
pub use script::LaunchScript;
pub use spec::{ContainerSpec, PortMapping, RestartPolicy, VolumeMount};

// Re-export so callers only need one crate for runtime selection
pub use webui_foundation::ContainerRuntime;
