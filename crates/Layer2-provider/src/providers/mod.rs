//! Model runtime implementations

pub mod ollama;
