//! Translation between the OpenAI chat-completions format callers speak and
//! the NVIDIA NIM format the upstream speaks.
//!
//! All translation functions are pure (no I/O); the streaming reframer keeps
//! its line buffer in an explicit value.

pub mod nim_types;
pub mod openai_types;
pub mod request;
pub mod response;
pub mod streaming;
