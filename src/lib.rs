//! # CodeMentor: terminal code tutor
//!
//! Sends a piece of source code to a generative model and turns the
//! structured JSON reply into readable panels: a code review, a step-by-step
//! simulated execution, and a refinement dialogue over the corrected code.
//!
//! ## Architecture
//!
//! - **[`config`]**: configuration loading and validation
//! - **[`editor`]**: the code buffer and local file loading
//! - **[`model`]**: provider trait, Gemini REST client and a scripted mock
//! - **[`review`]**: prompts, declared response schemas and reply parsing
//! - **[`session`]**: per-concern state containers and the async workbench
//! - **[`render`]**: plain-text panels
//! - **[`repl`]**: interactive command loop

pub mod config;
pub mod editor;
pub mod model;
pub mod render;
pub mod repl;
pub mod review;
pub mod session;
