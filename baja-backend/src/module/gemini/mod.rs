///! Generative backend seam
///!
///! `GenerativeBackend` is what the fetcher talks to; `GeminiClient` is the
///! production implementation against Google's `generateContent` endpoint.

pub mod types;
pub mod client;

pub use client::{GeminiClient, GenerateRequest, GenerativeBackend};
