pub mod gemini;
pub mod baja;
pub mod dashboard;
pub mod scheduled;
