// Version information for the RAG ML service

/// Service name reported by `GET /`
pub const SERVICE_NAME: &str = "XU-News-AI-RAG ML Service";

/// Semantic version number
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Human readable version banner
pub fn version_banner() -> String {
    format!("{} v{}", SERVICE_NAME, VERSION)
}
