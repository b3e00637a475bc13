use serde::Deserialize;

/// Review refinement settings. Everything is optional; the client falls back
/// to its own defaults, and the API key itself always comes from the
/// environment.
#[derive(Debug, Deserialize)]
pub struct Refine {
    host: Option<String>,
    model: Option<String>,

    /// Request timeout in milliseconds.
    timeout: Option<u64>,
}

impl Refine {
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn timeout(&self) -> Option<u64> {
        self.timeout
    }
}
