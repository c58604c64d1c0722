use std::env;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Process settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// `SCHEDULER_ADDR`, the address the HTTP server binds to.
    pub bind_addr: String,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("SCHEDULER_ADDR")
            .filter(|addr| !addr.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        Self { bind_addr }
    }
}
