use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Settings applied while watchpoints fire
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FiringConfig {
    /// Emit a `trace` event for every jump that gets patched.
    /// Sweeps are always reported at `debug` level.
    #[serde(default = "default_trace_redirects")]
    pub trace_redirects: bool,
}

impl Default for FiringConfig {
    fn default() -> Self {
        Self {
            trace_redirects: default_trace_redirects(),
        }
    }
}

impl FiringConfig {
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

fn default_trace_redirects() -> bool {
    false
}
