use serde::Deserialize;
use serde::Serialize;

use crate::CodeAddress;
use crate::Error;
use crate::LinkError;
use crate::Result;

/// Checks applied when a watchpoint's labels are resolved to addresses
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LinkingConfig {
    /// Refuse watchpoints whose source and destination are the same instruction
    #[serde(default = "default_reject_self_loops")]
    pub reject_self_loops: bool,

    /// Largest distance in bytes the patcher can encode in a single jump.
    /// Defaults to the reach of a rel32 branch.
    #[serde(default = "default_max_jump_distance")]
    pub max_jump_distance: u64,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            reject_self_loops: default_reject_self_loops(),
            max_jump_distance: default_max_jump_distance(),
        }
    }
}

impl LinkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_jump_distance == 0 {
            return Err(Error::InvalidConfig(
                "linking.max_jump_distance must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Checks a resolved source/destination pair against the linking rules
    pub(crate) fn check_jump(
        &self,
        from: CodeAddress,
        to: CodeAddress,
    ) -> std::result::Result<(), LinkError> {
        if self.reject_self_loops && from == to {
            return Err(LinkError::SelfLoop(from));
        }

        let distance = from.0.abs_diff(to.0) as u64;
        if distance > self.max_jump_distance {
            return Err(LinkError::JumpOutOfRange {
                from,
                to,
                limit: self.max_jump_distance,
            });
        }
        Ok(())
    }
}

fn default_reject_self_loops() -> bool {
    true
}

fn default_max_jump_distance() -> u64 {
    i32::MAX as u64
}
