use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type JobId = Uuid;
pub type AssetName = String;

/// Which transformations the worker should apply.
///
/// Both flags are forwarded to the worker untouched; what "both set" means is up to the worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingMode {
    #[serde(default)]
    pub light: bool,
    #[serde(default)]
    pub heavy: bool,
}

impl ProcessingMode {
    pub fn new(light: bool, heavy: bool) -> Self {
        Self { light, heavy }
    }

    /// Command line flags for the worker, in a fixed order.
    pub fn flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::with_capacity(2);
        if self.light {
            flags.push("--light");
        }
        if self.heavy {
            flags.push("--heavy");
        }
        flags
    }
}
