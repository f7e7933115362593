use serde::{Deserialize, Serialize};
use xchg_types::Mode;

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CalcConfig {
    pub mode: Mode,
    /// Exchange the left and right box readings before calculating
    pub swap_sides: bool,
}
