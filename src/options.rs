use serde::{Deserialize, Serialize};

/// Generator options. None of these affect parsing.
///
/// Settings that only configure the virtual machine, such as keeping
/// returns on a stack of their own, change no emitted code and are not
/// fields here. Option files that carry them still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Width and height of the canvas (and its initial resolution).
    pub canvas_start_size: i64,
    /// Allocate a key buffer for the program at start-up.
    pub setup_default_keybuffer: bool,
    /// Address turtle properties as plain globals rather than through
    /// the turtle pointer.
    pub turtle_attributes_as_globals: bool,
    /// Zero every subroutine frame when it is claimed.
    pub initialise_locals: bool,
    /// Emit a bounds check after every array index.
    pub range_check_arrays: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            canvas_start_size: 1000,
            setup_default_keybuffer: true,
            turtle_attributes_as_globals: false,
            initialise_locals: true,
            range_check_arrays: true,
        }
    }
}

impl Options {
    /// Options from JSON; missing fields take their defaults.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}
