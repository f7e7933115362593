use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// One finished capture + OCR pass. `generation` is the region/side
    /// setup it was taken with; stale generations are dropped.
    SampleReady {
        generation: u64,
        sample: Sample,
    },
    /// Capture or OCR failed for a whole tick
    SampleFailed {
        generation: u64,
        message: String,
    },
    Command(Command),
    ShowSnapshot(Snapshot),
    StatusUpdate {
        status: String,
        paused: bool,
    },
    /// Ask the sampler for an out-of-band tick
    RequestTick,
    BackendReady,
}

/// User commands, typed on the console or produced by the CLI
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pause,
    Resume,
    Lock,
    Unlock,
    Swap,
    SetMode(Mode),
    SetRegion {
        slot: RegionSlot,
        region: CaptureRegion,
    },
    Status,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    /// Smallest width/height accepted from a region pick
    pub const MIN_SELECTION: u32 = 10;

    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_selectable(&self) -> bool {
        self.width >= Self::MIN_SELECTION && self.height >= Self::MIN_SELECTION
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }
}

impl fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ {},{}", self.width, self.height, self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionSlot {
    Ratio,
    Left,
    Right,
}

impl RegionSlot {
    pub const ALL: [RegionSlot; 3] = [RegionSlot::Ratio, RegionSlot::Left, RegionSlot::Right];

    pub fn name(&self) -> &'static str {
        match self {
            RegionSlot::Ratio => "ratio",
            RegionSlot::Left => "left",
            RegionSlot::Right => "right",
        }
    }
}

impl fmt::Display for RegionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegionSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ratio" => Ok(RegionSlot::Ratio),
            "left" => Ok(RegionSlot::Left),
            "right" => Ok(RegionSlot::Right),
            other => Err(format!("unknown region '{other}', expected ratio, left or right")),
        }
    }
}

/// Which box the user is treated as typing into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Auto,
    /// Left ("I have") is the input, right ("I want") is computed
    HaveToWant,
    /// Right ("I want") is the input, left ("I have") is computed
    WantToHave,
}

impl Mode {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Mode::Auto => None,
            Mode::HaveToWant => Some(Direction::HaveToWant),
            Mode::WantToHave => Some(Direction::WantToHave),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Auto => "Auto",
            Mode::HaveToWant => "I have -> calc I want",
            Mode::WantToHave => "I want -> calc I have",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Mode::Auto),
            "have" | "have_to_want" | "have-to-want" => Ok(Mode::HaveToWant),
            "want" | "want_to_have" | "want-to-have" => Ok(Mode::WantToHave),
            other => Err(format!("unknown mode '{other}', expected auto, have or want")),
        }
    }
}

/// A resolved calculation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HaveToWant,
    WantToHave,
}

impl Direction {
    pub fn input_side(&self) -> Side {
        match self {
            Direction::HaveToWant => Side::Left,
            Direction::WantToHave => Side::Right,
        }
    }

    pub fn target_side(&self) -> Side {
        self.input_side().other()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Left => "I have",
            Side::Right => "I want",
        }
    }
}

/// "numerator of currency A per denominator of currency B"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioReading {
    pub numerator: f64,
    pub denominator: f64,
}

impl RatioReading {
    pub fn new(numerator: f64, denominator: f64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Both terms finite and strictly positive
    pub fn is_usable(&self) -> bool {
        self.numerator.is_finite()
            && self.denominator.is_finite()
            && self.numerator > 0.0
            && self.denominator > 0.0
    }
}

/// Raw readings of one tick, after the optional left/right swap
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub ratio: Option<RatioReading>,
    pub left: Option<u64>,
    pub right: Option<u64>,
    pub raw_text: String,
}

impl Sample {
    pub fn value(&self, side: Side) -> Option<u64> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn swapped(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Value(u64),
    RatioNotReady,
    InputNotReady,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Value(v) => write!(f, "{v}"),
            Recommendation::RatioNotReady => f.write_str("-- (ratio not ready)"),
            Recommendation::InputNotReady => f.write_str("-- (input not ready)"),
        }
    }
}

/// Everything the display shows for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub sequence: u64,
    pub ratio_text: String,
    pub left: Option<u64>,
    pub right: Option<u64>,
    pub expected_left: Option<u64>,
    pub expected_right: Option<u64>,
    pub direction: Direction,
    pub recommendation: Recommendation,
    pub confidence: u8,
    pub status: String,
    pub stale: bool,
    pub raw_text: String,
}
