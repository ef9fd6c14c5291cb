//! Narrative stages and the elapsed-time thresholds that select them.

use std::str::FromStr;

use strum::EnumIter;

use crate::error::ConfigError;

/// One of the four phases of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Stage {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Stage {
    /// Stage for `elapsed_secs` using the fixed 60/120/180 thresholds.
    pub fn from_elapsed(elapsed_secs: u64) -> Self {
        StageThresholds::default().stage_for(elapsed_secs)
    }

    /// 1-based stage number.
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Title shown in the stage indicator.
    pub fn name(self) -> &'static str {
        match self {
            Stage::One => "The Celebration - 40th Anniversary",
            Stage::Two => "The Confusion - Gaslighting",
            Stage::Three => "The Frustration - Unwinnable Game",
            Stage::Four => "The End - Breaking Point",
        }
    }

    /// Key of the prompt template used to answer during this stage.
    pub fn prompt_key(self) -> String {
        format!("stage_{}_response", self.number())
    }
}

impl TryFrom<u8> for Stage {
    type Error = u8;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Stage::One),
            2 => Ok(Stage::Two),
            3 => Ok(Stage::Three),
            4 => Ok(Stage::Four),
            other => Err(other),
        }
    }
}

/// Elapsed-second boundaries at which stages two, three and four begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageThresholds {
    stage_two: u64,
    stage_three: u64,
    stage_four: u64,
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            stage_two: 60,
            stage_three: 120,
            stage_four: 180,
        }
    }
}

impl StageThresholds {
    pub fn new(stage_two: u64, stage_three: u64, stage_four: u64) -> Result<Self, ConfigError> {
        if stage_two == 0 || stage_two >= stage_three || stage_three >= stage_four {
            return Err(ConfigError::ThresholdOrder(stage_two, stage_three, stage_four));
        }
        Ok(Self {
            stage_two,
            stage_three,
            stage_four,
        })
    }

    pub fn stage_for(&self, elapsed_secs: u64) -> Stage {
        if elapsed_secs < self.stage_two {
            Stage::One
        } else if elapsed_secs < self.stage_three {
            Stage::Two
        } else if elapsed_secs < self.stage_four {
            Stage::Three
        } else {
            Stage::Four
        }
    }

    /// Second at which `stage` begins.
    pub fn start_of(&self, stage: Stage) -> u64 {
        match stage {
            Stage::One => 0,
            Stage::Two => self.stage_two,
            Stage::Three => self.stage_three,
            Stage::Four => self.stage_four,
        }
    }
}

/// Parses `"60,120,180"`.
impl FromStr for StageThresholds {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u64> = s
            .split(',')
            .map(|p| p.trim().parse::<u64>())
            .collect::<Result<_, _>>()
            .map_err(|_| ConfigError::ThresholdFormat(s.to_owned()))?;
        match parts.as_slice() {
            [a, b, c] => Self::new(*a, *b, *c),
            _ => Err(ConfigError::ThresholdFormat(s.to_owned())),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
