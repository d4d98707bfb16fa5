use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use aobq_core::sign_magnitude::DEFAULT_INTEGER_BITS;
use aobq_core::QuantizationMode;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Uniform,
    Adaptive,
    #[default]
    Offset,
}

/// Codec settings as read from a JSON file. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub mode: ModeKind,
    /// Code width for uniform mode
    pub bits: u8,
    /// Declared width of the integer magnitude for adaptive/offset modes
    pub integer_bits: u8,
    /// `None` infers it from the smallest nonzero magnitude
    pub scaling_factor: Option<f64>,
    /// `None` uses the median integer part
    pub offset: Option<i32>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            mode: ModeKind::Offset,
            bits: 8,
            integer_bits: DEFAULT_INTEGER_BITS,
            scaling_factor: None,
            offset: None,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<ModeKind>,
    pub bits: Option<u8>,
    pub integer_bits: Option<u8>,
    pub scaling_factor: Option<f64>,
    pub offset: Option<i32>,
}

impl CodecConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// File config when a path is given, defaults otherwise, then the overrides on top.
    pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if let Some(bits) = overrides.bits {
            self.bits = bits;
        }
        if let Some(integer_bits) = overrides.integer_bits {
            self.integer_bits = integer_bits;
        }
        if overrides.scaling_factor.is_some() {
            self.scaling_factor = overrides.scaling_factor;
        }
        if overrides.offset.is_some() {
            self.offset = overrides.offset;
        }
    }

    pub fn to_mode(&self) -> QuantizationMode {
        match self.mode {
            ModeKind::Uniform => QuantizationMode::Uniform { bits: self.bits },
            ModeKind::Adaptive => QuantizationMode::Adaptive {
                scaling_factor: self.scaling_factor,
                integer_bits: self.integer_bits,
            },
            ModeKind::Offset => QuantizationMode::Offset {
                scaling_factor: self.scaling_factor,
                offset: self.offset,
                integer_bits: self.integer_bits,
            },
        }
    }
}
