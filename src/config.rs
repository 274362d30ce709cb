use crate::error::ConfigError;

pub const DEFAULT_SCANS_PER_METER: f64 = 200.0;
pub const DEFAULT_LENGTH_THRESHOLD_M: f64 = 100.0;
pub const DEFAULT_WINDOW_TRACES: usize = 1200;
pub const DEFAULT_DPI: u16 = 300;
/// A 16 in wide figure must stay within the JPEG limit of 65535 px
pub const MAX_DPI: u16 = 4095;

/// How decoded profiles are turned into images
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    length_threshold_m: f64,
    window_traces: usize,
    dpi: u16,
}

impl RenderConfig {
    pub fn new(
        length_threshold_m: f64,
        window_traces: usize,
        dpi: u16,
    ) -> Result<Self, ConfigError> {
        if !(length_threshold_m.is_finite() && length_threshold_m > 0.0) {
            return Err(not_positive("length_threshold_m", length_threshold_m));
        }
        if window_traces == 0 {
            return Err(not_positive("window_traces", window_traces));
        }
        if dpi == 0 {
            return Err(not_positive("dpi", dpi));
        }
        if dpi > MAX_DPI {
            return Err(ConfigError::TooLarge {
                name: "dpi",
                value: dpi.to_string(),
                max: MAX_DPI.to_string(),
            });
        }
        Ok(Self {
            length_threshold_m,
            window_traces,
            dpi,
        })
    }

    /// Lines at least this long are split into windows
    pub fn length_threshold_m(&self) -> f64 {
        self.length_threshold_m
    }

    pub fn window_traces(&self) -> usize {
        self.window_traces
    }

    pub fn dpi(&self) -> u16 {
        self.dpi
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            length_threshold_m: DEFAULT_LENGTH_THRESHOLD_M,
            window_traces: DEFAULT_WINDOW_TRACES,
            dpi: DEFAULT_DPI,
        }
    }
}

/// Per-run settings shared by every file in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessConfig {
    default_scans_per_meter: f64,
    render: RenderConfig,
}

impl ProcessConfig {
    pub fn new(default_scans_per_meter: f64, render: RenderConfig) -> Result<Self, ConfigError> {
        if !(default_scans_per_meter.is_finite() && default_scans_per_meter > 0.0) {
            return Err(not_positive("scans_per_meter", default_scans_per_meter));
        }
        Ok(Self {
            default_scans_per_meter,
            render,
        })
    }

    /// Used when a header carries no usable scans-per-meter value
    pub fn default_scans_per_meter(&self) -> f64 {
        self.default_scans_per_meter
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            default_scans_per_meter: DEFAULT_SCANS_PER_METER,
            render: RenderConfig::default(),
        }
    }
}

fn not_positive(name: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::NotPositive {
        name,
        value: value.to_string(),
    }
}
