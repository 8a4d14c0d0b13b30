//! Capture settings, loaded from and saved to an INI file.
//!
//! ```ini
//! [capture]
//! image_type = rgb24
//! bin = 1
//! output_format = pnm
//! bgr_to_rgb = true
//! dark_frame = false
//! poll_interval_ms = 10
//! poll_timeout_ms = auto
//!
//! [controls]
//! gain = 120
//! wb_r = auto
//! ```
use std::{collections::HashMap, path::Path, str::FromStr, time::Duration};

use configparser::ini::Ini;
use log::debug;

use crate::{
    asihandle::PollSettings,
    capture::{ControlSetting, ControlValue},
    codes::{ControlType, ImageType},
    frame::OutputFormat,
    Error, Result,
};

type Sections = HashMap<String, HashMap<String, Option<String>>>;

/// Settings shared by every capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    /// Pixel format requested from the camera.
    pub image_type: ImageType,
    /// Binning factor.
    pub bin: u32,
    /// File format of the saved frames.
    pub output_format: OutputFormat,
    /// Reorder RGB24 frames from the SDK's B, G, R layout before saving.
    pub bgr_to_rgb: bool,
    /// Take dark frames (shutter closed, where the camera has one).
    pub dark_frame: bool,
    /// Sleep between exposure status polls.
    pub poll_interval: Duration,
    /// Exposure wait bound. `None` uses twice the exposure plus 500 ms.
    pub poll_timeout: Option<Duration>,
    /// Controls applied to the camera before the first frame.
    pub controls: Vec<ControlSetting>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        let poll = PollSettings::default();
        Self {
            image_type: ImageType::Rgb24,
            bin: 1,
            output_format: OutputFormat::Pnm,
            bgr_to_rgb: true,
            dark_frame: false,
            poll_interval: poll.interval,
            poll_timeout: poll.timeout,
            controls: Vec::new(),
        }
    }
}

fn parse<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("[{section}] {key}: invalid value '{value}'")))
}

fn millis(section: &str, key: &str, value: &str) -> Result<Duration> {
    parse::<u64>(section, key, value).map(Duration::from_millis)
}

impl CaptureSettings {
    /// Poll parameters for the exposure loop.
    pub fn poll(&self) -> PollSettings {
        PollSettings {
            interval: self.poll_interval,
            timeout: self.poll_timeout,
        }
    }

    /// Set the binning factor. Zero is refused.
    pub fn set_bin(&mut self, bin: u32) -> Result<()> {
        if bin == 0 {
            return Err(Error::InvalidArgument("Binning must be at least 1".to_string()));
        }
        self.bin = bin;
        Ok(())
    }

    /// Load settings from an INI file. Missing keys keep their defaults.
    pub fn from_ini(path: &Path) -> Result<Self> {
        let sections = Ini::new()
            .load(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_sections(&sections)
    }

    /// Parse settings from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self> {
        let sections = Ini::new().read(text.to_string()).map_err(Error::Config)?;
        Self::from_sections(&sections)
    }

    fn from_sections(sections: &Sections) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(capture) = sections.get("capture") {
            for (key, value) in capture {
                let Some(value) = value.as_deref() else {
                    continue;
                };
                match key.as_str() {
                    "image_type" => {
                        cfg.image_type = value
                            .parse()
                            .map_err(|e| Error::Config(format!("[capture] {key}: {e}")))?
                    }
                    "bin" => cfg.bin = parse("capture", key, value)?,
                    "output_format" => {
                        cfg.output_format = value
                            .parse()
                            .map_err(|e| Error::Config(format!("[capture] {key}: {e}")))?
                    }
                    "bgr_to_rgb" => cfg.bgr_to_rgb = parse("capture", key, value)?,
                    "dark_frame" => cfg.dark_frame = parse("capture", key, value)?,
                    "poll_interval_ms" => cfg.poll_interval = millis("capture", key, value)?,
                    "poll_timeout_ms" => {
                        cfg.poll_timeout = if value.trim().eq_ignore_ascii_case("auto") {
                            None
                        } else {
                            Some(millis("capture", key, value)?)
                        }
                    }
                    other => return Err(Error::Config(format!("[capture] unknown key '{other}'"))),
                }
            }
        }
        if cfg.bin == 0 {
            return Err(Error::Config("[capture] bin: must be at least 1".to_string()));
        }

        if let Some(controls) = sections.get("controls") {
            for (key, value) in controls {
                let control: ControlType = key
                    .parse()
                    .map_err(|e| Error::Config(format!("[controls] {e}")))?;
                let value: ControlValue = value
                    .as_deref()
                    .unwrap_or_default()
                    .parse()
                    .map_err(|e| Error::Config(format!("[controls] {key}: {e}")))?;
                cfg.controls.push(ControlSetting { control, value });
            }
            // Section order is lost in the parsed map.
            cfg.controls.sort_by_key(|setting| setting.control as i32);
        }
        Ok(cfg)
    }

    fn to_ini_struct(&self) -> Ini {
        let mut config = Ini::new();
        let mut set = |section: &str, key: &str, value: String| {
            config.set(section, key, Some(value));
        };
        set("capture", "image_type", self.image_type.to_string());
        set("capture", "bin", self.bin.to_string());
        set("capture", "output_format", self.output_format.to_string());
        set("capture", "bgr_to_rgb", self.bgr_to_rgb.to_string());
        set("capture", "dark_frame", self.dark_frame.to_string());
        set(
            "capture",
            "poll_interval_ms",
            self.poll_interval.as_millis().to_string(),
        );
        set(
            "capture",
            "poll_timeout_ms",
            self.poll_timeout
                .map_or_else(|| "auto".to_string(), |t| t.as_millis().to_string()),
        );
        for setting in &self.controls {
            set(
                "controls",
                &setting.control.short_name(),
                setting.value.to_string(),
            );
        }
        config
    }

    /// Write the settings as INI text.
    pub fn to_ini_string(&self) -> String {
        self.to_ini_struct().writes()
    }

    /// Save the settings to an INI file.
    pub fn to_ini(&self, path: &Path) -> Result<()> {
        self.to_ini_struct()
            .write(path)
            .map_err(|e| Error::io(path, e))?;
        debug!("Wrote configuration to {}", path.display());
        Ok(())
    }
}
