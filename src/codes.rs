//! SDK enumeration codes and their display labels.
//!
//! The numeric values follow `ASICamera2.h`. When the crate is built with the
//! `sdk` feature, the FFI wrapper checks them against the generated bindings.
use std::{fmt, str::FromStr};

use log::warn;

use crate::Error;

/// Status codes returned by every SDK call.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsiErrorCode {
    /// Operation was successful.
    Success = 0,
    /// No camera connected or index value out of boundary.
    InvalidIndex = 1,
    /// Invalid camera ID.
    InvalidId = 2,
    /// Invalid control type.
    InvalidControlType = 3,
    /// Camera was not opened.
    CameraClosed = 4,
    /// Failed to find the camera, maybe it has been removed.
    CameraRemoved = 5,
    /// Cannot find the path of the file.
    InvalidPath = 6,
    /// Invalid file format.
    InvalidFileFormat = 7,
    /// Wrong video format size.
    InvalidSize = 8,
    /// Unsupported image format.
    InvalidImgType = 9,
    /// The start position is outside the image boundary.
    OutOfBoundary = 10,
    /// Timeout.
    Timeout = 11,
    /// Stop capture first.
    InvalidSequence = 12,
    /// Buffer size is not big enough.
    BufferTooSmall = 13,
    /// Video mode is active.
    VideoModeActive = 14,
    /// An exposure is already in progress.
    ExposureInProgress = 15,
    /// General error, eg: value is out of valid range.
    GeneralError = 16,
    /// The current mode is wrong.
    InvalidMode = 17,
}

impl AsiErrorCode {
    /// Every known status code.
    pub const ALL: [Self; 18] = [
        Self::Success,
        Self::InvalidIndex,
        Self::InvalidId,
        Self::InvalidControlType,
        Self::CameraClosed,
        Self::CameraRemoved,
        Self::InvalidPath,
        Self::InvalidFileFormat,
        Self::InvalidSize,
        Self::InvalidImgType,
        Self::OutOfBoundary,
        Self::Timeout,
        Self::InvalidSequence,
        Self::BufferTooSmall,
        Self::VideoModeActive,
        Self::ExposureInProgress,
        Self::GeneralError,
        Self::InvalidMode,
    ];

    /// Map a raw status code, `None` if the SDK returned something unknown.
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| *code as i32 == raw)
    }

    /// The SDK constant name for this code.
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "ASI_SUCCESS",
            // The utilities have always printed this one with the typo.
            Self::InvalidIndex => "ASE_ERROR_INVALID_INDEX",
            Self::InvalidId => "ASI_ERROR_INVALID_ID",
            Self::InvalidControlType => "ASI_ERROR_INVALID_CONTROL_TYPE",
            Self::CameraClosed => "ASI_ERROR_CAMERA_CLOSED",
            Self::CameraRemoved => "ASI_ERROR_CAMERA_REMOVED",
            Self::InvalidPath => "ASI_ERROR_INVALID_PATH",
            Self::InvalidFileFormat => "ASI_ERROR_INVALID_FILEFORMAT",
            Self::InvalidSize => "ASI_ERROR_INVALID_SIZE",
            Self::InvalidImgType => "ASI_ERROR_INVALID_IMGTYPE",
            Self::OutOfBoundary => "ASI_ERROR_OUTOF_BOUNDARY",
            Self::Timeout => "ASI_ERROR_TIMEOUT",
            Self::InvalidSequence => "ASI_ERROR_INVALID_SEQUENCE",
            Self::BufferTooSmall => "ASI_ERROR_BUFFER_TOO_SMALL",
            Self::VideoModeActive => "ASI_ERROR_VIDEO_MODE_ACTIVE",
            Self::ExposureInProgress => "ASI_ERROR_EXPOSURE_IN_PROGRESS",
            Self::GeneralError => "ASI_ERROR_GENERAL_ERROR",
            Self::InvalidMode => "ASI_ERROR_INVALID_MODE",
        }
    }
}

/// Label for a raw SDK status code.
///
/// Unknown codes produce `"Unknown ASI_ERROR_CODE"` and a warning.
pub fn error_code_label(raw: i32) -> &'static str {
    match AsiErrorCode::from_raw(raw) {
        Some(code) => code.label(),
        None => {
            warn!("Unknown ASI_ERROR_CODE! [{raw}]");
            "Unknown ASI_ERROR_CODE"
        }
    }
}

/// Tunable camera parameters.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlType {
    /// Analog gain.
    Gain = 0,
    /// Exposure time in microseconds.
    Exposure = 1,
    /// Gamma.
    Gamma = 2,
    /// White balance, red channel.
    WhiteBalR = 3,
    /// White balance, blue channel.
    WhiteBalB = 4,
    /// Offset (brightness).
    Offset = 5,
    /// USB bandwidth overload.
    BandwidthOverload = 6,
    /// Overclock.
    Overclock = 7,
    /// Sensor temperature in tenths of a degree Celsius.
    Temperature = 8,
    /// Flip mode.
    Flip = 9,
    /// Maximum gain in auto mode.
    AutoMaxGain = 10,
    /// Maximum exposure in auto mode, in milliseconds.
    AutoMaxExp = 11,
    /// Target brightness in auto mode.
    AutoTargetBrightness = 12,
    /// Hardware binning.
    HardwareBin = 13,
    /// High speed mode.
    HighSpeedMode = 14,
    /// Cooler power in percent.
    CoolerPowerPerc = 15,
    /// Target temperature for the cooler.
    TargetTemp = 16,
    /// Cooler on/off.
    CoolerOn = 17,
    /// Mono binning on color cameras.
    MonoBin = 18,
    /// Fan on/off.
    FanOn = 19,
    /// Pattern adjust.
    PatternAdjust = 20,
    /// Anti-dew heater.
    AntiDewHeater = 21,
    /// Fan speed.
    FanAdjust = 22,
    /// Power LED brightness.
    PwrLedBright = 23,
    /// USB hub reset.
    UsbHubReset = 24,
    /// GPS support.
    GpsSupport = 25,
    /// GPS start line.
    GpsStartLine = 26,
    /// GPS end line.
    GpsEndLine = 27,
    /// Rolling shutter interval.
    RollingInterval = 28,
}

impl ControlType {
    /// Every known control type.
    pub const ALL: [Self; 29] = [
        Self::Gain,
        Self::Exposure,
        Self::Gamma,
        Self::WhiteBalR,
        Self::WhiteBalB,
        Self::Offset,
        Self::BandwidthOverload,
        Self::Overclock,
        Self::Temperature,
        Self::Flip,
        Self::AutoMaxGain,
        Self::AutoMaxExp,
        Self::AutoTargetBrightness,
        Self::HardwareBin,
        Self::HighSpeedMode,
        Self::CoolerPowerPerc,
        Self::TargetTemp,
        Self::CoolerOn,
        Self::MonoBin,
        Self::FanOn,
        Self::PatternAdjust,
        Self::AntiDewHeater,
        Self::FanAdjust,
        Self::PwrLedBright,
        Self::UsbHubReset,
        Self::GpsSupport,
        Self::GpsStartLine,
        Self::GpsEndLine,
        Self::RollingInterval,
    ];

    /// Map a raw control type id.
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|ctrl| *ctrl as i32 == raw)
    }

    /// The SDK constant name for this control.
    pub fn label(self) -> &'static str {
        match self {
            Self::Gain => "ASI_GAIN",
            Self::Exposure => "ASI_EXPOSURE",
            Self::Gamma => "ASI_GAMMA",
            Self::WhiteBalR => "ASI_WB_R",
            Self::WhiteBalB => "ASI_WB_B",
            Self::Offset => "ASI_OFFSET",
            Self::BandwidthOverload => "ASI_BANDWIDTHOVERLOAD",
            Self::Overclock => "ASI_OVERCLOCK",
            Self::Temperature => "ASI_TEMPERATURE",
            Self::Flip => "ASI_FLIP",
            Self::AutoMaxGain => "ASI_AUTO_MAX_GAIN",
            Self::AutoMaxExp => "ASI_AUTO_MAX_EXP",
            Self::AutoTargetBrightness => "ASI_AUTO_TARGET_BRIGHTNESS",
            Self::HardwareBin => "ASI_HARDWARE_BIN",
            Self::HighSpeedMode => "ASI_HIGH_SPEED_MODE",
            Self::CoolerPowerPerc => "ASI_COOLER_POWER_PERC",
            Self::TargetTemp => "ASI_TARGET_TEMP",
            Self::CoolerOn => "ASI_COOLER_ON",
            Self::MonoBin => "ASI_MONO_BIN",
            Self::FanOn => "ASI_FAN_ON",
            Self::PatternAdjust => "ASI_PATTERN_ADJUST",
            Self::AntiDewHeater => "ASI_ANTI_DEW_HEATER",
            Self::FanAdjust => "ASI_FAN_ADJUST",
            Self::PwrLedBright => "ASI_PWRLED_BRIGNT",
            Self::UsbHubReset => "ASI_USBHUB_RESET",
            Self::GpsSupport => "ASI_GPS_SUPPORT",
            Self::GpsStartLine => "ASI_GPS_START_LINE",
            Self::GpsEndLine => "ASI_GPS_END_LINE",
            Self::RollingInterval => "ASI_ROLLING_INTERVAL",
        }
    }

    /// Lower-case short name, as used in capture options and config files.
    pub fn short_name(self) -> String {
        self.label()["ASI_".len()..].to_ascii_lowercase()
    }
}

impl FromStr for ControlType {
    type Err = Error;

    /// Accepts `gain`, `GAIN` or `ASI_GAIN`. `brightness` is the SDK's old name for `offset`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        let name = name.strip_prefix("ASI_").unwrap_or(&name);
        if name == "BRIGHTNESS" {
            return Ok(Self::Offset);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|ctrl| &ctrl.label()["ASI_".len()..] == name)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown control '{}'", s.trim())))
    }
}

/// Label for a raw control type id.
///
/// Unknown ids produce `"Unknown ASI_CONTROL_TYPE"` and a warning.
pub fn control_type_label(raw: i32) -> &'static str {
    match ControlType::from_raw(raw) {
        Some(ctrl) => ctrl.label(),
        None => {
            warn!("Unknown ASI_CONTROL_TYPE! [{raw}]");
            "Unknown ASI_CONTROL_TYPE"
        }
    }
}

/// Pixel formats the sensor can deliver.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    /// 8-bit raw (Bayer or mono).
    Raw8 = 0,
    /// 24-bit color, three bytes per pixel.
    Rgb24 = 1,
    /// 16-bit raw.
    Raw16 = 2,
    /// 8-bit luminance.
    Y8 = 3,
}

impl ImageType {
    /// Terminator of the supported-format list in the camera descriptor.
    pub const END: i32 = -1;

    /// Every known image type.
    pub const ALL: [Self; 4] = [Self::Raw8, Self::Rgb24, Self::Raw16, Self::Y8];

    /// Map a raw image type id.
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|fmt| *fmt as i32 == raw)
    }

    /// The SDK constant name for this format.
    pub fn label(self) -> &'static str {
        match self {
            Self::Raw8 => "ASI_IMG_RAW8",
            Self::Rgb24 => "ASI_IMG_RGB24",
            Self::Raw16 => "ASI_IMG_RAW16",
            Self::Y8 => "ASI_IMG_Y8",
        }
    }

    /// Bytes the SDK writes per pixel in this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Raw8 | Self::Y8 => 1,
            Self::Raw16 => 2,
            Self::Rgb24 => 3,
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ImageType {
    type Err = Error;

    /// Accepts `rgb24`, `RAW16` or `ASI_IMG_Y8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        let name = name.strip_prefix("ASI_IMG_").unwrap_or(&name);
        Self::ALL
            .iter()
            .copied()
            .find(|fmt| &fmt.label()["ASI_IMG_".len()..] == name)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown image type '{}'", s.trim())))
    }
}

/// Label for a raw image type id.
///
/// Unknown ids produce `"Unknown ASI_IMG_TYPE"` and a warning.
pub fn image_type_label(raw: i32) -> &'static str {
    match ImageType::from_raw(raw) {
        Some(fmt) => fmt.label(),
        None => {
            warn!("Unknown ASI_IMG_TYPE! [{raw}]");
            "Unknown ASI_IMG_TYPE"
        }
    }
}

/// State of a snap exposure.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureStatus {
    /// Idle, ready to start an exposure.
    Idle = 0,
    /// Exposing.
    Working = 1,
    /// Exposure finished, waiting for download.
    Success = 2,
    /// Exposure failed, start a new one.
    Failed = 3,
}

impl ExposureStatus {
    /// Map a raw exposure status.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Idle),
            1 => Some(Self::Working),
            2 => Some(Self::Success),
            3 => Some(Self::Failed),
            _ => None,
        }
    }

    /// The SDK constant name for this status.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "ASI_EXP_IDLE",
            Self::Working => "ASI_EXP_WORKING",
            Self::Success => "ASI_EXP_SUCCESS",
            Self::Failed => "ASI_EXP_FAILED",
        }
    }
}

/// Label for a raw exposure status.
pub fn exposure_status_label(raw: i32) -> &'static str {
    match ExposureStatus::from_raw(raw) {
        Some(status) => status.label(),
        None => {
            warn!("Unknown ASI_EXPOSURE_STATUS! [{raw}]");
            "Unknown ASI_EXPOSURE_STATUS"
        }
    }
}

/// Color filter array layout of color sensors.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BayerPattern {
    /// RGGB
    Rg = 0,
    /// BGGR
    Bg = 1,
    /// GRBG
    Gr = 2,
    /// GBRG
    Gb = 3,
}

impl BayerPattern {
    /// Map a raw Bayer pattern id.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Rg),
            1 => Some(Self::Bg),
            2 => Some(Self::Gr),
            3 => Some(Self::Gb),
            _ => None,
        }
    }

    /// The SDK constant name for this pattern.
    pub fn label(self) -> &'static str {
        match self {
            Self::Rg => "ASI_BAYER_RG",
            Self::Bg => "ASI_BAYER_BG",
            Self::Gr => "ASI_BAYER_GR",
            Self::Gb => "ASI_BAYER_GB",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_labels() {
        let expected = [
            (0, "ASI_SUCCESS"),
            (1, "ASE_ERROR_INVALID_INDEX"),
            (2, "ASI_ERROR_INVALID_ID"),
            (3, "ASI_ERROR_INVALID_CONTROL_TYPE"),
            (4, "ASI_ERROR_CAMERA_CLOSED"),
            (5, "ASI_ERROR_CAMERA_REMOVED"),
            (6, "ASI_ERROR_INVALID_PATH"),
            (7, "ASI_ERROR_INVALID_FILEFORMAT"),
            (8, "ASI_ERROR_INVALID_SIZE"),
            (9, "ASI_ERROR_INVALID_IMGTYPE"),
            (10, "ASI_ERROR_OUTOF_BOUNDARY"),
            (11, "ASI_ERROR_TIMEOUT"),
            (12, "ASI_ERROR_INVALID_SEQUENCE"),
            (13, "ASI_ERROR_BUFFER_TOO_SMALL"),
            (14, "ASI_ERROR_VIDEO_MODE_ACTIVE"),
            (15, "ASI_ERROR_EXPOSURE_IN_PROGRESS"),
            (16, "ASI_ERROR_GENERAL_ERROR"),
            (17, "ASI_ERROR_INVALID_MODE"),
        ];
        for (raw, label) in expected {
            assert_eq!(error_code_label(raw), label, "code {raw}");
        }
        assert_eq!(error_code_label(-3), "Unknown ASI_ERROR_CODE");
        assert_eq!(error_code_label(1000), "Unknown ASI_ERROR_CODE");
    }

    #[test]
    fn control_type_labels() {
        let expected = [
            (0, "ASI_GAIN"),
            (1, "ASI_EXPOSURE"),
            (2, "ASI_GAMMA"),
            (3, "ASI_WB_R"),
            (4, "ASI_WB_B"),
            (5, "ASI_OFFSET"),
            (6, "ASI_BANDWIDTHOVERLOAD"),
            (7, "ASI_OVERCLOCK"),
            (8, "ASI_TEMPERATURE"),
            (9, "ASI_FLIP"),
            (10, "ASI_AUTO_MAX_GAIN"),
            (11, "ASI_AUTO_MAX_EXP"),
            (12, "ASI_AUTO_TARGET_BRIGHTNESS"),
            (13, "ASI_HARDWARE_BIN"),
            (14, "ASI_HIGH_SPEED_MODE"),
            (15, "ASI_COOLER_POWER_PERC"),
            (16, "ASI_TARGET_TEMP"),
            (17, "ASI_COOLER_ON"),
            (18, "ASI_MONO_BIN"),
            (19, "ASI_FAN_ON"),
            (20, "ASI_PATTERN_ADJUST"),
            (21, "ASI_ANTI_DEW_HEATER"),
            (22, "ASI_FAN_ADJUST"),
            (23, "ASI_PWRLED_BRIGNT"),
            (24, "ASI_USBHUB_RESET"),
            (25, "ASI_GPS_SUPPORT"),
            (26, "ASI_GPS_START_LINE"),
            (27, "ASI_GPS_END_LINE"),
            (28, "ASI_ROLLING_INTERVAL"),
        ];
        for (raw, label) in expected {
            assert_eq!(control_type_label(raw), label, "control {raw}");
        }
        assert_eq!(control_type_label(29), "Unknown ASI_CONTROL_TYPE");
        assert_eq!(control_type_label(-1), "Unknown ASI_CONTROL_TYPE");
    }

    #[test]
    fn image_type_labels() {
        assert_eq!(image_type_label(0), "ASI_IMG_RAW8");
        assert_eq!(image_type_label(1), "ASI_IMG_RGB24");
        assert_eq!(image_type_label(2), "ASI_IMG_RAW16");
        assert_eq!(image_type_label(3), "ASI_IMG_Y8");
        assert_eq!(image_type_label(ImageType::END), "Unknown ASI_IMG_TYPE");
        assert_eq!(image_type_label(4), "Unknown ASI_IMG_TYPE");
    }

    #[test]
    fn exposure_status_labels() {
        assert_eq!(exposure_status_label(0), "ASI_EXP_IDLE");
        assert_eq!(exposure_status_label(1), "ASI_EXP_WORKING");
        assert_eq!(exposure_status_label(2), "ASI_EXP_SUCCESS");
        assert_eq!(exposure_status_label(3), "ASI_EXP_FAILED");
        assert_eq!(exposure_status_label(7), "Unknown ASI_EXPOSURE_STATUS");
    }

    #[test]
    fn control_names_parse() {
        assert_eq!("gain".parse::<ControlType>().unwrap(), ControlType::Gain);
        assert_eq!(
            "ASI_TARGET_TEMP".parse::<ControlType>().unwrap(),
            ControlType::TargetTemp
        );
        assert_eq!(" wb_r ".parse::<ControlType>().unwrap(), ControlType::WhiteBalR);
        assert_eq!(
            "brightness".parse::<ControlType>().unwrap(),
            ControlType::Offset
        );
        assert!("shutter".parse::<ControlType>().is_err());
        assert_eq!(ControlType::HighSpeedMode.short_name(), "high_speed_mode");
    }

    #[test]
    fn image_types_parse() {
        assert_eq!("rgb24".parse::<ImageType>().unwrap(), ImageType::Rgb24);
        assert_eq!("ASI_IMG_RAW16".parse::<ImageType>().unwrap(), ImageType::Raw16);
        assert_eq!("y8".parse::<ImageType>().unwrap(), ImageType::Y8);
        assert!("raw12".parse::<ImageType>().is_err());
        assert_eq!(ImageType::Rgb24.bytes_per_pixel(), 3);
        assert_eq!(ImageType::Raw16.bytes_per_pixel(), 2);
        assert_eq!(ImageType::Y8.bytes_per_pixel(), 1);
    }
}
