//! The boundary to the vendor SDK.
//!
//! Every camera operation is a single blocking call into `libASICamera2`.
//! [`AsiSdk`] lists the calls the utilities make, so the capture pipeline can
//! be driven either by the real library or by a scripted stand-in.
use std::fmt::{self, Display, Formatter};

use crate::codes::{control_type_label, image_type_label, BayerPattern, ControlType, ExposureStatus, ImageType};

/// Result of a raw SDK call: the value, or the non-success status code.
pub type SdkResult<T> = std::result::Result<T, i32>;

/// Call an [`AsiSdk`] method, turning a non-success status into
/// [`Error::Sdk`](crate::Error::Sdk) and returning it from the enclosing function.
///
/// The error records the call name and the source location of the call site.
#[macro_export]
macro_rules! asi_call {
    ($sdk:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $sdk.$func($($arg),*) {
            Ok(value) => value,
            Err(status) => {
                log::warn!(
                    "Error calling {}(): {} [{}]",
                    stringify!($func),
                    status,
                    $crate::codes::error_code_label(status)
                );
                return Err($crate::Error::Sdk {
                    call: stringify!($func),
                    status,
                    file: file!(),
                    line: line!(),
                });
            }
        }
    };
}

/// Descriptor of a connected camera, as reported by the SDK.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraInfo {
    /// Model name.
    pub name: String,
    /// ID used by every per-camera call.
    pub camera_id: i32,
    /// Sensor height in pixels.
    pub max_height: i64,
    /// Sensor width in pixels.
    pub max_width: i64,
    /// Whether the sensor has a color filter array.
    pub is_color_cam: bool,
    /// Color filter layout, for color sensors.
    pub bayer_pattern: Option<BayerPattern>,
    /// Supported binning factors.
    pub supported_bins: Vec<i32>,
    /// Supported pixel formats, as raw image type ids.
    pub supported_formats: Vec<i32>,
    /// Pixel size in micrometers.
    pub pixel_size: f64,
    /// Whether the camera has a mechanical shutter.
    pub mechanical_shutter: bool,
    /// Whether the camera has an ST4 guide port.
    pub st4_port: bool,
    /// Whether the camera has a cooler.
    pub is_cooler_cam: bool,
    /// Whether the host port is USB3.
    pub is_usb3_host: bool,
    /// Whether the camera is USB3.
    pub is_usb3_camera: bool,
    /// Electrons per ADU at unity gain.
    pub elec_per_adu: f32,
    /// ADC bit depth.
    pub bit_depth: i32,
    /// Whether the camera supports external triggering.
    pub is_trigger_cam: bool,
}

impl CameraInfo {
    /// Whether the camera can deliver frames in `image_type`.
    pub fn supports(&self, image_type: ImageType) -> bool {
        self.supported_formats.contains(&(image_type as i32))
    }

    /// One-line listing entry, `<name> [index <camera id>]`.
    pub fn list_entry(&self) -> String {
        format!("{} [index {}]", self.name, self.camera_id)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

impl Display for CameraInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "-- Camera Information for {} [{}] --", self.name, self.camera_id)?;
        writeln!(
            f,
            "   Height: {} Width: {} Pixel Size: {:.6} Bit Depth: {}",
            self.max_height, self.max_width, self.pixel_size, self.bit_depth
        )?;
        writeln!(f, "   Color? {}", yes_no(self.is_color_cam))?;
        if let Some(bayer) = self.bayer_pattern {
            writeln!(f, "   Bayer Pattern: {}", bayer.label())?;
        }
        writeln!(f, "   Mechanical Shutter? {}", yes_no(self.mechanical_shutter))?;
        writeln!(f, "   Cooler? {}", yes_no(self.is_cooler_cam))?;
        write!(f, "   Supported Bins: ")?;
        for bin in &self.supported_bins {
            write!(f, "Bin{bin} ")?;
        }
        writeln!(f)?;
        write!(f, "   Supported Video Modes: ")?;
        for fmt in &self.supported_formats {
            write!(f, "{} ", image_type_label(*fmt))?;
        }
        writeln!(f)
    }
}

/// Limits and flags of one tunable camera parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCaps {
    /// Control name reported by the camera.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Raw control type id.
    pub control_type: i32,
    /// Largest accepted value.
    pub max_value: i64,
    /// Smallest accepted value.
    pub min_value: i64,
    /// Default value.
    pub default_value: i64,
    /// Whether the control has an auto mode.
    pub is_auto_supported: bool,
    /// Whether the control can be written.
    pub is_writable: bool,
}

impl ControlCaps {
    /// The control type, if it is one this crate knows.
    pub fn control(&self) -> Option<ControlType> {
        ControlType::from_raw(self.control_type)
    }
}

/// A control's capabilities together with its current setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlReading {
    /// Capabilities of the control.
    pub caps: ControlCaps,
    /// Current value.
    pub value: i64,
    /// Whether auto mode is on.
    pub is_auto: bool,
}

impl Display for ControlReading {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let caps = &self.caps;
        writeln!(
            f,
            "{} [{}/{}] - {}",
            caps.name,
            control_type_label(caps.control_type),
            caps.control_type,
            caps.description
        )?;
        writeln!(
            f,
            "    Auto Supported? {} Writeable? {} Auto On? {} Current: {} Default: {} Min: {} Max: {}",
            u8::from(caps.is_auto_supported),
            u8::from(caps.is_writable),
            u8::from(self.is_auto),
            self.value,
            caps.default_value,
            caps.min_value,
            caps.max_value
        )
    }
}

/// Region of interest and pixel format for the next exposures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiFormat {
    /// Width in binned pixels.
    pub width: u32,
    /// Height in binned pixels.
    pub height: u32,
    /// Binning factor.
    pub bin: u32,
    /// Pixel format.
    pub image_type: ImageType,
}

impl RoiFormat {
    /// The whole sensor at binning `bin`.
    ///
    /// The SDK wants the width to be a multiple of 8 and the height a
    /// multiple of 2, so a binned size is rounded down to fit.
    pub fn full_frame(info: &CameraInfo, bin: u32, image_type: ImageType) -> Self {
        let bin = bin.max(1);
        let width = u32::try_from(info.max_width.max(0)).unwrap_or(u32::MAX) / bin;
        let height = u32::try_from(info.max_height.max(0)).unwrap_or(u32::MAX) / bin;
        Self {
            width: width - width % 8,
            height: height - height % 2,
            bin,
            image_type,
        }
    }

    /// Bytes the SDK writes for one frame in this format.
    pub fn buffer_size(&self) -> usize {
        self.pixels() * self.image_type.bytes_per_pixel()
    }

    /// Pixel count of one frame.
    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// The SDK calls the utilities rely on.
///
/// Methods map one-to-one onto `ASICamera2.h` functions and return the raw
/// status code on failure. Use [`asi_call!`](crate::asi_call) at call sites.
pub trait AsiSdk {
    /// `ASIGetNumOfConnectedCameras`. Must be called before any other call.
    fn num_connected_cameras(&self) -> i32;
    /// `ASIGetCameraProperty` for the camera at `index`.
    fn camera_property(&self, index: i32) -> SdkResult<CameraInfo>;
    /// `ASIOpenCamera`.
    fn open_camera(&self, camera_id: i32) -> SdkResult<()>;
    /// `ASIInitCamera`.
    fn init_camera(&self, camera_id: i32) -> SdkResult<()>;
    /// `ASICloseCamera`.
    fn close_camera(&self, camera_id: i32) -> SdkResult<()>;
    /// `ASIGetNumOfControls`.
    fn num_controls(&self, camera_id: i32) -> SdkResult<i32>;
    /// `ASIGetControlCaps` for the control at `index`.
    fn control_caps(&self, camera_id: i32, index: i32) -> SdkResult<ControlCaps>;
    /// `ASIGetControlValue`: the value and whether auto mode is on.
    fn control_value(&self, camera_id: i32, control_type: i32) -> SdkResult<(i64, bool)>;
    /// `ASISetControlValue`.
    fn set_control_value(
        &self,
        camera_id: i32,
        control: ControlType,
        value: i64,
        auto: bool,
    ) -> SdkResult<()>;
    /// `ASISetROIFormat`.
    fn set_roi_format(&self, camera_id: i32, roi: &RoiFormat) -> SdkResult<()>;
    /// `ASIStartExposure`.
    fn start_exposure(&self, camera_id: i32, dark: bool) -> SdkResult<()>;
    /// `ASIGetExpStatus`.
    fn exposure_status(&self, camera_id: i32) -> SdkResult<ExposureStatus>;
    /// `ASIStopExposure`.
    fn stop_exposure(&self, camera_id: i32) -> SdkResult<()>;
    /// `ASIGetDataAfterExp`, filling `buffer` with the last frame.
    fn data_after_exposure(&self, camera_id: i32, buffer: &mut [u8]) -> SdkResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSdk;

    #[test]
    fn full_frame_rounds_to_sdk_alignment() {
        let mut info = MockSdk::camera_info(0, "ZWO ASI183MC");
        info.max_width = 5496;
        info.max_height = 3672;
        let roi = RoiFormat::full_frame(&info, 1, ImageType::Rgb24);
        assert_eq!((roi.width, roi.height), (5496, 3672));
        let roi = RoiFormat::full_frame(&info, 3, ImageType::Raw16);
        assert_eq!((roi.width, roi.height, roi.bin), (1832, 1224, 3));
        let roi = RoiFormat::full_frame(&info, 0, ImageType::Raw8);
        assert_eq!(roi.bin, 1);
        assert_eq!(roi.buffer_size(), 5496 * 3672);
    }

    #[test]
    fn camera_info_display() {
        let info = MockSdk::camera_info(0, "ZWO ASI120MC-S");
        let text = info.to_string();
        assert!(text.starts_with("-- Camera Information for ZWO ASI120MC-S [0] --\n"));
        assert!(text.contains("   Color? Yes\n"));
        assert!(text.contains("   Supported Bins: Bin1 Bin2 \n"));
        assert!(text.contains("   Supported Video Modes: ASI_IMG_RAW8 ASI_IMG_RGB24 ASI_IMG_RAW16 ASI_IMG_Y8 \n"));
    }

    #[test]
    fn list_entry_uses_camera_id() {
        let info = MockSdk::camera_info(3, "ZWO ASI294MM");
        assert_eq!(info.list_entry(), "ZWO ASI294MM [index 3]");
    }

    #[test]
    fn control_reading_display() {
        let reading = ControlReading {
            caps: ControlCaps {
                name: "Gain".to_string(),
                description: "Gain".to_string(),
                control_type: ControlType::Gain as i32,
                max_value: 100,
                min_value: 0,
                default_value: 50,
                is_auto_supported: true,
                is_writable: true,
            },
            value: 42,
            is_auto: false,
        };
        let text = reading.to_string();
        assert!(text.starts_with("Gain [ASI_GAIN/0] - Gain\n"));
        assert!(text.ends_with(
            "    Auto Supported? 1 Writeable? 1 Auto On? 0 Current: 42 Default: 50 Min: 0 Max: 100\n"
        ));
    }
}
