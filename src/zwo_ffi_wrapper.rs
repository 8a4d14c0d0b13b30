//! [`AsiSdk`] backed by the vendor library.
use std::ffi::{c_char, c_int, c_long, CStr};

use crate::{
    codes::{AsiErrorCode, BayerPattern, ControlType, ExposureStatus, ImageType},
    sdk::{AsiSdk, CameraInfo, ControlCaps, RoiFormat, SdkResult},
    zwo_ffi::*,
};

macro_rules! assert_codes {
    ($($sdk:ident == $ours:expr),* $(,)?) => {
        const _: () = {
            $(assert!($sdk as i32 == $ours as i32, stringify!($sdk));)*
        };
    };
}

assert_codes! {
    ASI_ERROR_CODE_ASI_SUCCESS == AsiErrorCode::Success,
    ASI_ERROR_CODE_ASI_ERROR_INVALID_INDEX == AsiErrorCode::InvalidIndex,
    ASI_ERROR_CODE_ASI_ERROR_CAMERA_CLOSED == AsiErrorCode::CameraClosed,
    ASI_ERROR_CODE_ASI_ERROR_TIMEOUT == AsiErrorCode::Timeout,
    ASI_ERROR_CODE_ASI_ERROR_GENERAL_ERROR == AsiErrorCode::GeneralError,
    ASI_ERROR_CODE_ASI_ERROR_INVALID_MODE == AsiErrorCode::InvalidMode,
    ASI_CONTROL_TYPE_ASI_GAIN == ControlType::Gain,
    ASI_CONTROL_TYPE_ASI_EXPOSURE == ControlType::Exposure,
    ASI_CONTROL_TYPE_ASI_TEMPERATURE == ControlType::Temperature,
    ASI_CONTROL_TYPE_ASI_USBHUB_RESET == ControlType::UsbHubReset,
    ASI_CONTROL_TYPE_ASI_ROLLING_INTERVAL == ControlType::RollingInterval,
    ASI_IMG_TYPE_ASI_IMG_RAW8 == ImageType::Raw8,
    ASI_IMG_TYPE_ASI_IMG_RGB24 == ImageType::Rgb24,
    ASI_IMG_TYPE_ASI_IMG_RAW16 == ImageType::Raw16,
    ASI_IMG_TYPE_ASI_IMG_Y8 == ImageType::Y8,
    ASI_IMG_TYPE_ASI_IMG_END == ImageType::END,
    ASI_EXPOSURE_STATUS_ASI_EXP_IDLE == ExposureStatus::Idle,
    ASI_EXPOSURE_STATUS_ASI_EXP_FAILED == ExposureStatus::Failed,
    ASI_BAYER_PATTERN_ASI_BAYER_RG == BayerPattern::Rg,
    ASI_BAYER_PATTERN_ASI_BAYER_GB == BayerPattern::Gb,
}

impl Default for ASI_CAMERA_INFO {
    fn default() -> Self {
        Self {
            Name: [0; 64],
            CameraID: Default::default(),
            MaxHeight: Default::default(),
            MaxWidth: Default::default(),
            IsColorCam: Default::default(),
            BayerPattern: Default::default(),
            SupportedBins: Default::default(),
            SupportedVideoFormat: Default::default(),
            PixelSize: Default::default(),
            MechanicalShutter: Default::default(),
            ST4Port: Default::default(),
            IsCoolerCam: Default::default(),
            IsUSB3Host: Default::default(),
            IsUSB3Camera: Default::default(),
            ElecPerADU: Default::default(),
            BitDepth: Default::default(),
            IsTriggerCam: Default::default(),
            Unused: Default::default(),
        }
    }
}

impl Default for ASI_CONTROL_CAPS {
    fn default() -> Self {
        Self {
            Name: [0; 64],
            Description: [0; 128],
            MaxValue: Default::default(),
            MinValue: Default::default(),
            DefaultValue: Default::default(),
            IsAutoSupported: Default::default(),
            ControlType: Default::default(),
            IsWritable: Default::default(),
            Unused: Default::default(),
        }
    }
}

/// Text of a fixed-size, NUL-padded C string field.
fn string_from_char(field: &[c_char]) -> String {
    let bytes: &[u8] = bytemuck::cast_slice(field);
    match CStr::from_bytes_until_nul(bytes) {
        Ok(text) => text.to_string_lossy().into_owned(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn is_true(flag: ASI_BOOL) -> bool {
    flag == ASI_BOOL_ASI_TRUE
}

fn asi_bool(flag: bool) -> ASI_BOOL {
    if flag {
        ASI_BOOL_ASI_TRUE
    } else {
        ASI_BOOL_ASI_FALSE
    }
}

impl From<&ASI_CAMERA_INFO> for CameraInfo {
    fn from(value: &ASI_CAMERA_INFO) -> Self {
        let is_color_cam = is_true(value.IsColorCam);
        Self {
            name: string_from_char(&value.Name),
            camera_id: value.CameraID as _,
            max_height: value.MaxHeight as _,
            max_width: value.MaxWidth as _,
            is_color_cam,
            bayer_pattern: is_color_cam
                .then(|| BayerPattern::from_raw(value.BayerPattern as _))
                .flatten(),
            supported_bins: value
                .SupportedBins
                .iter()
                .take_while(|bin| **bin != 0)
                .map(|bin| *bin as i32)
                .collect(),
            supported_formats: value
                .SupportedVideoFormat
                .iter()
                .map(|fmt| *fmt as i32)
                .take_while(|fmt| *fmt != ImageType::END)
                .collect(),
            pixel_size: value.PixelSize,
            mechanical_shutter: is_true(value.MechanicalShutter),
            st4_port: is_true(value.ST4Port),
            is_cooler_cam: is_true(value.IsCoolerCam),
            is_usb3_host: is_true(value.IsUSB3Host),
            is_usb3_camera: is_true(value.IsUSB3Camera),
            elec_per_adu: value.ElecPerADU,
            bit_depth: value.BitDepth as _,
            is_trigger_cam: is_true(value.IsTriggerCam),
        }
    }
}

impl From<&ASI_CONTROL_CAPS> for ControlCaps {
    fn from(value: &ASI_CONTROL_CAPS) -> Self {
        Self {
            name: string_from_char(&value.Name),
            description: string_from_char(&value.Description),
            control_type: value.ControlType as _,
            max_value: value.MaxValue as _,
            min_value: value.MinValue as _,
            default_value: value.DefaultValue as _,
            is_auto_supported: is_true(value.IsAutoSupported),
            is_writable: is_true(value.IsWritable),
        }
    }
}

fn check(ret: ASI_ERROR_CODE) -> SdkResult<()> {
    if ret == ASI_ERROR_CODE_ASI_SUCCESS {
        Ok(())
    } else {
        Err(ret as i32)
    }
}

/// The vendor library, `libASICamera2`.
///
/// The library keeps its own global state, so every instance talks to the
/// same set of cameras.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsiSdkFfi;

impl AsiSdk for AsiSdkFfi {
    fn num_connected_cameras(&self) -> i32 {
        unsafe { ASIGetNumOfConnectedCameras() as _ }
    }

    fn camera_property(&self, index: i32) -> SdkResult<CameraInfo> {
        let mut info = ASI_CAMERA_INFO::default();
        check(unsafe { ASIGetCameraProperty(&mut info, index as c_int) })?;
        Ok(CameraInfo::from(&info))
    }

    fn open_camera(&self, camera_id: i32) -> SdkResult<()> {
        check(unsafe { ASIOpenCamera(camera_id as c_int) })
    }

    fn init_camera(&self, camera_id: i32) -> SdkResult<()> {
        check(unsafe { ASIInitCamera(camera_id as c_int) })
    }

    fn close_camera(&self, camera_id: i32) -> SdkResult<()> {
        check(unsafe { ASICloseCamera(camera_id as c_int) })
    }

    fn num_controls(&self, camera_id: i32) -> SdkResult<i32> {
        let mut count: c_int = 0;
        check(unsafe { ASIGetNumOfControls(camera_id as c_int, &mut count) })?;
        Ok(count as _)
    }

    fn control_caps(&self, camera_id: i32, index: i32) -> SdkResult<ControlCaps> {
        let mut caps = ASI_CONTROL_CAPS::default();
        check(unsafe { ASIGetControlCaps(camera_id as c_int, index as c_int, &mut caps) })?;
        Ok(ControlCaps::from(&caps))
    }

    fn control_value(&self, camera_id: i32, control_type: i32) -> SdkResult<(i64, bool)> {
        let mut value: c_long = 0;
        let mut auto: ASI_BOOL = ASI_BOOL_ASI_FALSE;
        check(unsafe {
            ASIGetControlValue(camera_id as c_int, control_type as _, &mut value, &mut auto)
        })?;
        Ok((value as _, is_true(auto)))
    }

    fn set_control_value(
        &self,
        camera_id: i32,
        control: ControlType,
        value: i64,
        auto: bool,
    ) -> SdkResult<()> {
        check(unsafe {
            ASISetControlValue(
                camera_id as c_int,
                control as i32 as _,
                value as c_long,
                asi_bool(auto),
            )
        })
    }

    fn set_roi_format(&self, camera_id: i32, roi: &RoiFormat) -> SdkResult<()> {
        check(unsafe {
            ASISetROIFormat(
                camera_id as c_int,
                roi.width as c_int,
                roi.height as c_int,
                roi.bin as c_int,
                roi.image_type as i32 as _,
            )
        })
    }

    fn start_exposure(&self, camera_id: i32, dark: bool) -> SdkResult<()> {
        check(unsafe { ASIStartExposure(camera_id as c_int, asi_bool(dark)) })
    }

    fn exposure_status(&self, camera_id: i32) -> SdkResult<ExposureStatus> {
        let mut status: ASI_EXPOSURE_STATUS = ASI_EXPOSURE_STATUS_ASI_EXP_IDLE;
        check(unsafe { ASIGetExpStatus(camera_id as c_int, &mut status) })?;
        ExposureStatus::from_raw(status as _).ok_or(AsiErrorCode::GeneralError as i32)
    }

    fn stop_exposure(&self, camera_id: i32) -> SdkResult<()> {
        check(unsafe { ASIStopExposure(camera_id as c_int) })
    }

    fn data_after_exposure(&self, camera_id: i32, buffer: &mut [u8]) -> SdkResult<()> {
        check(unsafe {
            ASIGetDataAfterExp(
                camera_id as c_int,
                buffer.as_mut_ptr(),
                buffer.len() as c_long,
            )
        })
    }
}
