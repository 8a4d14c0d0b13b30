//! Camera enumeration, reports and the capture loop.
//!
//! A capture opens one camera, applies the configured and requested control
//! settings, then runs `count` exposures back to back. Each exposure is
//! downloaded and written to `<prefix><index:05>.<ext>` before the next one
//! starts. The first failure aborts the run; the camera is closed either way.
use std::{
    fmt::{self, Display, Formatter},
    path::{Path, PathBuf},
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use log::info;

use crate::{
    asi_call,
    asihandle::AsiHandle,
    codes::ControlType,
    config::CaptureSettings,
    frame::frame_path,
    sdk::{AsiSdk, CameraInfo, ControlReading, RoiFormat},
    Error, Result,
};

/// Target value of a control setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlValue {
    /// Let the camera regulate the control.
    Auto,
    /// Fixed value, auto mode off.
    Value(i64),
}

impl Display for ControlValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

impl FromStr for ControlValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse()
            .map(Self::Value)
            .map_err(|_| Error::InvalidArgument(format!("'{s}' is neither 'auto' nor an integer")))
    }
}

/// One `name=value` control assignment, e.g. `gain=120` or `exposure=auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSetting {
    /// Control to set.
    pub control: ControlType,
    /// Value to set it to.
    pub value: ControlValue,
}

impl Display for ControlSetting {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.control.short_name(), self.value)
    }
}

impl FromStr for ControlSetting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, value) = s.split_once('=').ok_or_else(|| {
            Error::InvalidArgument(format!("Control setting '{s}' is not of the form name=value"))
        })?;
        Ok(Self {
            control: name.parse()?,
            value: value.parse()?,
        })
    }
}

/// What to capture, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Camera index, `0..num_connected_cameras()`.
    pub camera: i32,
    /// Output path prefix.
    pub prefix: String,
    /// Number of frames.
    pub count: u32,
    /// Exposure time of each frame.
    pub exposure: Duration,
    /// Extra control settings, applied after the configured ones.
    pub controls: Vec<ControlSetting>,
}

impl FromStr for CaptureRequest {
    type Err = Error;

    /// Parses `<camera>,<prefix>,<number>,<exposure_us>[,<control>=<auto|value>...]`.
    fn from_str(s: &str) -> Result<Self> {
        let mut fields = s.split(',').map(str::trim);
        let mut next = |what: &str| {
            fields
                .next()
                .filter(|field| !field.is_empty())
                .ok_or_else(|| Error::InvalidArgument(format!("Capture option is missing the {what}")))
        };
        let camera = next("camera index")?;
        let camera = camera
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("Invalid camera index '{camera}'")))?;
        let prefix = next("output prefix")?.to_string();
        let count = next("frame count")?;
        let count = count
            .parse::<u32>()
            .ok()
            .filter(|count| *count > 0)
            .ok_or_else(|| Error::InvalidArgument(format!("Invalid frame count '{count}'")))?;
        let exposure = next("exposure time")?;
        let exposure = exposure
            .parse::<u64>()
            .map(Duration::from_micros)
            .map_err(|_| Error::InvalidArgument(format!("Invalid exposure time '{exposure}'")))?;
        let controls = fields
            .filter(|field| !field.is_empty())
            .map(str::parse)
            .collect::<Result<_>>()?;
        Ok(Self {
            camera,
            prefix,
            count,
            exposure,
            controls,
        })
    }
}

/// Check that `index` names a connected camera. Returns the camera count.
pub fn validate_index<S: AsiSdk + ?Sized>(sdk: &S, index: i32) -> Result<i32> {
    let count = sdk.num_connected_cameras();
    if count <= 0 {
        return Err(Error::NoCameras);
    }
    if index < 0 || index >= count {
        return Err(Error::InvalidIndex { index, count });
    }
    Ok(count)
}

/// Descriptors of every connected camera, in index order.
pub fn list_cameras<S: AsiSdk + ?Sized>(sdk: &S) -> Result<Vec<CameraInfo>> {
    let count = sdk.num_connected_cameras();
    if count <= 0 {
        return Err(Error::NoCameras);
    }
    let mut cameras = Vec::with_capacity(count as usize);
    for index in 0..count {
        cameras.push(asi_call!(sdk, camera_property(index)));
    }
    Ok(cameras)
}

/// Camera descriptor plus every control and its current setting.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraReport {
    /// Camera descriptor.
    pub info: CameraInfo,
    /// Controls in SDK order.
    pub controls: Vec<ControlReading>,
}

impl Display for CameraReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info)?;
        writeln!(f, "-- Capabilities --")?;
        for control in &self.controls {
            write!(f, "{control}")?;
        }
        Ok(())
    }
}

fn report_at<S: AsiSdk + ?Sized>(sdk: &S, index: i32) -> Result<CameraReport> {
    let info = asi_call!(sdk, camera_property(index));
    let camera = AsiHandle::open(sdk, info)?;
    let controls = camera.controls()?;
    Ok(CameraReport {
        info: camera.info().clone(),
        controls,
    })
}

/// Open camera `index` and read its descriptor and controls.
pub fn camera_report<S: AsiSdk + ?Sized>(sdk: &S, index: i32) -> Result<CameraReport> {
    validate_index(sdk, index)?;
    report_at(sdk, index)
}

/// Reports for every connected camera, each produced when the iterator
/// reaches it. The iterator length is the camera count.
pub fn camera_reports<S: AsiSdk + ?Sized>(
    sdk: &S,
) -> Result<impl ExactSizeIterator<Item = Result<CameraReport>> + '_> {
    let count = sdk.num_connected_cameras();
    if count <= 0 {
        return Err(Error::NoCameras);
    }
    Ok((0..count).map(move |index| report_at(sdk, index)))
}

/// Reports for every connected camera.
pub fn all_camera_reports<S: AsiSdk + ?Sized>(sdk: &S) -> Result<Vec<CameraReport>> {
    camera_reports(sdk)?.collect()
}

/// Whether the last exposure setting, configured or requested, is `auto`.
fn auto_exposure(settings: &CaptureSettings, request: &CaptureRequest) -> bool {
    settings
        .controls
        .iter()
        .chain(&request.controls)
        .filter(|setting| setting.control == ControlType::Exposure)
        .last()
        .is_some_and(|setting| setting.value == ControlValue::Auto)
}

/// Run a capture. Returns the written files in order.
pub fn capture<S: AsiSdk + ?Sized>(
    sdk: &S,
    request: &CaptureRequest,
    settings: &CaptureSettings,
    cancel: &AtomicBool,
) -> Result<Vec<PathBuf>> {
    capture_with(sdk, request, settings, cancel, |_, _| {})
}

/// Like [`capture`], calling `on_saved` with the index and path of every
/// frame once it is on disk.
pub fn capture_with<S, F>(
    sdk: &S,
    request: &CaptureRequest,
    settings: &CaptureSettings,
    cancel: &AtomicBool,
    mut on_saved: F,
) -> Result<Vec<PathBuf>>
where
    S: AsiSdk + ?Sized,
    F: FnMut(u32, &Path),
{
    validate_index(sdk, request.camera)?;
    let info = asi_call!(sdk, camera_property(request.camera));
    if !info.supports(settings.image_type) {
        return Err(Error::InvalidArgument(format!(
            "{} does not support {}",
            info.name, settings.image_type
        )));
    }
    if !info.supported_bins.contains(&(settings.bin as i32)) {
        return Err(Error::InvalidArgument(format!(
            "{} does not support binning {}",
            info.name, settings.bin
        )));
    }

    let mut camera = AsiHandle::open(sdk, info)?;
    for setting in settings.controls.iter().chain(&request.controls) {
        camera.apply(setting)?;
    }
    let exposure_auto = auto_exposure(settings, request);
    let roi = RoiFormat::full_frame(camera.info(), settings.bin, settings.image_type);
    let poll = settings.poll();
    info!(
        "Capturing {} x {:?} from {} at {}x{} bin {} ({})",
        request.count,
        request.exposure,
        camera.info().name,
        roi.width,
        roi.height,
        roi.bin,
        roi.image_type
    );

    let mut written = Vec::new();
    for index in 0..request.count {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        camera.set_roi_format(&roi)?;
        camera.set_exposure(request.exposure, exposure_auto)?;
        camera.expose(settings.dark_frame, request.exposure, &poll, cancel)?;
        let mut frame = camera.download(&roi)?;
        if settings.bgr_to_rgb {
            frame.bgr_to_rgb();
        }
        let path = frame_path(
            &request.prefix,
            index,
            frame.extension(settings.output_format),
        );
        frame.save(&path, settings.output_format)?;
        info!("Saved {}", path.display());
        on_saved(index, &path);
        written.push(path);
    }
    Ok(written)
}
