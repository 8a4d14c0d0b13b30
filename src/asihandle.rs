use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread::sleep,
    time::{Duration, Instant},
};

use log::{debug, warn};

use crate::{
    asi_call,
    capture::{ControlSetting, ControlValue},
    codes::{error_code_label, ControlType, ExposureStatus},
    frame::{Frame, FrameData},
    sdk::{AsiSdk, CameraInfo, ControlReading, RoiFormat},
    Error, Result,
};

/// How an exposure is waited for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Sleep between two status polls. Zero polls without sleeping.
    pub interval: Duration,
    /// Give up after this long. `None` derives the bound from the exposure.
    pub timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10),
            timeout: None,
        }
    }
}

impl PollSettings {
    /// Wait bound for an exposure of length `exposure`: the configured
    /// timeout, or twice the exposure plus 500 ms.
    pub fn timeout_for(&self, exposure: Duration) -> Duration {
        self.timeout.unwrap_or_else(|| {
            exposure
                .saturating_mul(2)
                .saturating_add(Duration::from_millis(500))
        })
    }
}

/// An open and initialised camera.
///
/// Dropping the handle stops an exposure still in flight and closes the
/// camera, on every exit path.
pub struct AsiHandle<'a, S: AsiSdk + ?Sized> {
    sdk: &'a S,
    info: CameraInfo,
    exposing: bool,
}

impl<'a, S: AsiSdk + ?Sized> AsiHandle<'a, S> {
    /// Open and initialise the camera described by `info`.
    pub fn open(sdk: &'a S, info: CameraInfo) -> Result<Self> {
        let id = info.camera_id;
        asi_call!(sdk, open_camera(id));
        // Closed by drop if init fails.
        let handle = Self {
            sdk,
            info,
            exposing: false,
        };
        asi_call!(sdk, init_camera(id));
        debug!("Opened camera {} [{}]", handle.info.name, id);
        Ok(handle)
    }

    /// Descriptor of the open camera.
    pub fn info(&self) -> &CameraInfo {
        &self.info
    }

    fn id(&self) -> i32 {
        self.info.camera_id
    }

    /// Every control the camera exposes, with its current setting.
    pub fn controls(&self) -> Result<Vec<ControlReading>> {
        let id = self.id();
        let count = asi_call!(self.sdk, num_controls(id));
        let mut readings = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count {
            let caps = asi_call!(self.sdk, control_caps(id, index));
            let (value, is_auto) = asi_call!(self.sdk, control_value(id, caps.control_type));
            readings.push(ControlReading {
                caps,
                value,
                is_auto,
            });
        }
        Ok(readings)
    }

    /// Write `value` to `control`.
    pub fn set_control(&self, control: ControlType, value: i64, auto: bool) -> Result<()> {
        let id = self.id();
        asi_call!(self.sdk, set_control_value(id, control, value, auto));
        debug!("{} = {value} (auto: {auto})", control.label());
        Ok(())
    }

    /// Apply a parsed `name=value` setting. `auto` keeps the current value
    /// and turns auto mode on.
    pub fn apply(&self, setting: &ControlSetting) -> Result<()> {
        match setting.value {
            ControlValue::Value(value) => self.set_control(setting.control, value, false),
            ControlValue::Auto => {
                let id = self.id();
                let (value, _) = asi_call!(self.sdk, control_value(id, setting.control as i32));
                self.set_control(setting.control, value, true)
            }
        }
    }

    /// Set frame size, binning and pixel format.
    pub fn set_roi_format(&self, roi: &RoiFormat) -> Result<()> {
        let id = self.id();
        asi_call!(self.sdk, set_roi_format(id, roi));
        Ok(())
    }

    /// Set the exposure time, in microseconds. With `auto` the time is the
    /// starting point for the camera's auto exposure.
    pub fn set_exposure(&self, exposure: Duration, auto: bool) -> Result<()> {
        let micros = i64::try_from(exposure.as_micros()).unwrap_or(i64::MAX);
        self.set_control(ControlType::Exposure, micros, auto)
    }

    /// Run one exposure to completion.
    ///
    /// Polls the exposure status every `poll.interval` until the camera
    /// reports success, the wait bound passes, or `cancel` is set.
    pub fn expose(
        &mut self,
        dark: bool,
        exposure: Duration,
        poll: &PollSettings,
        cancel: &AtomicBool,
    ) -> Result<()> {
        let id = self.id();
        let timeout = poll.timeout_for(exposure);
        asi_call!(self.sdk, start_exposure(id, dark));
        self.exposing = true;
        let start = Instant::now();
        loop {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            match asi_call!(self.sdk, exposure_status(id)) {
                ExposureStatus::Success => break,
                ExposureStatus::Failed => return Err(Error::ExposureFailed),
                ExposureStatus::Idle | ExposureStatus::Working => {}
            }
            if start.elapsed() >= timeout {
                return Err(Error::ExposureTimeout(timeout));
            }
            if !poll.interval.is_zero() {
                sleep(poll.interval);
            }
        }
        asi_call!(self.sdk, stop_exposure(id));
        self.exposing = false;
        debug!("Exposure done in {:?}", start.elapsed());
        Ok(())
    }

    /// Fetch the last exposure in `roi`.
    pub fn download(&self, roi: &RoiFormat) -> Result<Frame> {
        let id = self.id();
        let mut data = FrameData::for_roi(roi);
        asi_call!(self.sdk, data_after_exposure(id, data.as_bytes_mut()));
        Ok(Frame {
            width: roi.width,
            height: roi.height,
            image_type: roi.image_type,
            data,
        })
    }
}

impl<S: AsiSdk + ?Sized> Drop for AsiHandle<'_, S> {
    fn drop(&mut self) {
        let id = self.id();
        if self.exposing {
            if let Err(status) = self.sdk.stop_exposure(id) {
                warn!(
                    "Failed to stop exposure: {status} [{}]",
                    error_code_label(status)
                );
            }
        }
        match self.sdk.close_camera(id) {
            Ok(()) => debug!("Closed camera {} [{id}]", self.info.name),
            Err(status) => warn!(
                "Failed to close camera: {status} [{}]",
                error_code_label(status)
            ),
        }
    }
}
