//! Scripted in-memory SDK for tests.
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
};

use crate::{
    codes::{AsiErrorCode, BayerPattern, ControlType, ExposureStatus},
    sdk::{AsiSdk, CameraInfo, ControlCaps, RoiFormat, SdkResult},
};

/// Records every call and fails the ones it was told to fail.
pub(crate) struct MockSdk {
    cameras: Vec<CameraInfo>,
    controls: Vec<ControlCaps>,
    values: RefCell<HashMap<(i32, i32), (i64, bool)>>,
    failures: Vec<(&'static str, usize, i32)>,
    calls: RefCell<Vec<&'static str>>,
    open: RefCell<HashSet<i32>>,
    roi: Cell<Option<RoiFormat>>,
    polls_until_done: u32,
    polls_left: Cell<u32>,
    outcome: ExposureStatus,
    exposing: Cell<bool>,
}

impl MockSdk {
    /// `count` identical 16x4 color cameras.
    pub fn new(count: i32) -> Self {
        Self {
            cameras: (0..count)
                .map(|id| Self::camera_info(id, "ZWO ASI120MC-S"))
                .collect(),
            controls: Self::default_controls(),
            values: RefCell::new(HashMap::new()),
            failures: Vec::new(),
            calls: RefCell::new(Vec::new()),
            open: RefCell::new(HashSet::new()),
            roi: Cell::new(None),
            polls_until_done: 2,
            polls_left: Cell::new(0),
            outcome: ExposureStatus::Success,
            exposing: Cell::new(false),
        }
    }

    pub fn camera_info(camera_id: i32, name: &str) -> CameraInfo {
        CameraInfo {
            name: name.to_string(),
            camera_id,
            max_height: 4,
            max_width: 16,
            is_color_cam: true,
            bayer_pattern: Some(BayerPattern::Rg),
            supported_bins: vec![1, 2],
            supported_formats: vec![0, 1, 2, 3],
            pixel_size: 3.75,
            mechanical_shutter: false,
            st4_port: true,
            is_cooler_cam: false,
            is_usb3_host: true,
            is_usb3_camera: true,
            elec_per_adu: 0.5,
            bit_depth: 12,
            is_trigger_cam: false,
        }
    }

    fn default_controls() -> Vec<ControlCaps> {
        let cap = |name: &str, control_type: i32, min, max, default, auto, writable| ControlCaps {
            name: name.to_string(),
            description: format!("{name} control"),
            control_type,
            max_value: max,
            min_value: min,
            default_value: default,
            is_auto_supported: auto,
            is_writable: writable,
        };
        vec![
            cap("Gain", ControlType::Gain as i32, 0, 100, 50, true, true),
            cap("Exposure", ControlType::Exposure as i32, 32, 2_000_000_000, 10_000, true, true),
            cap("Offset", ControlType::Offset as i32, 0, 50, 8, false, true),
            cap("Temperature", ControlType::Temperature as i32, -500, 1000, 20, false, false),
            cap("Mystery", 99, 0, 1, 0, false, false),
        ]
    }

    /// Fail the `nth` (1-based) invocation of `call` with `code`.
    pub fn fail_on(mut self, call: &'static str, nth: usize, code: AsiErrorCode) -> Self {
        self.failures.push((call, nth, code as i32));
        self
    }

    /// Number of `Working` polls before each exposure finishes.
    pub fn polls_until_done(mut self, polls: u32) -> Self {
        self.polls_until_done = polls;
        self
    }

    /// Status reported once an exposure finishes. `Working` never finishes.
    pub fn exposure_outcome(mut self, outcome: ExposureStatus) -> Self {
        self.outcome = outcome;
        self
    }

    /// Names of every call made so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    /// How often `call` was made.
    pub fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }

    pub fn is_open(&self, camera_id: i32) -> bool {
        self.open.borrow().contains(&camera_id)
    }

    /// Current value of `control` on `camera_id`.
    pub fn value(&self, camera_id: i32, control: ControlType) -> Option<(i64, bool)> {
        self.values.borrow().get(&(camera_id, control as i32)).copied()
    }

    fn record(&self, call: &'static str) -> SdkResult<()> {
        self.calls.borrow_mut().push(call);
        let nth = self.count(call);
        match self
            .failures
            .iter()
            .find(|(name, at, _)| *name == call && *at == nth)
        {
            Some((_, _, code)) => Err(*code),
            None => Ok(()),
        }
    }

    fn require_open(&self, camera_id: i32) -> SdkResult<()> {
        if self.cameras.iter().all(|c| c.camera_id != camera_id) {
            return Err(AsiErrorCode::InvalidId as i32);
        }
        if !self.is_open(camera_id) {
            return Err(AsiErrorCode::CameraClosed as i32);
        }
        Ok(())
    }
}

impl AsiSdk for MockSdk {
    fn num_connected_cameras(&self) -> i32 {
        self.calls.borrow_mut().push("num_connected_cameras");
        self.cameras.len() as i32
    }

    fn camera_property(&self, index: i32) -> SdkResult<CameraInfo> {
        self.record("camera_property")?;
        usize::try_from(index)
            .ok()
            .and_then(|idx| self.cameras.get(idx))
            .cloned()
            .ok_or(AsiErrorCode::InvalidIndex as i32)
    }

    fn open_camera(&self, camera_id: i32) -> SdkResult<()> {
        self.record("open_camera")?;
        if self.cameras.iter().all(|c| c.camera_id != camera_id) {
            return Err(AsiErrorCode::InvalidId as i32);
        }
        self.open.borrow_mut().insert(camera_id);
        Ok(())
    }

    fn init_camera(&self, camera_id: i32) -> SdkResult<()> {
        self.record("init_camera")?;
        self.require_open(camera_id)
    }

    fn close_camera(&self, camera_id: i32) -> SdkResult<()> {
        self.record("close_camera")?;
        self.open.borrow_mut().remove(&camera_id);
        Ok(())
    }

    fn num_controls(&self, camera_id: i32) -> SdkResult<i32> {
        self.record("num_controls")?;
        self.require_open(camera_id)?;
        Ok(self.controls.len() as i32)
    }

    fn control_caps(&self, camera_id: i32, index: i32) -> SdkResult<ControlCaps> {
        self.record("control_caps")?;
        self.require_open(camera_id)?;
        usize::try_from(index)
            .ok()
            .and_then(|idx| self.controls.get(idx))
            .cloned()
            .ok_or(AsiErrorCode::InvalidControlType as i32)
    }

    fn control_value(&self, camera_id: i32, control_type: i32) -> SdkResult<(i64, bool)> {
        self.record("control_value")?;
        self.require_open(camera_id)?;
        let caps = self
            .controls
            .iter()
            .find(|c| c.control_type == control_type)
            .ok_or(AsiErrorCode::InvalidControlType as i32)?;
        Ok(self
            .values
            .borrow()
            .get(&(camera_id, control_type))
            .copied()
            .unwrap_or((caps.default_value, false)))
    }

    fn set_control_value(
        &self,
        camera_id: i32,
        control: ControlType,
        value: i64,
        auto: bool,
    ) -> SdkResult<()> {
        self.record("set_control_value")?;
        self.require_open(camera_id)?;
        let caps = self
            .controls
            .iter()
            .find(|c| c.control_type == control as i32)
            .ok_or(AsiErrorCode::InvalidControlType as i32)?;
        if !caps.is_writable || value < caps.min_value || value > caps.max_value {
            return Err(AsiErrorCode::GeneralError as i32);
        }
        self.values
            .borrow_mut()
            .insert((camera_id, control as i32), (value, auto));
        Ok(())
    }

    fn set_roi_format(&self, camera_id: i32, roi: &RoiFormat) -> SdkResult<()> {
        self.record("set_roi_format")?;
        self.require_open(camera_id)?;
        self.roi.set(Some(*roi));
        Ok(())
    }

    fn start_exposure(&self, camera_id: i32, _dark: bool) -> SdkResult<()> {
        self.record("start_exposure")?;
        self.require_open(camera_id)?;
        if self.exposing.get() {
            return Err(AsiErrorCode::ExposureInProgress as i32);
        }
        self.exposing.set(true);
        self.polls_left.set(self.polls_until_done);
        Ok(())
    }

    fn exposure_status(&self, camera_id: i32) -> SdkResult<ExposureStatus> {
        self.record("exposure_status")?;
        self.require_open(camera_id)?;
        if !self.exposing.get() {
            return Ok(ExposureStatus::Idle);
        }
        match self.polls_left.get() {
            0 => Ok(self.outcome),
            left => {
                self.polls_left.set(left - 1);
                Ok(ExposureStatus::Working)
            }
        }
    }

    fn stop_exposure(&self, camera_id: i32) -> SdkResult<()> {
        self.record("stop_exposure")?;
        self.require_open(camera_id)?;
        self.exposing.set(false);
        Ok(())
    }

    fn data_after_exposure(&self, camera_id: i32, buffer: &mut [u8]) -> SdkResult<()> {
        self.record("data_after_exposure")?;
        self.require_open(camera_id)?;
        let roi = self.roi.get().ok_or(AsiErrorCode::InvalidSequence as i32)?;
        if buffer.len() < roi.buffer_size() {
            return Err(AsiErrorCode::BufferTooSmall as i32);
        }
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = (i % 251) as u8;
        }
        Ok(())
    }
}
