#![cfg(not(windows))]
#![warn(missing_docs)]
//! Command-line utilities for ZWO ASI cameras.
//!
//! The crate lists connected cameras, reports their capabilities and captures
//! series of still frames through the vendor SDK, `libASICamera2`. All camera
//! access goes through the [`AsiSdk`] trait. With the `sdk` feature enabled,
//! [`AsiSdkFfi`] implements it on top of bindings generated at build time.
//!
//! ```no_run
//! # #[cfg(feature = "sdk")]
//! # fn main() -> asi_capture::Result<()> {
//! use std::sync::atomic::AtomicBool;
//! use asi_capture::{capture, AsiSdkFfi, CaptureRequest, CaptureSettings};
//!
//! let request: CaptureRequest = "0,m42_,5,500000,gain=120".parse()?;
//! let written = capture(&AsiSdkFfi, &request, &CaptureSettings::default(), &AtomicBool::new(false))?;
//! println!("{} frames written", written.len());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sdk"))]
//! # fn main() {}
//! ```
mod asihandle;
pub mod capture;
pub mod codes;
pub mod config;
mod error;
mod frame;
pub mod pnm;
pub mod sdk;
#[cfg(feature = "sdk")]
mod zwo_ffi;
#[cfg(feature = "sdk")]
mod zwo_ffi_wrapper;

#[cfg(test)]
mod mock;

pub use asihandle::{AsiHandle, PollSettings};
pub use capture::{
    all_camera_reports, camera_report, camera_reports, capture, capture_with, list_cameras,
    validate_index, CameraReport, CaptureRequest, ControlSetting, ControlValue,
};
pub use codes::{AsiErrorCode, BayerPattern, ControlType, ExposureStatus, ImageType};
pub use config::CaptureSettings;
pub use error::{Error, Result};
pub use frame::{frame_path, Frame, FrameData, OutputFormat};
pub use sdk::{AsiSdk, CameraInfo, ControlCaps, ControlReading, RoiFormat, SdkResult};
#[cfg(feature = "sdk")]
pub use zwo_ffi_wrapper::AsiSdkFfi;
