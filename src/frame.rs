use std::{
    fmt::{self, Display, Formatter},
    path::{Path, PathBuf},
    str::FromStr,
};

use image::{ImageBuffer, Luma, Rgb};

use crate::{
    codes::ImageType,
    pnm::{write_file, write_pgm16, write_pgm8, write_ppm},
    sdk::RoiFormat,
    Error, Result,
};

/// Pixel storage of a frame. RAW16 frames are kept as 16-bit words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameData {
    /// One byte per sample.
    U8(Vec<u8>),
    /// One native-endian word per sample.
    U16(Vec<u16>),
}

impl FrameData {
    /// A zeroed buffer large enough for one frame in `roi`.
    pub fn for_roi(roi: &RoiFormat) -> Self {
        match roi.image_type {
            ImageType::Raw16 => Self::U16(vec![0; roi.pixels()]),
            other => Self::U8(vec![0; roi.pixels() * other.bytes_per_pixel()]),
        }
    }

    /// The raw bytes, as the SDK wrote them.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::U8(data) => data,
            Self::U16(data) => bytemuck::cast_slice(data),
        }
    }

    /// The raw bytes, for the SDK to fill.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Self::U8(data) => data,
            Self::U16(data) => bytemuck::cast_slice_mut(data),
        }
    }
}

/// One downloaded exposure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format the SDK delivered.
    pub image_type: ImageType,
    /// Pixel samples, row-major.
    pub data: FrameData,
}

impl Frame {
    /// Swap the first and third byte of every pixel of an RGB24 frame.
    ///
    /// The SDK delivers RGB24 frames in B, G, R order.
    pub fn bgr_to_rgb(&mut self) {
        if let (ImageType::Rgb24, FrameData::U8(data)) = (self.image_type, &mut self.data) {
            for px in data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
        }
    }

    /// File extension for this frame in `format`.
    pub fn extension(&self, format: OutputFormat) -> &'static str {
        match (format, self.image_type) {
            (OutputFormat::Png, _) => "png",
            (OutputFormat::Pnm, ImageType::Rgb24) => "ppm",
            (OutputFormat::Pnm, _) => "pgm",
        }
    }

    /// Write the frame to `path`.
    pub fn save(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let (width, height) = (self.width, self.height);
        match (format, &self.data) {
            (OutputFormat::Pnm, FrameData::U8(data)) if self.image_type == ImageType::Rgb24 => {
                write_file(path, |out| write_ppm(out, width, height, data))
            }
            (OutputFormat::Pnm, FrameData::U8(data)) => {
                write_file(path, |out| write_pgm8(out, width, height, data))
            }
            (OutputFormat::Pnm, FrameData::U16(data)) => {
                write_file(path, |out| write_pgm16(out, width, height, data))
            }
            (OutputFormat::Png, FrameData::U8(data)) if self.image_type == ImageType::Rgb24 => {
                let img = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, data.as_slice())
                    .ok_or_else(|| self.short_buffer(path))?;
                img.save(path).map_err(|e| image_error(path, e))
            }
            (OutputFormat::Png, FrameData::U8(data)) => {
                let img = ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data.as_slice())
                    .ok_or_else(|| self.short_buffer(path))?;
                img.save(path).map_err(|e| image_error(path, e))
            }
            (OutputFormat::Png, FrameData::U16(data)) => {
                let img = ImageBuffer::<Luma<u16>, _>::from_raw(width, height, data.as_slice())
                    .ok_or_else(|| self.short_buffer(path))?;
                img.save(path).map_err(|e| image_error(path, e))
            }
        }
    }

    fn short_buffer(&self, path: &Path) -> Error {
        Error::io(
            path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "pixel buffer too small for a {}x{} {} frame",
                    self.width, self.height, self.image_type
                ),
            ),
        )
    }
}

fn image_error(path: &Path, err: image::ImageError) -> Error {
    match err {
        image::ImageError::IoError(source) => Error::io(path, source),
        other => Error::io(path, std::io::Error::new(std::io::ErrorKind::Other, other)),
    }
}

/// File format for captured frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// PPM for color frames, PGM for mono frames.
    #[default]
    Pnm,
    /// PNG through the `image` crate.
    Png,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pnm => "pnm",
            Self::Png => "png",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pnm" | "ppm" | "pgm" => Ok(Self::Pnm),
            "png" => Ok(Self::Png),
            other => Err(Error::InvalidArgument(format!("Unknown output format '{other}'"))),
        }
    }
}

/// Output path of frame `index`: the prefix, the index zero-padded to five
/// digits, then the extension.
///
/// ```
/// use asi_capture::frame_path;
/// assert_eq!(frame_path("m42_", 7, "ppm").to_str(), Some("m42_00007.ppm"));
/// ```
pub fn frame_path(prefix: &str, index: u32, extension: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}{index:05}.{extension}"))
}
