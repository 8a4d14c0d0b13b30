//! Netpbm writers for captured frames.
//!
//! Color frames go to binary PPM (`P6`), mono frames to binary PGM (`P5`).
//! Samples are written row-major, exactly as the SDK delivered them.
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{Error, Result};

fn take<T>(data: &[T], len: usize) -> io::Result<&[T]> {
    data.get(..len).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("pixel buffer holds {} samples, need {len}", data.len()),
        )
    })
}

fn samples(width: u32, height: u32, channels: usize) -> usize {
    width as usize * height as usize * channels
}

/// Write an 8-bit RGB image as binary PPM.
///
/// `data` holds `width * height` pixel triples. Extra trailing bytes are ignored.
///
/// # Examples
///
/// ```
/// let mut out = Vec::new();
/// asi_capture::pnm::write_ppm(&mut out, 2, 1, &[255, 0, 0, 0, 255, 0]).unwrap();
/// assert_eq!(out, b"P6\n2 1\n255\n\xff\x00\x00\x00\xff\x00");
/// ```
pub fn write_ppm<W: Write>(out: &mut W, width: u32, height: u32, data: &[u8]) -> io::Result<()> {
    let pixels = take(data, samples(width, height, 3))?;
    write!(out, "P6\n{width} {height}\n255\n")?;
    out.write_all(pixels)
}

/// Write an 8-bit grayscale image as binary PGM.
pub fn write_pgm8<W: Write>(out: &mut W, width: u32, height: u32, data: &[u8]) -> io::Result<()> {
    let pixels = take(data, samples(width, height, 1))?;
    write!(out, "P5\n{width} {height}\n255\n")?;
    out.write_all(pixels)
}

/// Write a 16-bit grayscale image as binary PGM, samples big-endian.
pub fn write_pgm16<W: Write>(out: &mut W, width: u32, height: u32, data: &[u16]) -> io::Result<()> {
    let pixels = take(data, samples(width, height, 1))?;
    write!(out, "P5\n{width} {height}\n65535\n")?;
    for px in pixels {
        out.write_all(&px.to_be_bytes())?;
    }
    Ok(())
}

/// Create `path` and hand a buffered writer to `body`.
///
/// Any failure, including the final flush, is reported against `path`.
pub(crate) fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    body(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| Error::io(path, e))
}

/// Save an 8-bit RGB image to `path` as binary PPM.
pub fn save_ppm(path: &Path, width: u32, height: u32, data: &[u8]) -> Result<()> {
    write_file(path, |out| write_ppm(out, width, height, data))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn ppm_header_and_pixels() {
        let mut out = Vec::new();
        write_ppm(&mut out, 2, 1, &[255, 0, 0, 0, 255, 0]).unwrap();
        let mut expected = b"P6\n2 1\n255\n".to_vec();
        expected.extend_from_slice(&[255, 0, 0, 0, 255, 0]);
        assert_eq!(out, expected);
    }

    #[test]
    fn ppm_rejects_short_buffer() {
        let mut out = Vec::new();
        let err = write_ppm(&mut out, 2, 2, &[0; 11]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(out.is_empty());
    }

    #[test]
    fn pgm_variants() {
        let mut out = Vec::new();
        write_pgm8(&mut out, 3, 1, &[1, 2, 3, 4]).unwrap();
        assert_eq!(out, b"P5\n3 1\n255\n\x01\x02\x03");

        let mut out = Vec::new();
        write_pgm16(&mut out, 2, 1, &[0x0102, 0xfffe]).unwrap();
        assert_eq!(out, b"P5\n2 1\n65535\n\x01\x02\xff\xfe");
    }

    #[test]
    fn save_ppm_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.ppm");
        save_ppm(&path, 2, 1, &[255, 0, 0, 0, 255, 0]).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..11], b"P6\n2 1\n255\n");
        assert_eq!(&bytes[11..], &[255, 0, 0, 0, 255, 0]);
    }

    #[test]
    fn save_ppm_reports_unopenable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.ppm");
        match save_ppm(&path, 1, 1, &[0, 0, 0]) {
            Err(Error::Io { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }
}
