//! Reading and writing rendered images as PPM pixmaps.
//!
//! Encoding and decoding go through the `image` crate's PNM codec. Both the
//! binary (`P6`) and plain-text (`P3`) forms are supported, always at 8 bits
//! per channel.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use image::codecs::pnm::{PnmDecoder, PnmEncoder, PnmSubtype, SampleEncoding};
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::render::PixelGrid;

#[derive(Debug, Error)]
pub enum PpmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PPM codec error: {0}")]
    Image(#[from] image::ImageError),
}

/// Pixmap flavor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PpmFormat {
    /// `P6`: raw bytes.
    #[default]
    Binary,
    /// `P3`: whitespace-separated decimal values.
    Ascii,
}

impl PpmFormat {
    pub fn magic(&self) -> &'static str {
        match self {
            PpmFormat::Binary => "P6",
            PpmFormat::Ascii => "P3",
        }
    }

    fn encoding(&self) -> SampleEncoding {
        match self {
            PpmFormat::Binary => SampleEncoding::Binary,
            PpmFormat::Ascii => SampleEncoding::Ascii,
        }
    }
}

/// Encode `grid` to `writer`.
pub fn write<W: Write>(writer: W, grid: &PixelGrid, format: PpmFormat) -> Result<(), PpmError> {
    let bytes = grid.as_bytes();
    let encoder = PnmEncoder::new(writer).with_subtype(PnmSubtype::Pixmap(format.encoding()));
    encoder.write_image(&bytes, grid.width(), grid.height(), ExtendedColorType::Rgb8)?;
    Ok(())
}

/// Encode `grid` into a new file at `path`, replacing any existing file.
pub fn save<P: AsRef<Path>>(path: P, grid: &PixelGrid, format: PpmFormat) -> Result<(), PpmError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer, grid, format)?;
    writer.flush()?;
    Ok(())
}

/// Decode a `P3` or `P6` pixmap. Other PNM flavors are converted to RGB.
pub fn read<R: BufRead>(reader: R) -> Result<PixelGrid, PpmError> {
    let decoder = PnmDecoder::new(reader)?;
    let image = DynamicImage::from_decoder(decoder)?.to_rgb8();
    Ok(PixelGrid::from_image(&image))
}

/// Decode the pixmap stored at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<PixelGrid, PpmError> {
    read(BufReader::new(File::open(path)?))
}
