use crate::image::{self, IconImage};
use std::io::{self, BufRead, Error, ErrorKind, Seek, Write};

impl IconImage {
    /// Reads an image from a PNG stream.  Non-RGBA color types are
    /// expanded to RGBA.
    pub fn read_png<R: BufRead + Seek>(input: R) -> io::Result<IconImage> {
        let mut decoder = png::Decoder::new(input);
        decoder.set_transformations(
            png::Transformations::STRIP_16 | png::Transformations::EXPAND,
        );
        let info = decoder.read_header_info()?;
        let (width, height) = (info.width, info.height);
        let mut reader = decoder.read_info()?;

        let (color_type, bit_depth) = reader.output_color_type();
        assert!(bit_depth == png::BitDepth::Eight);
        let buffer_size = reader.output_buffer_size().ok_or_else(|| {
            Error::new(ErrorKind::InvalidData, "PNG dimensions overflow")
        })?;
        let mut data = vec![0u8; buffer_size];
        reader.next_frame(&mut data)?;
        reader.finish()?;

        let rgba = match color_type {
            png::ColorType::Rgba => data,
            png::ColorType::Rgb => image::rgb_to_rgba(&data),
            png::ColorType::GrayscaleAlpha => image::gray_alpha_to_rgba(&data),
            png::ColorType::Grayscale => image::gray_to_rgba(&data),
            _ => unreachable!(), // EXPAND prevents paletted output
        };
        Ok(IconImage::from_rgba_data(width, height, rgba))
    }

    /// Writes the image to a PNG stream as 8-bit RGBA.
    pub fn write_png<W: Write>(&self, output: W) -> io::Result<()> {
        let mut encoder = png::Encoder::new(output, self.width(), self.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(self.data())?;
        Ok(())
    }
}
