use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Error, ErrorKind, Read, Write};

use crate::image::IconImage;

/// The length of one ICONDIRENTRY record, in bytes:
pub(crate) const DIR_ENTRY_LENGTH: u32 = 16;

/// The length of a BITMAPINFOHEADER, in bytes:
const BMP_HEADER_LENGTH: u32 = 40;

/// The largest frame edge the ICO directory can describe:
const MAX_FRAME_EDGE: u32 = 256;

/// Frames with an edge at least this long are stored as embedded PNG
/// streams; smaller frames are stored as 32-bit bitmaps:
const PNG_EDGE_THRESHOLD: u32 = 256;

/// The eight-byte signature that opens every PNG stream:
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// Method of encoding an image within an icon frame payload.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Encoding {
    /// Payload is an uncompressed 32-bit bitmap (BITMAPINFOHEADER, BGRA
    /// pixel rows bottom-up, then a 1-bit transparency mask).
    Bmp32,
    /// Payload is a complete PNG stream.
    Png,
}

impl Encoding {
    /// Returns the encoding used for a frame of the given dimensions.
    pub fn for_dimensions(width: u32, height: u32) -> Encoding {
        if width >= PNG_EDGE_THRESHOLD || height >= PNG_EDGE_THRESHOLD {
            Encoding::Png
        } else {
            Encoding::Bmp32
        }
    }
}

/// One frame in an ICO file: the dimensions declared in the icon
/// directory, together with the encoded payload bytes.
#[derive(Debug)]
pub struct IconDirEntry {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl IconDirEntry {
    /// Encodes an image into a frame, choosing the payload encoding
    /// based on the image dimensions.  Returns an error if the image
    /// dimensions cannot be represented in an icon directory.
    pub fn encode_image(image: &IconImage) -> io::Result<IconDirEntry> {
        let encoding = Encoding::for_dimensions(image.width(), image.height());
        IconDirEntry::encode_image_with_encoding(image, encoding)
    }

    /// Encodes an image into a frame using the given payload encoding.
    /// Returns an error if the image dimensions cannot be represented
    /// in an icon directory.
    pub fn encode_image_with_encoding(
        image: &IconImage,
        encoding: Encoding,
    ) -> io::Result<IconDirEntry> {
        check_frame_dimensions(image.width(), image.height())?;
        let data = match encoding {
            Encoding::Bmp32 => encode_bmp(image)?,
            Encoding::Png => {
                let mut data = Vec::new();
                image.write_png(&mut data)?;
                data
            }
        };
        Ok(IconDirEntry {
            width: image.width(),
            height: image.height(),
            data,
        })
    }

    /// Decodes the frame payload back into an image.  Returns an error
    /// if the payload is malformed, uses an unsupported bitmap depth,
    /// or does not match the dimensions declared in the directory.
    pub fn decode_image(&self) -> io::Result<IconImage> {
        let image = match self.encoding() {
            Encoding::Png => IconImage::read_png(Cursor::new(&self.data))?,
            Encoding::Bmp32 => decode_bmp(&self.data, self.width, self.height)?,
        };
        if image.width() != self.width || image.height() != self.height {
            let msg = format!(
                "decoded frame has wrong dimensions ({}x{} instead of {}x{})",
                image.width(),
                image.height(),
                self.width,
                self.height
            );
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        Ok(image)
    }

    /// Returns the payload encoding, determined by sniffing the data
    /// for the PNG signature.
    pub fn encoding(&self) -> Encoding {
        if self.data.starts_with(&PNG_SIGNATURE) {
            Encoding::Png
        } else {
            Encoding::Bmp32
        }
    }

    /// Returns the frame width declared in the icon directory, in
    /// pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height declared in the icon directory, in
    /// pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the encoded payload for this frame.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the length of the encoded payload, in bytes.
    pub fn data_length(&self) -> u32 {
        self.data.len() as u32
    }

    /// Writes the 16-byte directory record for this frame.  The payload
    /// itself is written separately, at `data_offset` bytes from the
    /// start of the file.
    pub(crate) fn write_dir_entry<W: Write>(
        &self,
        mut writer: W,
        data_offset: u32,
    ) -> io::Result<()> {
        // A size byte of zero means 256.
        writer.write_u8((self.width % 256) as u8)?;
        writer.write_u8((self.height % 256) as u8)?;
        writer.write_u8(0)?; // no color palette
        writer.write_u8(0)?; // reserved
        writer.write_u16::<LittleEndian>(1)?; // color planes
        writer.write_u16::<LittleEndian>(32)?; // bits per pixel
        writer.write_u32::<LittleEndian>(self.data_length())?;
        writer.write_u32::<LittleEndian>(data_offset)?;
        Ok(())
    }

    /// Reads a 16-byte directory record.  The payload location comes
    /// back as a `RawDirEntry`; the caller reads the payload and calls
    /// `from_raw`.
    pub(crate) fn read_dir_entry<R: Read>(mut reader: R) -> io::Result<RawDirEntry> {
        let raw_width = reader.read_u8()?;
        let raw_height = reader.read_u8()?;
        let _color_count = reader.read_u8()?;
        let _reserved = reader.read_u8()?;
        let _planes = reader.read_u16::<LittleEndian>()?;
        let _bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let data_length = reader.read_u32::<LittleEndian>()?;
        let data_offset = reader.read_u32::<LittleEndian>()?;
        Ok(RawDirEntry {
            width: if raw_width == 0 { 256 } else { u32::from(raw_width) },
            height: if raw_height == 0 {
                256
            } else {
                u32::from(raw_height)
            },
            data_length,
            data_offset,
        })
    }

    /// Assembles a frame from a directory record and its payload.
    pub(crate) fn from_raw(raw: &RawDirEntry, data: Vec<u8>) -> IconDirEntry {
        IconDirEntry {
            width: raw.width,
            height: raw.height,
            data,
        }
    }
}

/// A directory record whose payload has not been read yet.
pub(crate) struct RawDirEntry {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data_length: u32,
    pub(crate) data_offset: u32,
}

fn check_frame_dimensions(width: u32, height: u32) -> io::Result<()> {
    if width == 0 || height == 0 || width > MAX_FRAME_EDGE || height > MAX_FRAME_EDGE {
        let msg = format!(
            "no supported frame size has dimensions {}x{} (must be between \
             1x1 and 256x256)",
            width, height
        );
        return Err(Error::new(ErrorKind::InvalidInput, msg));
    }
    Ok(())
}

/// Encodes an image as an uncompressed 32-bit bitmap: a
/// BITMAPINFOHEADER whose height field covers both pixel blocks, BGRA
/// rows bottom-up, then the 1-bit mask with rows padded to 32 bits.
fn encode_bmp(image: &IconImage) -> io::Result<Vec<u8>> {
    let width = image.width();
    let height = image.height();
    let xor_size = 4 * width * height;
    let and_size = mask_row_length(width) * height;
    let total = (BMP_HEADER_LENGTH + xor_size + and_size) as usize;
    let mut data = Vec::with_capacity(total);
    data.write_u32::<LittleEndian>(BMP_HEADER_LENGTH)?;
    data.write_i32::<LittleEndian>(width as i32)?;
    data.write_i32::<LittleEndian>((height * 2) as i32)?;
    data.write_u16::<LittleEndian>(1)?; // color planes
    data.write_u16::<LittleEndian>(32)?; // bits per pixel
    data.write_u32::<LittleEndian>(0)?; // no compression
    data.write_u32::<LittleEndian>(xor_size + and_size)?;
    data.write_i32::<LittleEndian>(0)?; // x pixels per meter
    data.write_i32::<LittleEndian>(0)?; // y pixels per meter
    data.write_u32::<LittleEndian>(0)?; // colors used
    data.write_u32::<LittleEndian>(0)?; // colors important
    let rgba = image.data();
    for row in (0..height).rev() {
        let start = (4 * row * width) as usize;
        let end = start + (4 * width) as usize;
        for pixel in rgba[start..end].chunks_exact(4) {
            data.push(pixel[2]);
            data.push(pixel[1]);
            data.push(pixel[0]);
            data.push(pixel[3]);
        }
    }
    for row in (0..height).rev() {
        let mut mask_row = vec![0u8; mask_row_length(width) as usize];
        for col in 0..width {
            let alpha = rgba[(4 * (row * width + col) + 3) as usize];
            if alpha == 0 {
                mask_row[(col / 8) as usize] |= 0x80 >> (col % 8);
            }
        }
        data.extend_from_slice(&mask_row);
    }
    Ok(data)
}

/// Decodes an uncompressed 32-bit bitmap payload.  The mask block is
/// redundant with the alpha channel and is ignored.
fn decode_bmp(data: &[u8], width: u32, height: u32) -> io::Result<IconImage> {
    let mut reader = Cursor::new(data);
    let header_length = reader.read_u32::<LittleEndian>()?;
    if header_length != BMP_HEADER_LENGTH {
        let msg = format!("unsupported bitmap header length ({})", header_length);
        return Err(Error::new(ErrorKind::InvalidData, msg));
    }
    let bmp_width = reader.read_i32::<LittleEndian>()?;
    let bmp_height = reader.read_i32::<LittleEndian>()?;
    if bmp_width != width as i32 || bmp_height != (height * 2) as i32 {
        let msg = format!(
            "bitmap header dimensions ({}x{}) do not match the icon \
             directory ({}x{})",
            bmp_width, bmp_height, width, height
        );
        return Err(Error::new(ErrorKind::InvalidData, msg));
    }
    let _planes = reader.read_u16::<LittleEndian>()?;
    let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
    if bits_per_pixel != 32 {
        let msg = format!(
            "only 32-bit bitmap frames are supported ({} bits per pixel)",
            bits_per_pixel
        );
        return Err(Error::new(ErrorKind::InvalidData, msg));
    }
    let compression = reader.read_u32::<LittleEndian>()?;
    if compression != 0 {
        let msg = "compressed bitmap frames are not supported";
        return Err(Error::new(ErrorKind::InvalidData, msg));
    }
    let mut rest_of_header = [0u8; 20];
    reader.read_exact(&mut rest_of_header)?;
    let mut image = IconImage::new(width, height);
    let mut bgra_row = vec![0u8; (4 * width) as usize];
    for row in (0..height).rev() {
        reader.read_exact(&mut bgra_row)?;
        let start = (4 * row * width) as usize;
        let rgba = image.data_mut();
        for (index, pixel) in bgra_row.chunks_exact(4).enumerate() {
            let out = start + 4 * index;
            rgba[out] = pixel[2];
            rgba[out + 1] = pixel[1];
            rgba[out + 2] = pixel[0];
            rgba[out + 3] = pixel[3];
        }
    }
    Ok(image)
}

/// Returns the length of one mask row, in bytes (1 bit per pixel,
/// padded to a 32-bit boundary).
fn mask_row_length(width: u32) -> u32 {
    ((width + 31) / 32) * 4
}
