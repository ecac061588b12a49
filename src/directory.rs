use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Error, ErrorKind, Read, Seek, SeekFrom, Write};

use crate::entry::{IconDirEntry, DIR_ENTRY_LENGTH};
use crate::image::IconImage;

/// The length of an ICONDIR header, in bytes:
const ICON_DIR_HEADER_LENGTH: u32 = 6;

/// The resource type tag for icon files (cursor files use 2):
const ICON_RESOURCE_TYPE: u16 = 1;

/// A set of icon frames stored in a single ICO file.
#[derive(Debug)]
pub struct IconDir {
    /// The frames stored in the ICO file, in directory order.
    pub entries: Vec<IconDirEntry>,
}

impl IconDir {
    /// Creates a new, empty icon directory.
    pub fn new() -> IconDir {
        IconDir {
            entries: Vec::new(),
        }
    }

    /// Returns true if the icon directory contains no frames.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encodes the image into the directory as a new frame,
    /// automatically choosing the payload encoding based on the image
    /// dimensions.  Returns an error if the dimensions cannot be
    /// represented in an icon directory.
    pub fn add_icon(&mut self, image: &IconImage) -> io::Result<()> {
        self.entries.push(IconDirEntry::encode_image(image)?);
        Ok(())
    }

    /// Reads an icon directory from an ICO file.  Frame payloads live
    /// at arbitrary offsets recorded in the entry table, so the reader
    /// must be seekable.
    pub fn read<R: Read + Seek>(mut reader: R) -> io::Result<IconDir> {
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            let msg = "not an ICO file (reserved field is nonzero)";
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        let resource_type = reader.read_u16::<LittleEndian>()?;
        if resource_type != ICON_RESOURCE_TYPE {
            let msg = format!(
                "not an icon file (resource type {} instead of {})",
                resource_type, ICON_RESOURCE_TYPE
            );
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        let count = reader.read_u16::<LittleEndian>()?;
        let mut raw_entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            raw_entries.push(IconDirEntry::read_dir_entry(reader.by_ref())?);
        }
        let mut dir = IconDir::new();
        for raw in &raw_entries {
            reader.seek(SeekFrom::Start(u64::from(raw.data_offset)))?;
            let mut data = vec![0u8; raw.data_length as usize];
            reader.read_exact(&mut data)?;
            dir.entries.push(IconDirEntry::from_raw(raw, data));
        }
        Ok(dir)
    }

    /// Writes the icon directory to an ICO file: the header, then the
    /// entry table with computed payload offsets, then the payloads in
    /// entry order.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if self.entries.len() > usize::from(u16::MAX) {
            let msg = format!(
                "too many frames for one icon file ({} instead of at \
                 most {})",
                self.entries.len(),
                u16::MAX
            );
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(ICON_RESOURCE_TYPE)?;
        writer.write_u16::<LittleEndian>(self.entries.len() as u16)?;
        let mut data_offset =
            ICON_DIR_HEADER_LENGTH + DIR_ENTRY_LENGTH * self.entries.len() as u32;
        for entry in &self.entries {
            entry.write_dir_entry(writer.by_ref(), data_offset)?;
            data_offset += entry.data_length();
        }
        for entry in &self.entries {
            writer.write_all(entry.data())?;
        }
        Ok(())
    }

    /// Returns the encoded length of the file, in bytes, including the
    /// length of the header and the entry table.
    pub fn total_length(&self) -> u32 {
        let mut length =
            ICON_DIR_HEADER_LENGTH + DIR_ENTRY_LENGTH * self.entries.len() as u32;
        for entry in &self.entries {
            length += entry.data_length();
        }
        length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::IconImage;
    use std::io::Cursor;

    #[test]
    fn write_empty_icon_dir() {
        let dir = IconDir::new();
        assert!(dir.is_empty());
        let mut output: Vec<u8> = vec![];
        dir.write(&mut output).expect("write failed");
        assert_eq!(b"\x00\x00\x01\x00\x00\x00", &output as &[u8]);
        assert_eq!(dir.total_length(), 6);
    }

    #[test]
    fn write_single_frame_icon_dir() {
        let image = IconImage::from_rgba_data(1, 1, vec![255, 0, 0, 255]);
        let mut dir = IconDir::new();
        dir.add_icon(&image).unwrap();
        let mut output: Vec<u8> = vec![];
        dir.write(&mut output).expect("write failed");
        let mut expected: Vec<u8> = vec![
            0, 0, 1, 0, 1, 0, // header
            1, 1, 0, 0, 1, 0, 32, 0, 48, 0, 0, 0, 22, 0, 0, 0, // entry
        ];
        expected.extend_from_slice(&[
            40, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 1, 0, 32, 0, 0, 0, 0, 0, 8, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // header
            0, 0, 255, 255, // BGRA
            0, 0, 0, 0, // mask row
        ]);
        assert_eq!(output, expected);
        assert_eq!(dir.total_length() as usize, output.len());
    }

    #[test]
    fn read_icon_dir_with_fake_payloads() {
        let mut input: Vec<u8> = vec![
            0, 0, 1, 0, 2, 0, // header
            16, 16, 0, 0, 1, 0, 32, 0, 6, 0, 0, 0, 38, 0, 0, 0, // entry 0
            32, 32, 0, 0, 1, 0, 32, 0, 1, 0, 0, 0, 44, 0, 0, 0, // entry 1
        ];
        input.extend_from_slice(b"foobar#");
        let dir = IconDir::read(Cursor::new(&input)).expect("read failed");
        assert_eq!(dir.entries.len(), 2);
        assert_eq!(dir.entries[0].width(), 16);
        assert_eq!(dir.entries[0].data(), b"foobar");
        assert_eq!(dir.entries[1].height(), 32);
        assert_eq!(dir.entries[1].data(), b"#");
    }

    #[test]
    fn read_rejects_nonzero_reserved_field() {
        let input: &[u8] = b"\x01\x00\x01\x00\x00\x00";
        assert!(IconDir::read(Cursor::new(input)).is_err());
    }

    #[test]
    fn read_rejects_cursor_files() {
        let input: &[u8] = b"\x00\x00\x02\x00\x00\x00";
        let err = IconDir::read(Cursor::new(input)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn round_trip_preserves_frames() {
        let image = IconImage::from_rgba_data(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let mut dir = IconDir::new();
        dir.add_icon(&image).unwrap();
        let mut output: Vec<u8> = vec![];
        dir.write(&mut output).unwrap();
        let reread = IconDir::read(Cursor::new(&output)).expect("read failed");
        assert_eq!(reread.entries.len(), 1);
        let decoded = reread.entries[0].decode_image().unwrap();
        assert_eq!(decoded.data(), image.data());
    }
}
