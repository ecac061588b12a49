//! Library for building and reading Windows icon (.ico) files
//!
//! An ICO file packs several independently sized bitmaps into a single
//! container, so that desktop environments can pick an appropriately
//! sized image for title bars, file listings, task switchers and so on.
//! See https://en.wikipedia.org/wiki/ICO_(file_format) for more
//! information about the file format.
//!
//! # Example
//!
//! ```
//! use icopack::{IconDir, IconImage};
//!
//! let mut dir = IconDir::new();
//! dir.add_icon(&IconImage::new(16, 16)).unwrap();
//! let mut data = Vec::new();
//! dir.write(&mut data).unwrap();
//! assert_eq!(&data[..6], b"\x00\x00\x01\x00\x01\x00");
//! ```

#![warn(missing_docs)]

mod directory;
mod entry;
mod image;
mod pngio;
pub mod scale;

pub use self::directory::IconDir;
pub use self::entry::{Encoding, IconDirEntry};
pub use self::image::IconImage;
