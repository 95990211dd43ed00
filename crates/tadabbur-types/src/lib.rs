pub mod error;
pub mod geometry;
pub mod image;
pub mod language;
pub mod types;

pub use error::ErrorKind;
pub use geometry::{CropRect, DisplaySize, PixelRect};
pub use image::{DataUriError, ImageDataUri};
pub use language::{Language, UnknownLanguage};
pub use types::*;
