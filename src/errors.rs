//! Errors that can occur using this crate.
//!
//! The crate's code is designed in a way that functions/methods _can_ trigger
//! all the enum variants specified in the returned [`Result`]

use displaydoc::Display;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Possible errors while loading an object image.
///
/// `Display` and `Debug` provide all necessary details.
#[rustfmt::skip]
#[derive(Display, PartialEq, Eq)]
pub enum ImageLoadError {
    /// Image is missing its 16-bit origin word
    ImageMissingOrigin,
    /// Error reading image stream: {0}
    ImageStreamUnreadable(String),
    /// failed to load image: {file}: {message}
    ImageNotLoadable {
        file: String,
        message: String
    },
}
impl Debug for ImageLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
impl Error for ImageLoadError {}

/// Possible errors during program execution.
///
/// `Display` and `Debug` provide all necessary details.
#[derive(Display, PartialEq, Eq)]
pub enum ExecutionError {
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
}
impl Debug for ExecutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
impl Error for ExecutionError {}
