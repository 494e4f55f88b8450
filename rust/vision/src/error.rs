// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VisionError>;

/// Errors raised while reading a sketch. Missing geometry is never an error.
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Failed to read image {path}: {message}")]
    ImageDecode { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
