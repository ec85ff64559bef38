// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Multipart upload extraction

use axum_extra::extract::Multipart;
use bytes::Bytes;
use tracing::debug;

use crate::api::errors::ApiError;

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "file";

pub const NO_FILE_PART: &str = "No file part";
pub const NO_SELECTED_FILE: &str = "No selected file";

/// Return the bytes of the first `file` part that carries a filename.
///
/// A `file` part without a filename is treated like a plain form field and
/// skipped; a filename of `""` means the client submitted the form without
/// choosing a file.
pub async fn read_upload(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedUpload(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        if file_name.is_empty() {
            return Err(ApiError::MissingInput(NO_SELECTED_FILE.to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::MalformedUpload(e.to_string()))?;
        debug!("Received upload {} ({} bytes)", file_name, data.len());
        return Ok(data);
    }

    Err(ApiError::MissingInput(NO_FILE_PART.to_string()))
}
