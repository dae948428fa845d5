use crate::error::FileIOError;

use super::repo_tool::RepoToolError;

use std::path::PathBuf;

use axum::{
	extract::multipart::MultipartError,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors terminal for an upload request.
///
/// Each kind maps to the HTTP status the client observes; none of them are
/// retried server-side. A failure after the primary artifact was committed
/// does not roll the artifact back.
#[derive(Error, Debug)]
pub enum UploadError {
	#[error("upload key not authorized")]
	UnknownKey,
	#[error("path escapes the upload root: {0:?}")]
	PathEscape(String),
	#[error("missing multipart field `{0}`")]
	MissingField(&'static str),
	#[error("invalid multipart payload: {0}")]
	Multipart(#[from] MultipartError),
	#[error("checksum mismatch: expected {expected}, got {actual}")]
	ChecksumMismatch { expected: String, actual: String },
	#[error("file exists already: {}", .0.display())]
	AlreadyExists(PathBuf),
	#[error("temporary spool I/O failed: {0}")]
	Spool(#[from] std::io::Error),
	#[error("spool task failed: {0}")]
	Task(#[from] tokio::task::JoinError),
	#[error(transparent)]
	FileIO(#[from] FileIOError),
	#[error(transparent)]
	RepoTool(#[from] RepoToolError),
}

impl UploadError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::UnknownKey | Self::PathEscape(_) | Self::AlreadyExists(_) => {
				StatusCode::FORBIDDEN
			}
			Self::MissingField(_) | Self::Multipart(_) | Self::ChecksumMismatch { .. } => {
				StatusCode::BAD_REQUEST
			}
			Self::Spool(_) | Self::Task(_) | Self::FileIO(_) | Self::RepoTool(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}
}

impl IntoResponse for UploadError {
	fn into_response(self) -> Response {
		let status = self.status_code();

		(status, format!("{} {self}\n", status.as_u16())).into_response()
	}
}
