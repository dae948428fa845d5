use crate::{
	config::UploadKey,
	upload::{self, error::UploadError, PendingUpload},
	Core,
};

use std::sync::Arc;

use axum::{
	extract::{Multipart, State},
	http::StatusCode,
	response::{IntoResponse, Response},
};
use tracing::{info, warn};

/// Scalar form fields collected while streaming the multipart body.
#[derive(Default)]
struct UploadForm {
	sha256: Option<String>,
	folder: String,
	replace: bool,
	update_repo: bool,
	repo: String,
}

/// `POST /upload` — authenticate, spool, verify, commit, then trigger a
/// catalog rebuild.
pub async fn handle_upload(State(core): State<Arc<Core>>, multipart: Multipart) -> Response {
	match process(&core, multipart).await {
		Ok(()) => (StatusCode::CREATED, "File created\n").into_response(),
		Err(e) => {
			warn!("Upload failed: {e}");
			e.into_response()
		}
	}
}

async fn process(core: &Core, mut multipart: Multipart) -> Result<(), UploadError> {
	info!("Handling file upload");

	let mut authorized: Option<UploadKey> = None;
	let mut form = UploadForm::default();
	let mut file: Option<PendingUpload> = None;
	let mut signature: Option<PendingUpload> = None;

	// Fields are handled in arrival order; the key must have authorized the
	// request before any file field is spooled
	while let Some(mut field) = multipart.next_field().await? {
		let name = field.name().unwrap_or_default().to_string();

		match name.as_str() {
			"upload_key" => {
				let key = field.text().await?;
				authorized = Some(
					core.config
						.authorize_upload(&key)
						.cloned()
						.ok_or(UploadError::UnknownKey)?,
				);
			}
			"upload_sha256" => {
				form.sha256 = Some(field.text().await?).filter(|sha| !sha.is_empty());
			}
			"upload_folder" => form.folder = field.text().await?,
			"upload_replace" => form.replace = field.text().await? == "true",
			"upload_update_repo" => form.update_repo = field.text().await? == "true",
			"upload_repo" => form.repo = field.text().await?,
			"upload_file" | "upload_file_sig" => {
				if authorized.is_none() {
					return Err(UploadError::UnknownKey);
				}

				let filename = field
					.file_name()
					.map(ToOwned::to_owned)
					.ok_or(UploadError::MissingField("file name"))?;

				let mut pending = PendingUpload::new(filename);
				while let Some(chunk) = field.chunk().await? {
					pending.write_chunk(&chunk)?;
				}

				if name == "upload_file" {
					file = Some(pending);
				} else {
					signature = Some(pending);
				}
			}
			other => warn!("Ignoring unexpected multipart field `{other}`"),
		}
	}

	let authorized = authorized.ok_or(UploadError::MissingField("upload_key"))?;
	let mut file = file.ok_or(UploadError::MissingField("upload_file"))?;

	info!(
		"Upload authorized for subfolder {:?}, target folder {:?}, file {:?}",
		authorized.subfolder, form.folder, file.filename
	);

	// Integrity check runs on the spooled copy, before anything touches the
	// destination tree
	if let Some(expected) = &form.sha256 {
		file = upload::verify_checksum(file, expected).await?;
	}

	let dest = upload::resolve_destination(
		&core.config.root_folder,
		&authorized.subfolder,
		&form.folder,
		&file.filename,
	)?;
	let package_name = file.filename.clone();

	upload::commit(&core.locks, file, &dest, form.replace).await?;

	// A detached signature lands under the same folder with the same
	// overwrite policy; its failure fails the request, but the primary
	// artifact stays committed
	if let Some(pending) = signature {
		let sig_dest = upload::resolve_destination(
			&core.config.root_folder,
			&authorized.subfolder,
			&form.folder,
			&pending.filename,
		)?;
		upload::commit(&core.locks, pending, &sig_dest, form.replace).await?;
	}

	if form.update_repo {
		if form.repo.is_empty() {
			return Err(UploadError::MissingField("upload_repo"));
		}

		let folder = dest
			.parent()
			.unwrap_or(&core.config.root_folder)
			.to_path_buf();
		upload::repo_tool::update_repo(core.config.repo_tool(), &folder, &package_name, &form.repo)
			.await?;
	}

	core.rebuilder.trigger();

	Ok(())
}
