use std::{io, path::Path, process::ExitStatus};

use thiserror::Error;
use tokio::process::Command;
use tracing::info;

/// Fixed invocation flags: drop the replaced package file after the update,
/// no color output, sign the database afterwards and verify its signature
/// before touching it.
const REPO_TOOL_ARGS: &[&str] = &["--remove", "--nocolor", "--sign", "--verify"];

#[derive(Error, Debug)]
pub enum RepoToolError {
	#[error("failed to launch repo tool: {0}")]
	Launch(io::Error),
	#[error("repo tool exited with {0}")]
	Failed(ExitStatus),
}

/// Add the freshly committed `package` to the `repo` index database living
/// in `folder`, waiting for the tool to finish.
///
/// The tool's stdout/stderr chatter is forwarded to the server log. A launch
/// failure or non-zero exit fails the calling request; already-committed
/// files are not rolled back.
pub async fn update_repo(
	tool: &Path,
	folder: &Path,
	package: &str,
	repo: &str,
) -> Result<(), RepoToolError> {
	let db = folder.join(format!("{repo}.db.tar.gz"));
	let pkg = folder.join(package);

	info!(
		"Running {} for package {} into {}",
		tool.display(),
		pkg.display(),
		db.display()
	);

	let output = Command::new(tool)
		.args(REPO_TOOL_ARGS)
		.arg(&db)
		.arg(&pkg)
		.output()
		.await
		.map_err(RepoToolError::Launch)?;

	if !output.stdout.is_empty() {
		info!(
			"repo tool stdout: {}",
			String::from_utf8_lossy(&output.stdout).trim_end()
		);
	}
	if !output.stderr.is_empty() {
		info!(
			"repo tool stderr: {}",
			String::from_utf8_lossy(&output.stderr).trim_end()
		);
	}

	if !output.status.success() {
		return Err(RepoToolError::Failed(output.status));
	}

	Ok(())
}
