//! Catalog scanner integration tests: suffix filtering, rule ordering and
//! partial-failure behavior on a real (temporary) artifact tree.

use depot_core::{
	catalog::scanner,
	config::{Config, ScanRule},
};

use std::path::Path;

use tempfile::TempDir;
use tokio::fs;

fn test_config(root: &Path, rules: Vec<ScanRule>) -> Config {
	Config {
		root_folder: root.to_path_buf(),
		download_base_url: "https://example.org/download".into(),
		port: 9696,
		proxy_prefix: None,
		repo_tool: None,
		upload_config: Vec::new(),
		api_config: rules,
	}
}

fn rule(folder: &str, release_type: &str, machine: &str) -> ScanRule {
	ScanRule {
		folder: folder.into(),
		release_type: release_type.into(),
		machine: machine.into(),
	}
}

#[tokio::test]
async fn only_artifact_suffixes_are_cataloged() {
	let root = TempDir::new().unwrap();
	let dir = root.path().join("images/stable");
	fs::create_dir_all(&dir).await.unwrap();

	fs::write(dir.join("depot-os-v1.2.3.tar.xz"), b"first image")
		.await
		.unwrap();
	fs::write(dir.join("depot-os-v4.2-rc1.hddimg"), b"second image")
		.await
		.unwrap();
	fs::write(dir.join("notes.txt"), b"not an artifact")
		.await
		.unwrap();
	fs::write(dir.join("checksums.sha256"), b"not an artifact either")
		.await
		.unwrap();

	// Scanning is non-recursive; nested artifacts stay invisible
	let nested = dir.join("nested");
	fs::create_dir_all(&nested).await.unwrap();
	fs::write(nested.join("depot-os-v9.9.tar.gz"), b"hidden")
		.await
		.unwrap();

	let config = test_config(
		root.path(),
		vec![rule("images/stable", "stable", "x86-64")],
	);
	let entries = scanner::scan(&config).await;

	assert_eq!(entries.len(), 2);
	for entry in &entries {
		assert_eq!(entry.machine, "x86-64");
		assert_eq!(entry.release_type, "stable");
		assert!(entry
			.download_url
			.starts_with("https://example.org/download/images/stable/"));
	}
}

#[tokio::test]
async fn entry_fields_come_from_file_and_rule() {
	let root = TempDir::new().unwrap();
	let dir = root.path().join("images/testing");
	fs::create_dir_all(&dir).await.unwrap();

	let payload = b"release image payload";
	fs::write(dir.join("depot-os-v4.2-rc1.tar.xz"), payload)
		.await
		.unwrap();

	let config = test_config(
		root.path(),
		vec![rule("images/testing", "experimental", "raspberrypi4")],
	);
	let entries = scanner::scan(&config).await;

	assert_eq!(entries.len(), 1);
	let entry = &entries[0];
	assert_eq!(entry.version, "4.2-rc1");
	assert_eq!(entry.machine, "raspberrypi4");
	assert_eq!(entry.release_type, "experimental");
	assert_eq!(entry.filesize, payload.len() as u64);
	assert_eq!(
		entry.download_url,
		"https://example.org/download/images/testing/depot-os-v4.2-rc1.tar.xz"
	);
	assert_eq!(entry.checksum, blake3::hash(payload).to_hex().to_string());
	assert_eq!(entry.path, dir.join("depot-os-v4.2-rc1.tar.xz"));
}

#[tokio::test]
async fn unreadable_rule_folder_does_not_abort_the_scan() {
	let root = TempDir::new().unwrap();
	let dir = root.path().join("good");
	fs::create_dir_all(&dir).await.unwrap();
	fs::write(dir.join("depot-os-v1.0.tar.gz"), b"payload")
		.await
		.unwrap();

	let config = test_config(
		root.path(),
		vec![
			rule("does-not-exist", "stable", "x86-64"),
			rule("good", "stable", "x86-64"),
		],
	);
	let entries = scanner::scan(&config).await;

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].version, "1.0");
}

#[tokio::test]
async fn aggregation_follows_rule_order() {
	let root = TempDir::new().unwrap();
	for folder in ["alpha", "beta"] {
		let dir = root.path().join(folder);
		fs::create_dir_all(&dir).await.unwrap();
		fs::write(dir.join("depot-os-v1.0.tar.gz"), folder.as_bytes())
			.await
			.unwrap();
	}

	let config = test_config(
		root.path(),
		vec![
			rule("beta", "experimental", "x86-64"),
			rule("alpha", "stable", "x86-64"),
		],
	);
	let entries = scanner::scan(&config).await;

	assert_eq!(entries.len(), 2);
	assert_eq!(entries[0].release_type, "experimental");
	assert_eq!(entries[1].release_type, "stable");
}
