use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel returned when no rule matches a filename.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Ordered version matchers, most specific first.
///
/// The first rule whose pattern matches wins, so pre-release and
/// build-metadata forms must come before the generic `MAJOR.MINOR[.PATCH]`
/// which would otherwise truncate them.
static VERSION_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
	[
		// v4.2-rc1, v1.2.3-alpha.2, optionally followed by a commit count
		// and a git hash
		r"v(\d+\.\d+(?:\.\d+)?-(?:alpha|beta|rc)\.?\d+(?:-\d+)?(?:-g[0-9a-f]+)?)",
		// git-describe build metadata: v1.4.0-12-gdeadbee
		r"v(\d+\.\d+(?:\.\d+)?-\d+-g[0-9a-f]+)",
		// date-stamped snapshot: v2.0-20240131
		r"v(\d+\.\d+(?:\.\d+)?-\d{8})",
		// plain vMAJOR.MINOR[.PATCH]
		r"v(\d+\.\d+(?:\.\d+)?)",
	]
	.into_iter()
	.map(|pattern| Regex::new(pattern).expect("invalid version pattern"))
	.collect()
});

/// Extract a release version token from a filename.
///
/// Pure function of the filename only: no filesystem access, and the same
/// input always yields the same output. Returns [`UNKNOWN_VERSION`] when no
/// rule matches.
pub fn extract_version(filename: &str) -> String {
	VERSION_RULES
		.iter()
		.find_map(|rule| {
			rule.captures(filename)
				.and_then(|captures| captures.get(1))
				.map(|m| m.as_str().to_string())
		})
		.unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}
