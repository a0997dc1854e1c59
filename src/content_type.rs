//! Content-Type resolution for uploaded objects
//!
//! Only an explicit allow-list of web asset extensions is mapped. Everything
//! else resolves to `None`, which means no content-type is sent with the
//! upload and the backend default applies. Types that a browser would execute
//! are never guessed from file content.

use std::path::Path;

/// Extension (lowercase, without dot) to MIME type
const CONTENT_TYPES: &[(&str, &str)] = &[
	("html", "text/html; charset=UTF-8"),
	("htm", "text/html; charset=UTF-8"),
	("css", "text/css; charset=UTF-8"),
	("js", "application/javascript; charset=UTF-8"),
	("mjs", "application/javascript; charset=UTF-8"),
];

/// Resolve the content-type for a path from its extension
pub fn resolve(path: &Path) -> Option<&'static str> {
	let ext = path.extension()?.to_str()?;
	CONTENT_TYPES
		.iter()
		.find(|(known, _)| known.eq_ignore_ascii_case(ext))
		.map(|(_, mime)| *mime)
}


// vim: ts=4
