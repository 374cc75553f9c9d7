//! URL normalization
//!
//! Turns a cache URL such as `root://host//store/f.root?svc=1` into the
//! object path `/store/f.root` that blacklist patterns are matched against.

/// Normalize a URL into an object path.
///
/// Returns `None` when a `//` authority is present but no path follows it;
/// callers treat that as "cache" rather than as an error.
pub fn normalize_url(url: &str) -> Option<&str> {
    let mut path = match url.find("//") {
        Some(slashslash) => {
            let remainder = &url[slashslash + 2..];
            let start = remainder.find('/')?;
            &remainder[start..]
        }
        None => url,
    };

    if let Some(question) = path.find('?') {
        path = &path[..question];
    }

    // root://host//path leaves an extra slash in front
    if path.starts_with("//") {
        path = &path[1..];
    }

    Some(path)
}
