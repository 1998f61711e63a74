//! Remote path helpers.
//!
//! Remote paths are always `/`-separated regardless of the local platform,
//! so these work on plain strings instead of `std::path`.

/// Normalize a path: collapse repeated slashes, drop trailing slashes,
/// root relative paths. Blank input becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Parent of `dir`: everything before its last `/`.
///
/// `/a/b` gives `/a`; `/a` gives the empty string, which listing treats as `/`.
pub fn parent_path(dir: &str) -> &str {
    match dir.rfind('/') {
        Some(idx) => &dir[..idx],
        None => "",
    }
}

/// Join a directory and a child name without doubling the separator.
pub fn join_path(parent: &str, name: &str) -> String {
    let trimmed = parent.trim_end_matches('/');
    if trimmed.is_empty() {
        format!("/{}", name)
    } else {
        format!("{}/{}", trimmed, name)
    }
}

/// `dir` with exactly one trailing `/`, the base for rename targets.
pub fn with_trailing_slash(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{}/", dir)
    }
}

/// Last path component.
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("   "), "/");
        assert_eq!(normalize_path("/foo"), "/foo");
        assert_eq!(normalize_path("/foo/"), "/foo");
        assert_eq!(normalize_path("/foo//bar"), "/foo/bar");
        assert_eq!(normalize_path("///foo"), "/foo");
        assert_eq!(normalize_path("foo"), "/foo");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/a/b"), "/a");
        assert_eq!(parent_path("/home/user"), "/home");
        assert_eq!(parent_path("/a"), "");
        assert_eq!(normalize_path(parent_path("/a")), "/");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/a", "sub"), "/a/sub");
        assert_eq!(join_path("/a/", "sub"), "/a/sub");
        assert_eq!(join_path("/", "sub"), "/sub");
        assert_eq!(join_path("", "sub"), "/sub");
    }

    #[test]
    fn test_with_trailing_slash() {
        assert_eq!(with_trailing_slash("/a"), "/a/");
        assert_eq!(with_trailing_slash("/"), "/");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/a/b.txt"), "b.txt");
        assert_eq!(file_name("b.txt"), "b.txt");
        assert_eq!(file_name("/"), "");
    }
}
