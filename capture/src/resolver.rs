use std::path::{Component, Path, PathBuf};

/// Maps request paths onto files under a root directory. Pure: nothing
/// here touches the filesystem.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    index: String,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index: index.into(),
        }
    }

    /// `..` segments that would climb above the root are dropped rather
    /// than honored, so the result always stays inside it.
    pub fn resolve(&self, request_path: &str) -> PathBuf {
        let request_path = match request_path.trim_start_matches(['/', '\\']) {
            "" => self.index.as_str(),
            p => p,
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in request_path.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s if is_normal(s) => segments.push(s),
                _ => {}
            }
        }

        segments
            .into_iter()
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

// Rejects anything the platform would read as a prefix or root, e.g. `C:` on Windows.
fn is_normal(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/srv/sketch", "index.html")
    }

    #[test]
    fn test_root_maps_to_index() {
        let r = resolver();
        assert_eq!(PathBuf::from("/srv/sketch/index.html"), r.resolve("/"));
        assert_eq!(PathBuf::from("/srv/sketch/index.html"), r.resolve(""));
    }

    #[test]
    fn test_plain_paths() {
        let r = resolver();
        assert_eq!(PathBuf::from("/srv/sketch/out.mp4"), r.resolve("/out.mp4"));
        assert_eq!(
            PathBuf::from("/srv/sketch/frames/frame_000001.png"),
            r.resolve("/frames/frame_000001.png")
        );
        assert_eq!(
            PathBuf::from("/srv/sketch/lib/p5.js"),
            r.resolve("/lib/./vendor/../p5.js")
        );
    }

    #[test]
    fn test_traversal_is_stripped() {
        let r = resolver();
        for path in [
            "/../../etc/passwd",
            "/../etc/passwd",
            "/a/../../etc/passwd",
            "/..\\..\\etc\\passwd",
            "//../etc//passwd",
        ] {
            let resolved = r.resolve(path);
            assert!(resolved.starts_with("/srv/sketch"), "{path}");
            assert_eq!(PathBuf::from("/srv/sketch/etc/passwd"), resolved, "{path}");
        }
    }

    #[test]
    fn test_only_traversal_maps_to_root() {
        assert_eq!(PathBuf::from("/srv/sketch"), resolver().resolve("/../.."));
    }
}
