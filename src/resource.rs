//! Resource-load port — template text by path.
//!
//! Resource-backed templates resolve through this port once, at service
//! build time. `None` means not found; the builder turns that into a
//! `ConfigurationError` naming the path.

use std::fs;
use std::path::PathBuf;

/// External template source.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, path: &str) -> Option<String>;
}

/// Loads template files relative to a base directory.
#[derive(Debug, Clone)]
pub struct FsResourceLoader {
    base_dir: PathBuf,
}

impl FsResourceLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }
}

impl ResourceLoader for FsResourceLoader {
    fn load(&self, path: &str) -> Option<String> {
        fs::read_to_string(self.base_dir.join(path)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn loads_existing_file() {
        let dir = TempDir::new().unwrap();
        let mut f = fs::File::create(dir.path().join("prompt.txt")).unwrap();
        f.write_all(b"Create recipe using only {{it}}").unwrap();

        let loader = FsResourceLoader::new(dir.path());
        assert_eq!(
            loader.load("prompt.txt").as_deref(),
            Some("Create recipe using only {{it}}")
        );
    }

    #[test]
    fn missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loader = FsResourceLoader::new(dir.path());
        assert!(loader.load("does-not-exist.txt").is_none());
    }

    #[test]
    fn subdirectory_paths_resolve() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/p.txt"), "text").unwrap();

        let loader = FsResourceLoader::new(dir.path());
        assert_eq!(loader.load("sub/p.txt").as_deref(), Some("text"));
    }
}
