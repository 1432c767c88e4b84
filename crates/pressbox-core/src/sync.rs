//! Source-tree synchronization into the working directory.

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Directory names never copied, at any depth.
const VCS_DIRS: &[&str] = &[".git", ".svn"];
const DEPENDENCY_DIRS: &[&str] = &["node_modules"];
/// File names holding environment-specific runtime configuration.
const RUNTIME_CONFIG_FILES: &[&str] = &["wp-config.php"];

/// Copy `from` into `to`, preserving relative structure.
///
/// Skips symbolic links, version-control metadata directories, dependency
/// caches, and environment-specific config files. Safe to re-run: existing
/// destination files are overwritten. The first unreadable source entry
/// aborts the whole copy; already-copied entries are not rolled back.
pub fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    debug!("syncing {} -> {}", from.display(), to.display());
    fs::create_dir_all(to)?;

    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let name = entry.file_name();
        let file_type = entry.file_type()?;
        let dest = to.join(&name);

        if file_type.is_symlink() {
            continue;
        }

        if file_type.is_dir() {
            if is_excluded_dir(&name) {
                continue;
            }
            copy_tree(&entry.path(), &dest)?;
        } else {
            if is_excluded_file(&name) {
                continue;
            }
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

fn is_excluded_dir(name: &std::ffi::OsStr) -> bool {
    VCS_DIRS
        .iter()
        .chain(DEPENDENCY_DIRS)
        .any(|excluded| name == *excluded)
}

fn is_excluded_file(name: &std::ffi::OsStr) -> bool {
    RUNTIME_CONFIG_FILES.iter().any(|excluded| name == *excluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write(path: &PathBuf, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn copies_nested_structure() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write(&src.path().join("index.php"), "<?php");
        write(&src.path().join("wp-includes/version.php"), "<?php");

        copy_tree(src.path(), dst.path()).unwrap();

        assert!(dst.path().join("index.php").exists());
        assert!(dst.path().join("wp-includes/version.php").exists());
    }

    #[test]
    fn excludes_vcs_and_dependency_dirs_at_any_depth() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write(&src.path().join(".git/config"), "x");
        write(&src.path().join("wp-content/plugins/a/.git/config"), "x");
        write(&src.path().join("wp-content/themes/t/node_modules/pkg/index.js"), "x");
        write(&src.path().join("wp-content/themes/t/style.css"), "x");

        copy_tree(src.path(), dst.path()).unwrap();

        assert!(!dst.path().join(".git").exists());
        assert!(!dst.path().join("wp-content/plugins/a/.git").exists());
        assert!(!dst
            .path()
            .join("wp-content/themes/t/node_modules")
            .exists());
        assert!(dst.path().join("wp-content/themes/t/style.css").exists());
    }

    #[test]
    fn excludes_runtime_config_files_at_any_depth() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write(&src.path().join("wp-config.php"), "secret");
        write(&src.path().join("deep/nested/wp-config.php"), "secret");
        write(&src.path().join("deep/nested/other.php"), "x");

        copy_tree(src.path(), dst.path()).unwrap();

        assert!(!dst.path().join("wp-config.php").exists());
        assert!(!dst.path().join("deep/nested/wp-config.php").exists());
        assert!(dst.path().join("deep/nested/other.php").exists());
    }

    #[cfg(unix)]
    #[test]
    fn excludes_symlinks() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write(&src.path().join("real.php"), "x");
        std::os::unix::fs::symlink(src.path().join("real.php"), src.path().join("link.php"))
            .unwrap();

        copy_tree(src.path(), dst.path()).unwrap();

        assert!(dst.path().join("real.php").exists());
        assert!(!dst.path().join("link.php").exists());
    }

    #[test]
    fn rerun_overwrites_destination() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write(&src.path().join("index.php"), "v1");
        copy_tree(src.path(), dst.path()).unwrap();

        write(&src.path().join("index.php"), "v2");
        copy_tree(src.path(), dst.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dst.path().join("index.php")).unwrap(),
            "v2"
        );
    }

    #[test]
    fn missing_source_is_an_error() {
        let dst = tempfile::tempdir().unwrap();
        assert!(copy_tree(Path::new("/nonexistent-pressbox-src"), dst.path()).is_err());
    }
}
