use std::io::ErrorKind;
use std::path::Path;

use walkdir::WalkDir;

/// Mirror a source tree into a destination directory.
///
/// Entries whose name appears in `exclude` are skipped at every level,
/// together with everything beneath them; re-runs therefore never inherit
/// engine caches or result trees baked into the task image. Symbolic
/// links are followed, dangling ones are skipped with a warning, and
/// files already present in the destination are overwritten.
///
/// # Arguments
///
/// * `src` - Root of the tree to copy.
/// * `dest` - Destination directory, created if missing.
/// * `exclude` - Directory/file names never copied.
///
/// # Example
///
/// ``` rust, no_run
/// use bacass_launch::consts::STAGE_IGNORE;
/// use bacass_launch::core::stage::mirror;
/// use std::path::Path;
///
/// mirror(Path::new("/root"), Path::new("/nf-workdir"), STAGE_IGNORE).unwrap();
/// ```
pub fn mirror(
    src: &Path,
    dest: &Path,
    exclude: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dest)?;

    let walker = WalkDir::new(src)
        .follow_links(true)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| !exclude.contains(&name))
                .unwrap_or(true)
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err)
                if err
                    .io_error()
                    .map(|io| io.kind() == ErrorKind::NotFound)
                    .unwrap_or(false) =>
            {
                log::warn!(
                    "WARN: skipping dangling symlink under {}",
                    src.display()
                );
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let rel = entry.path().strip_prefix(src)?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn mirrors_nested_files() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        touch(&src.path().join("main.nf"), "workflow {}");
        touch(&src.path().join("assets/test_config_dfast.py"), "# config");

        mirror(src.path(), dest.path(), &[]).unwrap();

        assert!(dest.path().join("main.nf").exists());
        assert!(dest.path().join("assets/test_config_dfast.py").exists());
    }

    #[test]
    fn excluded_names_are_never_copied() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        touch(&src.path().join("main.nf"), "workflow {}");
        touch(&src.path().join("work/ab/cache.bin"), "stale");
        touch(&src.path().join("results/report.html"), "stale");
        touch(&src.path().join("modules/work/nested.bin"), "stale");

        mirror(src.path(), dest.path(), &["work", "results"]).unwrap();

        assert!(dest.path().join("main.nf").exists());
        assert!(!dest.path().join("work").exists());
        assert!(!dest.path().join("results").exists());
        assert!(!dest.path().join("modules/work").exists());
        assert!(dest.path().join("modules").exists());
    }

    #[test]
    fn existing_destination_files_are_overwritten() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        touch(&src.path().join("latch.config"), "fresh");
        touch(&dest.path().join("latch.config"), "stale");

        mirror(src.path(), dest.path(), &[]).unwrap();

        let contents = std::fs::read_to_string(dest.path().join("latch.config")).unwrap();
        assert_eq!(contents, "fresh");
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlinks_do_not_fail_the_mirror() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        touch(&src.path().join("main.nf"), "workflow {}");
        std::os::unix::fs::symlink(
            src.path().join("missing"),
            src.path().join("broken"),
        )
        .unwrap();

        mirror(src.path(), dest.path(), &[]).unwrap();

        assert!(dest.path().join("main.nf").exists());
        assert!(!dest.path().join("broken").exists());
    }
}
