//! All-or-nothing output of a split
//!
//! Every file is first written into a staging directory inside the
//! destination, then renamed into place. Files that already exist are moved
//! aside and restored if any later step fails, so the destination ends up
//! either fully updated or untouched. Community files from an earlier split
//! that the new one does not produce are retired the same way.

use crate::error::SplitError;
use crate::manifest::MANIFEST_FILE;
use crate::splitter::{SplitOutput, FILE_PREFIX, FILE_SUFFIX};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One completed change to the destination, undone in reverse on failure
enum Step {
    /// A file renamed into the destination, with the copy it replaced
    Placed {
        target: PathBuf,
        previous: Option<PathBuf>,
    },
    /// A stale community file moved into the backup directory
    Retired { original: PathBuf, backup: PathBuf },
}

impl SplitOutput {
    /// Write every community file and `manifest.json` into `dir`
    ///
    /// Returns the written paths in community order, manifest last.
    ///
    /// # Errors
    /// I/O or serialization failure; nothing is left behind in that case
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, SplitError> {
        fs::create_dir_all(dir)?;
        let staging = tempfile::Builder::new()
            .prefix(".split-staging-")
            .tempdir_in(dir)?;
        let staged_dir = staging.path().join("new");
        let backup_dir = staging.path().join("previous");
        fs::create_dir(&staged_dir)?;
        fs::create_dir(&backup_dir)?;

        let mut names: Vec<&str> = Vec::with_capacity(self.file_count());
        for file in &self.files {
            fs::write(staged_dir.join(&file.file_name), &file.content)?;
            names.push(&file.file_name);
        }
        let manifest = serde_json::to_string_pretty(&self.manifest)?;
        fs::write(staged_dir.join(MANIFEST_FILE), manifest)?;
        names.push(MANIFEST_FILE);

        let mut steps: Vec<Step> = Vec::with_capacity(names.len());
        if let Err(err) = retire_stale(dir, &backup_dir, &names, &mut steps) {
            tracing::error!(error = %err, "could not retire stale community files, rolling back");
            rollback(steps);
            return Err(err.into());
        }
        for name in names {
            if let Err(err) = place(&staged_dir, &backup_dir, dir, name, &mut steps) {
                tracing::error!(file = name, error = %err, "split write failed, rolling back");
                rollback(steps);
                return Err(err.into());
            }
        }

        let written: Vec<PathBuf> = steps
            .into_iter()
            .filter_map(|step| match step {
                Step::Placed { target, .. } => Some(target),
                Step::Retired { .. } => None,
            })
            .collect();
        tracing::info!(dir = %dir.display(), files = written.len(), "split written");
        Ok(written)
    }
}

/// Move community files the new split does not produce out of `dir`
fn retire_stale(
    dir: &Path,
    backup_dir: &Path,
    names: &[&str],
    steps: &mut Vec<Step>,
) -> std::io::Result<()> {
    let keep: HashSet<&str> = names.iter().copied().collect();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let stale = name.starts_with(FILE_PREFIX)
            && name.ends_with(FILE_SUFFIX)
            && !keep.contains(name)
            && entry.file_type()?.is_file();
        if !stale {
            continue;
        }
        let original = entry.path();
        let backup = backup_dir.join(name);
        fs::rename(&original, &backup)?;
        tracing::debug!(file = name, "retired stale community file");
        steps.push(Step::Retired { original, backup });
    }
    Ok(())
}

fn place(
    staged_dir: &Path,
    backup_dir: &Path,
    dir: &Path,
    name: &str,
    steps: &mut Vec<Step>,
) -> std::io::Result<()> {
    let target = dir.join(name);
    let previous = if target.exists() {
        let backup = backup_dir.join(name);
        fs::rename(&target, &backup)?;
        Some(backup)
    } else {
        None
    };
    if let Err(err) = fs::rename(staged_dir.join(name), &target) {
        if let Some(backup) = &previous {
            restore(backup, &target);
        }
        return Err(err);
    }
    steps.push(Step::Placed { target, previous });
    Ok(())
}

fn restore(backup: &Path, target: &Path) {
    if let Err(err) = fs::rename(backup, target) {
        tracing::error!(file = %target.display(), error = %err, "could not restore previous file");
    }
}

fn rollback(steps: Vec<Step>) {
    for step in steps.into_iter().rev() {
        match step {
            Step::Placed { target, previous } => {
                let _ = fs::remove_file(&target);
                if let Some(backup) = previous {
                    restore(&backup, &target);
                }
            }
            Step::Retired { original, backup } => restore(&backup, &original),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::community::CommunitySet;
    use crate::manifest::MANIFEST_FILE;
    use crate::splitter::split;
    use serde_json::json;
    use twin_model::ConfigTree;

    fn output() -> crate::splitter::SplitOutput {
        let config = ConfigTree::new(json!({
            "provider": {"azurerm": {"features": {}}},
            "resource": {"azurerm_virtual_network": {"vnet1": {}}}
        }))
        .unwrap();
        split(&config, &CommunitySet::new([vec!["vnet1"]]).unwrap()).unwrap()
    }

    #[test]
    fn writes_files_and_manifest_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let paths = output().write_to_dir(dir.path()).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[1].ends_with(MANIFEST_FILE));
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn rewriting_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = output();
        out.write_to_dir(dir.path()).unwrap();
        let paths = out.write_to_dir(dir.path()).unwrap();
        let content = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(content, out.files[0].content);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn fewer_communities_retire_stale_files() {
        let config = ConfigTree::new(json!({"resource": {
            "azurerm_virtual_network": {"vnet1": {}},
            "azurerm_public_ip": {"pip1": {}},
            "azurerm_storage_account": {"sa1": {}}
        }}))
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "kept").unwrap();

        let three = CommunitySet::new([vec!["vnet1"], vec!["pip1"], vec!["sa1"]]).unwrap();
        let first = split(&config, &three).unwrap().write_to_dir(dir.path()).unwrap();
        assert_eq!(first.len(), 4);

        let one = CommunitySet::new([vec!["vnet1", "pip1", "sa1"]]).unwrap();
        let second = split(&config, &one).unwrap().write_to_dir(dir.path()).unwrap();
        assert_eq!(second.len(), 2);

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 3);
        assert!(names[0].starts_with("community_000_3res_"));
        assert_eq!(names[1], MANIFEST_FILE);
        assert_eq!(names[2], "notes.txt");
        for path in &first[..3] {
            assert!(!path.exists());
        }
    }

    #[test]
    fn failed_placement_restores_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("new");
        let backup = dir.path().join("previous");
        std::fs::create_dir(&staged).unwrap();
        std::fs::create_dir(&backup).unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "old").unwrap();

        let mut steps = Vec::new();
        let result = super::place(&staged, &backup, dir.path(), MANIFEST_FILE, &mut steps);

        assert!(result.is_err());
        assert!(steps.is_empty());
        let kept = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(kept, "old");
        assert!(!backup.join(MANIFEST_FILE).exists());
    }
}
