/*
 * Copyright 2019 Boyd Johnson
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::catalog::TOC_FILE_NAME;
use crate::error::TocError;
use crate::options::ExtensionPolicy;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const DATA_EXTENSIONS: [&str; 7] = ["shp", "dbf", "prj", "shx", "sbn", "sbx", "tif"];

const EXTENSION_DELIMITER: char = '.';

pub fn is_data_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    DATA_EXTENSIONS.iter().any(|d| *d == ext)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileClass {
    Data,
    Misc,
}

impl FileClass {
    pub fn of(ext: &str) -> Self {
        if is_data_extension(ext) {
            FileClass::Data
        } else {
            FileClass::Misc
        }
    }
}

/// Extensions found for one base name, in directory walk order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileGroup {
    pub data: Vec<String>,
    pub misc: Vec<String>,
}

impl FileGroup {
    pub fn push(&mut self, class: FileClass, ext: String) {
        match class {
            FileClass::Data => self.data.push(ext),
            FileClass::Misc => self.misc.push(ext),
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.data.is_empty()
    }

    pub fn has_misc(&self) -> bool {
        !self.misc.is_empty()
    }

    pub fn data_exts(&self) -> String {
        self.data.join(";")
    }

    pub fn misc_exts(&self) -> String {
        self.misc.join(";")
    }

    /// The data extension whose file should be opened: `preferred` if the
    /// group has it (in any case), otherwise the first one found.
    pub fn dataset_extension(&self, preferred: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|ext| ext.eq_ignore_ascii_case(preferred))
            .or_else(|| self.data.first())
            .map(String::as_str)
    }
}

pub type FileGroups = BTreeMap<String, FileGroup>;

/// Splits a root relative, `/` separated path into base name and extension.
///
/// Only the final path segment is searched for dots, and a leading dot does
/// not start an extension. With `ExtensionPolicy::Compound` a trailing run
/// of extensions that starts at a data extension, as in `roads.shp.xml`, is
/// kept together so the file groups with `roads`.
pub fn split_file_name(relative: &str, policy: ExtensionPolicy) -> (String, String) {
    let (dir, file_name) = match relative.rfind('/') {
        Some(idx) => relative.split_at(idx + 1),
        None => ("", relative),
    };

    let segments: Vec<&str> = file_name.split(EXTENSION_DELIMITER).collect();
    if segments.len() < 2 || segments[..segments.len() - 1].concat().is_empty() {
        return (relative.to_string(), String::new());
    }

    let last = segments.len() - 1;
    let mut split_at = last;
    if policy == ExtensionPolicy::Compound && !is_data_extension(segments[last]) {
        if let Some(idx) = (1..last).rev().find(|idx| is_data_extension(segments[*idx])) {
            split_at = idx;
        }
    }

    let stem = segments[..split_at].join(".");
    let ext = segments[split_at..].join(".");
    (format!("{}{}", dir, stem), ext)
}

/// `None` when `path` is outside `root` or is not valid UTF-8. A lossy
/// name could not be opened again later.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect();
    Some(parts?.join("/"))
}

/// Walks `root` and groups every regular file under its base name.
///
/// A table of contents left in `root` by an earlier run is not recorded.
pub fn classify_directory(root: &Path, policy: ExtensionPolicy) -> Result<FileGroups, TocError> {
    if !root.is_dir() {
        return Err(TocError::BaseDir {
            path: root.to_path_buf(),
        });
    }

    let mut groups = FileGroups::new();
    let previous_toc = root.join(TOC_FILE_NAME);

    for entry in WalkDir::new(root).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = entry?;
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file || entry.path() == previous_toc {
            continue;
        }

        let relative = match relative_path(root, entry.path()) {
            Some(r) => r,
            None => {
                warn!(file = %entry.path().display(), "skipping file name that is not UTF-8");
                continue;
            }
        };

        let (base, ext) = split_file_name(&relative, policy);
        let class = FileClass::of(&ext);
        debug!(file = %relative, base = %base, ext = %ext, ?class, "classified");

        groups.entry(base).or_default().push(class, ext);
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{create_dir_all, File};

    fn touch(root: &Path, names: &[&str]) {
        for name in names {
            let path = root.join(name);
            if let Some(parent) = path.parent() {
                create_dir_all(parent).unwrap();
            }
            File::create(path).unwrap();
        }
    }

    #[test]
    fn test_split_file_name_last_segment() {
        let policy = ExtensionPolicy::LastSegment;
        assert_eq!(
            split_file_name("parcels.shp", policy),
            ("parcels".to_string(), "shp".to_string())
        );
        assert_eq!(
            split_file_name("sub/dir/parcels.shp.xml", policy),
            ("sub/dir/parcels.shp".to_string(), "xml".to_string())
        );
        assert_eq!(
            split_file_name("v1.2/README", policy),
            ("v1.2/README".to_string(), String::new())
        );
        assert_eq!(
            split_file_name(".hidden", policy),
            (".hidden".to_string(), String::new())
        );
    }

    #[test]
    fn test_split_file_name_compound() {
        let policy = ExtensionPolicy::Compound;
        assert_eq!(
            split_file_name("parcels.shp.xml", policy),
            ("parcels".to_string(), "shp.xml".to_string())
        );
        assert_eq!(
            split_file_name("dem/tile.TIF.aux.xml", policy),
            ("dem/tile".to_string(), "TIF.aux.xml".to_string())
        );
        assert_eq!(
            split_file_name("roads.v2.shp", policy),
            ("roads.v2".to_string(), "shp".to_string())
        );
        assert_eq!(
            split_file_name("notes.final.txt", policy),
            ("notes.final".to_string(), "txt".to_string())
        );
    }

    #[test]
    fn test_file_class() {
        assert_eq!(FileClass::of("SHP"), FileClass::Data);
        assert_eq!(FileClass::of("tif"), FileClass::Data);
        assert_eq!(FileClass::of("tiff"), FileClass::Misc);
        assert_eq!(FileClass::of("shp.xml"), FileClass::Misc);
        assert_eq!(FileClass::of(""), FileClass::Misc);
    }

    #[test]
    fn test_classify_directory_groups_by_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let names = [
            "parcels.shp",
            "parcels.dbf",
            "parcels.prj",
            "parcels.shx",
            "parcels.xml",
            "parcels.shp.xml",
            "readme.txt",
            "roads/roads.shp",
            "roads/roads.DBF",
        ];
        touch(dir.path(), &names);

        let groups = classify_directory(dir.path(), ExtensionPolicy::Compound).unwrap();

        assert_eq!(groups.len(), 3);

        let parcels = &groups["parcels"];
        assert_eq!(parcels.data, vec!["dbf", "prj", "shp", "shx"]);
        assert_eq!(parcels.misc, vec!["shp.xml", "xml"]);

        let readme = &groups["readme"];
        assert!(readme.is_orphan());
        assert_eq!(readme.misc_exts(), "txt");

        let roads = &groups["roads/roads"];
        assert_eq!(roads.data_exts(), "DBF;shp");
        assert!(!roads.has_misc());

        let recorded: usize = groups.values().map(|g| g.data.len() + g.misc.len()).sum();
        assert_eq!(recorded, names.len());
    }

    #[test]
    fn test_classify_directory_last_segment_policy() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["parcels.shp", "parcels.shp.xml"]);

        let groups = classify_directory(dir.path(), ExtensionPolicy::LastSegment).unwrap();

        assert_eq!(groups["parcels"].data, vec!["shp"]);
        assert!(groups["parcels.shp"].is_orphan());
        assert_eq!(groups["parcels.shp"].misc, vec!["xml"]);
    }

    #[test]
    fn test_classify_directory_skips_previous_toc() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &[TOC_FILE_NAME, "sub/WeoGeoTableOfContents.json"]);

        let groups = classify_directory(dir.path(), ExtensionPolicy::Compound).unwrap();

        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key("sub/WeoGeoTableOfContents"));
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_directory_symlinked_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        touch(dir.path(), &["readme.txt"]);
        touch(target.path(), &["metadata.xml"]);
        std::os::unix::fs::symlink(
            target.path().join("metadata.xml"),
            dir.path().join("parcels.xml"),
        )
        .unwrap();
        std::os::unix::fs::symlink(target.path().join("gone.shp"), dir.path().join("gone.shp"))
            .unwrap();

        let groups = classify_directory(dir.path(), ExtensionPolicy::Compound).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["parcels"].misc, vec!["xml"]);
        assert_eq!(groups["readme"].misc, vec!["txt"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_classify_directory_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["parcels.shp"]);
        File::create(dir.path().join(OsStr::from_bytes(b"bad\xff.shp"))).unwrap();

        let groups = classify_directory(dir.path(), ExtensionPolicy::Compound).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups["parcels"].data, vec!["shp"]);
    }

    #[test]
    fn test_classify_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        match classify_directory(&missing, ExtensionPolicy::Compound) {
            Err(TocError::BaseDir { path }) => assert_eq!(path, missing),
            other => panic!("expected BaseDir error, got {:?}", other),
        }
    }

    #[test]
    fn test_dataset_extension() {
        let group = FileGroup {
            data: vec!["dbf".into(), "SHP".into(), "shx".into()],
            misc: vec![],
        };
        assert_eq!(group.dataset_extension("shp"), Some("SHP"));
        assert_eq!(group.dataset_extension("tif"), Some("dbf"));
        assert_eq!(FileGroup::default().dataset_extension("shp"), None);
    }
}
