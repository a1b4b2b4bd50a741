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

use crate::classify::{FileGroup, FileGroups};
use crate::error::TocError;
use crate::extent::{Extent, ExtentResolver};
use crate::feature::{data_feature, misc_feature, orphan_feature};
use crate::options::{DataType, ErrorPolicy};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const TOC_FILE_NAME: &str = "WeoGeoTableOfContents.json";
pub const COLLECTION_NAME: &str = "NewFeatureType";

const INDENT: &[u8] = b"    ";

/// The non-spatial feature that closes every table of contents.
pub fn lookup_table() -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("0".to_string(), JsonValue::from("WEOALL=WEOALL"));
    properties.insert("WEO_TYPE".to_string(), JsonValue::from("LOOK_UP_TABLE"));
    Feature {
        bbox: None,
        geometry: None,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn dataset_path(root: &Path, base: &str, ext: &str) -> PathBuf {
    root.join(format!("{}.{}", base, ext))
}

/// Extent of the data in `group`, read from the file with the primary
/// extension for `data_type` when there is one.
pub fn group_extent<R: ExtentResolver + ?Sized>(
    root: &Path,
    base: &str,
    group: &FileGroup,
    data_type: DataType,
    resolver: &R,
) -> Option<Result<Extent, TocError>> {
    group
        .dataset_extension(data_type.primary_extension())
        .map(|ext| resolver.resolve(&dataset_path(root, base, ext)))
}

pub fn build_features<R: ExtentResolver + ?Sized>(
    root: &Path,
    groups: &FileGroups,
    data_type: DataType,
    resolver: &R,
    policy: ErrorPolicy,
) -> Result<Vec<Feature>, TocError> {
    let mut features = Vec::with_capacity(groups.len());

    for (base, group) in groups {
        let extent = match group_extent(root, base, group, data_type, resolver) {
            None => {
                info!(base = %base, exts = %group.misc_exts(), "miscellaneous files");
                features.push(orphan_feature(base, group));
                continue;
            }
            Some(Ok(extent)) => extent,
            Some(Err(e)) => match policy {
                ErrorPolicy::Abort => return Err(e),
                ErrorPolicy::Skip => {
                    warn!(base = %base, error = %e, "skipping unreadable dataset");
                    continue;
                }
            },
        };

        info!(base = %base, exts = %group.data_exts(), ?extent, "data files");
        features.push(data_feature(base, group, &extent));
        if group.has_misc() {
            features.push(misc_feature(base, group, &extent));
        }
    }

    Ok(features)
}

#[derive(Debug, Clone)]
pub struct Catalog {
    features: Vec<Feature>,
}

impl Catalog {
    pub fn new(mut features: Vec<Feature>) -> Self {
        features.push(lookup_table());
        Catalog { features }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn to_geojson(&self) -> GeoJson {
        let mut foreign_members = JsonObject::new();
        foreign_members.insert("name".to_string(), JsonValue::from(COLLECTION_NAME));

        GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features: self.features.clone(),
            foreign_members: Some(foreign_members),
        })
    }

    /// Writes the catalog as indented JSON with keys in sorted order.
    pub fn write<W: Write>(&self, writer: W) -> Result<(), TocError> {
        let value = serde_json::to_value(&self.to_geojson())?;
        let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
        value.serialize(&mut serializer)?;
        Ok(())
    }
}

/// Writes `catalog` to `root`, replacing any earlier table of contents.
pub fn write_catalog(root: &Path, catalog: &Catalog) -> Result<PathBuf, TocError> {
    let path = root.join(TOC_FILE_NAME);
    let mut writer = BufWriter::new(File::create(&path)?);
    catalog.write(&mut writer)?;
    writer.flush()?;
    Ok(path)
}
