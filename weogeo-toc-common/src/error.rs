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

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TocError {
    #[error("Base directory '{}' is not a readable directory", path.display())]
    BaseDir { path: PathBuf },

    #[error("Error walking directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("No GDAL driver named '{0}'")]
    UnknownDriver(String),

    #[error("Could not open {}: {source}", path.display())]
    OpenDataset {
        path: PathBuf,
        #[source]
        source: gdal::errors::GdalError,
    },

    #[error("{} contains no layers", path.display())]
    EmptyDataset { path: PathBuf },

    #[error("Point feature in {} has no geometry", path.display())]
    MissingGeometry { path: PathBuf },

    #[error("Error creating spatial ref for {}: {source}", path.display())]
    SpatialRef {
        path: PathBuf,
        #[source]
        source: gdal::errors::GdalError,
    },

    #[error("Error transforming extent of {} to EPSG:4326: {source}", path.display())]
    Transform {
        path: PathBuf,
        #[source]
        source: gdal::errors::GdalError,
    },

    #[error("Error reading {}: {source}", path.display())]
    Gdal {
        path: PathBuf,
        #[source]
        source: gdal::errors::GdalError,
    },

    #[error("Error writing table of contents: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error serializing table of contents: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Error(String),
}

impl TocError {
    /// Path of the dataset the error came from, if any.
    pub fn dataset(&self) -> Option<&PathBuf> {
        match self {
            TocError::OpenDataset { path, .. }
            | TocError::EmptyDataset { path }
            | TocError::MissingGeometry { path }
            | TocError::SpatialRef { path, .. }
            | TocError::Transform { path, .. }
            | TocError::Gdal { path, .. } => Some(path),
            _ => None,
        }
    }
}
