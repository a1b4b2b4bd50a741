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

use crate::error::TocError;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_VECTOR_DRIVER: &str = "ESRI Shapefile";

/// British National Grid, the CRS that rasters without projection metadata
/// are assumed to be in unless told otherwise.
pub const DEFAULT_FALLBACK_EPSG: u32 = 27700;

pub const WGS84_EPSG: u32 = 4326;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataType {
    Vector,
    Raster,
}

impl DataType {
    /// Extension to prefer when choosing which file of a group to open.
    pub fn primary_extension(self) -> &'static str {
        match self {
            DataType::Vector => "shp",
            DataType::Raster => "tif",
        }
    }
}

impl FromStr for DataType {
    type Err = TocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vector" => Ok(DataType::Vector),
            "raster" => Ok(DataType::Raster),
            _ => Err(TocError::Error(format!(
                "Unknown data type '{}', expected vector or raster",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorPolicy {
    Abort,
    Skip,
}

impl FromStr for ErrorPolicy {
    type Err = TocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            _ => Err(TocError::Error(format!(
                "Unknown error policy '{}', expected abort or skip",
                s
            ))),
        }
    }
}

/// How a file name is split into base name and extension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtensionPolicy {
    /// Only the text after the last dot is the extension.
    LastSegment,
    /// `name.shp.xml` is a sidecar of `name` with extension `shp.xml`.
    Compound,
}

#[derive(Debug, Clone)]
pub struct TocOptions {
    pub base_dir: PathBuf,
    pub data_type: DataType,
    /// GDAL driver short name. `None` lets GDAL pick.
    pub driver: Option<String>,
    pub fallback_epsg: u32,
    pub error_policy: ErrorPolicy,
    pub extension_policy: ExtensionPolicy,
}

impl TocOptions {
    pub fn new<P: Into<PathBuf>>(base_dir: P, data_type: DataType) -> Self {
        let driver = match data_type {
            DataType::Vector => Some(DEFAULT_VECTOR_DRIVER.to_string()),
            DataType::Raster => None,
        };
        TocOptions {
            base_dir: base_dir.into(),
            data_type,
            driver,
            fallback_epsg: DEFAULT_FALLBACK_EPSG,
            error_policy: ErrorPolicy::Abort,
            extension_policy: ExtensionPolicy::Compound,
        }
    }

    pub fn with_driver(mut self, driver: Option<String>) -> Self {
        if driver.is_some() {
            self.driver = driver;
        }
        self
    }

    pub fn with_fallback_epsg(mut self, epsg: u32) -> Self {
        self.fallback_epsg = epsg;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_extension_policy(mut self, policy: ExtensionPolicy) -> Self {
        self.extension_policy = policy;
        self
    }
}

impl Default for TocOptions {
    fn default() -> Self {
        TocOptions::new(".", DataType::Vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_from_str() {
        assert_eq!("vector".parse::<DataType>().unwrap(), DataType::Vector);
        assert_eq!("Raster".parse::<DataType>().unwrap(), DataType::Raster);
        assert!("points".parse::<DataType>().is_err());
    }

    #[test]
    fn test_driver_defaults_follow_data_type() {
        let vector = TocOptions::new("/data", DataType::Vector);
        assert_eq!(vector.driver.as_deref(), Some("ESRI Shapefile"));

        let raster = TocOptions::new("/data", DataType::Raster);
        assert_eq!(raster.driver, None);

        let raster = raster.with_driver(Some("GTiff".to_string()));
        assert_eq!(raster.driver.as_deref(), Some("GTiff"));

        let vector = TocOptions::default().with_driver(None);
        assert_eq!(vector.driver.as_deref(), Some("ESRI Shapefile"));
    }

    #[test]
    fn test_defaults() {
        let options = TocOptions::default();
        assert_eq!(options.fallback_epsg, 27700);
        assert_eq!(options.error_policy, ErrorPolicy::Abort);
        assert_eq!(options.extension_policy, ExtensionPolicy::Compound);
    }
}
