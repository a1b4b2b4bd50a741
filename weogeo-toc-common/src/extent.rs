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
use crate::options::WGS84_EPSG;
use gdal::errors::GdalError;
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use gdal::vector::{LayerAccess, OGRwkbGeometryType};
use gdal::{Dataset, DatasetOptions, DriverManager, GdalOpenFlags};
use geo_types::{Point, Rect};
use std::convert::TryFrom;
use std::path::Path;
use tracing::{debug, warn};

/// Spatial footprint of a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extent {
    Bounds(Rect<f64>),
    Point(Point<f64>),
}

impl Extent {
    pub fn from_corners(west: f64, south: f64, east: f64, north: f64) -> Self {
        Extent::Bounds(Rect::new((west, south), (east, north)))
    }

    /// Stand in for files that have no data of their own.
    pub fn globe() -> Self {
        Extent::from_corners(-180.0, -90.0, 180.0, 90.0)
    }

    fn from_coords(xs: &[f64], ys: &[f64]) -> Self {
        let min = |v: &[f64]| v.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = |v: &[f64]| v.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Extent::from_corners(min(xs), min(ys), max(xs), max(ys))
    }
}

pub trait ExtentResolver {
    /// Extent of the dataset at `path` in EPSG:4326, longitude first.
    fn resolve(&self, path: &Path) -> Result<Extent, TocError>;
}

pub fn check_driver(name: &str) -> Result<(), TocError> {
    DriverManager::get_driver_by_name(name)
        .map(|_| ())
        .map_err(|_| TocError::UnknownDriver(name.to_string()))
}

fn open_dataset(
    path: &Path,
    open_flags: GdalOpenFlags,
    driver: Option<&str>,
) -> Result<Dataset, TocError> {
    let allowed_drivers: Vec<&str> = driver.into_iter().collect();
    let options = DatasetOptions {
        open_flags,
        allowed_drivers: if allowed_drivers.is_empty() {
            None
        } else {
            Some(allowed_drivers.as_slice())
        },
        ..DatasetOptions::default()
    };

    Dataset::open_ex(path, options).map_err(|source| TocError::OpenDataset {
        path: path.to_path_buf(),
        source,
    })
}

fn epsg_code(srs: &SpatialRef) -> Option<u32> {
    match (srs.auth_name(), srs.auth_code()) {
        (Ok(name), Ok(code)) if name.eq_ignore_ascii_case("EPSG") => u32::try_from(code).ok(),
        _ => None,
    }
}

fn srs_from_epsg(epsg: u32, path: &Path) -> Result<SpatialRef, TocError> {
    SpatialRef::from_epsg(epsg).map_err(|source| TocError::SpatialRef {
        path: path.to_path_buf(),
        source,
    })
}

/// Picks the CRS a dataset's coordinates are in. A CRS with an EPSG code is
/// rebuilt from that code; a dataset without one gets `fallback_epsg`.
fn source_spatial_ref(
    srs: Option<SpatialRef>,
    fallback_epsg: u32,
    path: &Path,
) -> Result<SpatialRef, TocError> {
    match srs {
        Some(srs) => match epsg_code(&srs) {
            Some(code) => srs_from_epsg(code, path),
            None => Ok(srs),
        },
        None => {
            warn!(
                path = %path.display(),
                epsg = fallback_epsg,
                "no spatial reference, assuming fallback"
            );
            srs_from_epsg(fallback_epsg, path)
        }
    }
}

fn transform_extent(extent: Extent, transform: &CoordTransform) -> Result<Extent, GdalError> {
    match extent {
        Extent::Point(p) => {
            let mut x = [p.x()];
            let mut y = [p.y()];
            let mut z = [0.0];
            transform.transform_coords(&mut x, &mut y, &mut z)?;
            Ok(Extent::Point(Point::new(x[0], y[0])))
        }
        Extent::Bounds(rect) => {
            let (min, max) = (rect.min(), rect.max());
            let mut xs = [min.x, max.x, max.x, min.x];
            let mut ys = [max.y, max.y, min.y, min.y];
            let mut zs = [0.0; 4];
            transform.transform_coords(&mut xs, &mut ys, &mut zs)?;
            Ok(Extent::from_coords(&xs, &ys))
        }
    }
}

/// Reprojects `extent` from `source` to EPSG:4326. Extents already in
/// EPSG:4326 are returned untouched.
pub fn reproject(extent: Extent, source: SpatialRef, path: &Path) -> Result<Extent, TocError> {
    if epsg_code(&source) == Some(WGS84_EPSG) {
        return Ok(extent);
    }

    let mut source = source;
    let mut target = srs_from_epsg(WGS84_EPSG, path)?;
    source.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

    let transform_err = |source| TocError::Transform {
        path: path.to_path_buf(),
        source,
    };
    let transform = CoordTransform::new(&source, &target).map_err(transform_err)?;
    transform_extent(extent, &transform).map_err(transform_err)
}

fn is_point_type(geom_type: OGRwkbGeometryType::Type) -> bool {
    matches!(
        geom_type,
        OGRwkbGeometryType::wkbPoint
            | OGRwkbGeometryType::wkbPoint25D
            | OGRwkbGeometryType::wkbPointM
            | OGRwkbGeometryType::wkbPointZM
    )
}

#[derive(Debug, Clone)]
pub struct VectorResolver {
    pub driver: Option<String>,
    pub fallback_epsg: u32,
}

impl ExtentResolver for VectorResolver {
    fn resolve(&self, path: &Path) -> Result<Extent, TocError> {
        let gdal_err = |source| TocError::Gdal {
            path: path.to_path_buf(),
            source,
        };

        let dataset = open_dataset(path, GdalOpenFlags::GDAL_OF_VECTOR, self.driver.as_deref())?;
        let mut layer = dataset.layers().next().ok_or_else(|| TocError::EmptyDataset {
            path: path.to_path_buf(),
        })?;

        let (geom_type, layer_srs) = match layer.defn().geom_fields().next() {
            Some(field) => (field.field_type(), field.spatial_ref().ok()),
            None => (OGRwkbGeometryType::wkbUnknown, None),
        };
        debug!(path = %path.display(), geom_type, features = layer.feature_count(), "opened layer");

        let native = if is_point_type(geom_type) && layer.feature_count() == 1 {
            let point = layer
                .features()
                .next()
                .and_then(|feature| feature.geometry().map(|g| g.get_point(0)));
            match point {
                Some((x, y, _)) => Extent::Point(Point::new(x, y)),
                None => {
                    return Err(TocError::MissingGeometry {
                        path: path.to_path_buf(),
                    })
                }
            }
        } else {
            let envelope = layer.get_extent().map_err(gdal_err)?;
            Extent::from_corners(envelope.MinX, envelope.MinY, envelope.MaxX, envelope.MaxY)
        };

        let source = source_spatial_ref(layer_srs, self.fallback_epsg, path)?;
        reproject(native, source, path)
    }
}

#[derive(Debug, Clone)]
pub struct RasterResolver {
    pub driver: Option<String>,
    pub fallback_epsg: u32,
}

impl ExtentResolver for RasterResolver {
    fn resolve(&self, path: &Path) -> Result<Extent, TocError> {
        let dataset = open_dataset(path, GdalOpenFlags::GDAL_OF_RASTER, self.driver.as_deref())?;

        let gt = dataset.geo_transform().map_err(|source| TocError::Gdal {
            path: path.to_path_buf(),
            source,
        })?;
        let (size_x, size_y) = dataset.raster_size();
        let (size_x, size_y) = (size_x as f64, size_y as f64);

        let west = gt[0];
        let south = gt[3] + size_x * gt[4] + size_y * gt[5];
        let east = gt[0] + size_x * gt[1] + size_y * gt[2];
        let north = gt[3];
        let native = Extent::from_corners(west, south, east, north);

        let projection = dataset.projection();
        let srs = if projection.trim().is_empty() {
            None
        } else {
            Some(
                SpatialRef::from_wkt(&projection).map_err(|source| TocError::SpatialRef {
                    path: path.to_path_buf(),
                    source,
                })?,
            )
        };

        let source = source_spatial_ref(srs, self.fallback_epsg, path)?;
        reproject(native, source, path)
    }
}
