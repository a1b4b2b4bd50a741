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

pub mod catalog;
pub mod classify;
pub mod error;
pub mod extent;
pub mod feature;
pub mod options;

use catalog::{build_features, write_catalog, Catalog};
use classify::{classify_directory, FileGroup};
use error::TocError;
use extent::{check_driver, ExtentResolver, RasterResolver, VectorResolver};
use options::{DataType, TocOptions};
use std::path::PathBuf;
use tracing::{info, warn};

fn resolver_for(options: &TocOptions) -> Box<dyn ExtentResolver> {
    match options.data_type {
        DataType::Vector => Box::new(VectorResolver {
            driver: options.driver.clone(),
            fallback_epsg: options.fallback_epsg,
        }),
        DataType::Raster => Box::new(RasterResolver {
            driver: options.driver.clone(),
            fallback_epsg: options.fallback_epsg,
        }),
    }
}

/// Scans `options.base_dir` and writes its table of contents there,
/// returning the path written.
pub fn make_table_of_contents(options: &TocOptions) -> Result<PathBuf, TocError> {
    if let Some(driver) = options.driver.as_deref() {
        check_driver(driver)?;
    }

    let groups = classify_directory(&options.base_dir, options.extension_policy)?;
    if groups.values().all(FileGroup::is_orphan) {
        warn!(
            base_dir = %options.base_dir.display(),
            "no data files found, table of contents will hold miscellaneous files only"
        );
    }

    let resolver = resolver_for(options);
    let features = build_features(
        &options.base_dir,
        &groups,
        options.data_type,
        resolver.as_ref(),
        options.error_policy,
    )?;

    let catalog = Catalog::new(features);
    let path = write_catalog(&options.base_dir, &catalog)?;
    info!(
        path = %path.display(),
        features = catalog.features().len(),
        "wrote table of contents"
    );
    Ok(path)
}
