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

use clap::{crate_authors, crate_version, App, Arg, ArgMatches};
use std::ffi::OsString;
use std::process::exit;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;
use weogeo_toc_common::{
    error::TocError,
    make_table_of_contents,
    options::{DataType, ErrorPolicy, ExtensionPolicy, TocOptions},
};

fn main() {
    let args = parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit());

    init_logging(&args);

    let options = match options_from_args(&args) {
        Ok(o) => o,
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    };

    match make_table_of_contents(&options) {
        Ok(path) => println!("{}", path.display()),
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    }
}

fn init_logging(args: &ArgMatches) {
    let level = if args.is_present("debug") {
        Level::DEBUG
    } else if args.is_present("verbose") {
        Level::INFO
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Unable to set up logging: {}", e);
    }
}

fn options_from_args(args: &ArgMatches) -> Result<TocOptions, TocError> {
    let base_dir = args.value_of_os("basedir").expect("basedir is required");
    let data_type: DataType = args
        .value_of("data-type")
        .expect("data-type has a default")
        .parse()?;
    let error_policy: ErrorPolicy = args
        .value_of("on-error")
        .expect("on-error has a default")
        .parse()?;

    let mut options = TocOptions::new(base_dir, data_type)
        .with_driver(args.value_of("file-format").map(String::from))
        .with_error_policy(error_policy);

    if let Some(epsg) = args.value_of("fallback-epsg") {
        let epsg = epsg
            .parse()
            .map_err(|e| TocError::Error(format!("Invalid fallback EPSG code {}: {}", epsg, e)))?;
        options = options.with_fallback_epsg(epsg);
    }

    if args.is_present("last-segment-extensions") {
        options = options.with_extension_policy(ExtensionPolicy::LastSegment);
    }

    Ok(options)
}

fn parse_args<'a, I, T>(args: I) -> Result<ArgMatches<'a>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    App::new("weogeo-toc")
        .version(crate_version!())
        .author(crate_authors!())
        .about("writes a WeoGeo table of contents for a directory of geospatial data")
        .arg(
            Arg::with_name("basedir")
                .short("B")
                .long("basedir")
                .required(true)
                .takes_value(true)
                .number_of_values(1)
                .help("The base directory of the data files"),
        )
        .arg(
            Arg::with_name("file-format")
                .short("F")
                .long("file-format")
                .takes_value(true)
                .number_of_values(1)
                .help("The GDAL driver to open data files with (default 'ESRI Shapefile' for vector data)"),
        )
        .arg(
            Arg::with_name("data-type")
                .short("D")
                .long("data-type")
                .takes_value(true)
                .possible_values(&["vector", "raster"])
                .default_value("vector")
                .help("Whether the data files are vector or raster"),
        )
        .arg(
            Arg::with_name("fallback-epsg")
                .long("fallback-epsg")
                .takes_value(true)
                .number_of_values(1)
                .validator(|v| v.parse::<u32>().map(|_| ()).map_err(|e| e.to_string()))
                .help("EPSG code assumed for data without a spatial reference (default 27700)"),
        )
        .arg(
            Arg::with_name("on-error")
                .long("on-error")
                .takes_value(true)
                .possible_values(&["abort", "skip"])
                .default_value("abort")
                .help("Stop at the first unreadable dataset, or skip it"),
        )
        .arg(
            Arg::with_name("last-segment-extensions")
                .long("last-segment-extensions")
                .takes_value(false)
                .help("Treat only the text after the last dot as the extension, so roads.shp.xml is not grouped with roads"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .takes_value(false)
                .help("Log each file as it is added"),
        )
        .arg(
            Arg::with_name("debug")
                .short("d")
                .long("debug")
                .takes_value(false)
                .help("Log classification and dataset details"),
        )
        .get_matches_from_safe(args)
}
