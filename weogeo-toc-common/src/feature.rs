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

use crate::classify::FileGroup;
use crate::extent::Extent;
use geo_types::{LineString, Polygon};
use geojson::{Feature, Geometry, JsonObject, JsonValue, Value};

pub const WEO_FEATURE: &str = "WEO_FEATURE";
pub const LAYERS: &str = "0";

/// Polygon rings run north west, north east, south east, south west.
pub fn extent_to_geojson(extent: &Extent) -> Value {
    match extent {
        Extent::Point(p) => Value::from(p),
        Extent::Bounds(rect) => {
            let (west, south) = rect.min().x_y();
            let (east, north) = rect.max().x_y();
            let ring = LineString::from(vec![
                (west, north),
                (east, north),
                (east, south),
                (west, south),
                (west, north),
            ]);
            Value::from(&Polygon::new(ring, vec![]))
        }
    }
}

fn properties(base: &str, exts: String, miscellaneous: bool) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("PATH".to_string(), JsonValue::from(format!("./{}", base)));
    properties.insert("EXTS".to_string(), JsonValue::from(exts));
    properties.insert("LAYERS".to_string(), JsonValue::from(LAYERS));
    properties.insert("WEO_TYPE".to_string(), JsonValue::from(WEO_FEATURE));
    properties.insert(
        "WEO_MISCELLANEOUS_FILE".to_string(),
        JsonValue::from(if miscellaneous { "Yes" } else { "No" }),
    );
    properties
}

fn make_feature(extent: &Extent, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(extent_to_geojson(extent))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn data_feature(base: &str, group: &FileGroup, extent: &Extent) -> Feature {
    make_feature(extent, properties(base, group.data_exts(), false))
}

/// Feature for the sidecar files of a data group, sharing its extent.
pub fn misc_feature(base: &str, group: &FileGroup, extent: &Extent) -> Feature {
    make_feature(extent, properties(base, group.misc_exts(), true))
}

pub fn orphan_feature(base: &str, group: &FileGroup) -> Feature {
    misc_feature(base, group, &Extent::globe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;

    fn group() -> FileGroup {
        FileGroup {
            data: vec!["shp".into(), "dbf".into(), "shx".into()],
            misc: vec!["xml".into()],
        }
    }

    fn property<'a>(feature: &'a Feature, key: &str) -> &'a str {
        feature
            .property(key)
            .and_then(JsonValue::as_str)
            .expect("property is a string")
    }

    #[test]
    fn test_data_feature_properties() {
        let extent = Extent::from_corners(-93.3, 44.9, -93.1, 45.1);
        let feature = data_feature("sub/parcels", &group(), &extent);

        assert_eq!(property(&feature, "PATH"), "./sub/parcels");
        assert_eq!(property(&feature, "EXTS"), "shp;dbf;shx");
        assert_eq!(property(&feature, "LAYERS"), "0");
        assert_eq!(property(&feature, "WEO_TYPE"), "WEO_FEATURE");
        assert_eq!(property(&feature, "WEO_MISCELLANEOUS_FILE"), "No");
    }

    #[test]
    fn test_polygon_ring_order() {
        let extent = Extent::from_corners(-93.3, 44.9, -93.1, 45.1);
        let feature = data_feature("parcels", &group(), &extent);

        let value = feature.geometry.expect("geometry").value;
        assert_eq!(
            value,
            Value::Polygon(vec![vec![
                vec![-93.3, 45.1],
                vec![-93.1, 45.1],
                vec![-93.1, 44.9],
                vec![-93.3, 44.9],
                vec![-93.3, 45.1],
            ]])
        );
    }

    #[test]
    fn test_misc_feature_shares_extent() {
        let extent = Extent::from_corners(1.0, 2.0, 3.0, 4.0);
        let data = data_feature("parcels", &group(), &extent);
        let misc = misc_feature("parcels", &group(), &extent);

        assert_eq!(data.geometry, misc.geometry);
        assert_eq!(property(&misc, "EXTS"), "xml");
        assert_eq!(property(&misc, "WEO_MISCELLANEOUS_FILE"), "Yes");
    }

    #[test]
    fn test_orphan_feature_spans_globe() {
        let readme = FileGroup {
            data: vec![],
            misc: vec!["txt".into(), "pdf".into()],
        };
        let feature = orphan_feature("readme", &readme);

        assert_eq!(property(&feature, "EXTS"), "txt;pdf");
        assert_eq!(property(&feature, "WEO_MISCELLANEOUS_FILE"), "Yes");
        assert_eq!(
            feature.geometry.expect("geometry").value,
            Value::Polygon(vec![vec![
                vec![-180.0, 90.0],
                vec![180.0, 90.0],
                vec![180.0, -90.0],
                vec![-180.0, -90.0],
                vec![-180.0, 90.0],
            ]])
        );
    }

    #[test]
    fn test_point_feature() {
        let extent = Extent::Point(Point::new(-93.25, 44.95));
        let feature = data_feature("well", &group(), &extent);

        assert_eq!(
            feature.geometry.expect("geometry").value,
            Value::Point(vec![-93.25, 44.95])
        );
    }
}
