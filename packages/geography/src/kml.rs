//! KML placemark extraction.
//!
//! Only the parts of KML the reference file actually uses are read:
//! `Placemark/name` and `Placemark/LookAt/{longitude,latitude,range}`.
//! Elements are matched by local name, so files with or without the
//! `http://www.opengis.net/kml/2.2` default namespace both parse.

use kintr_geography_models::GeoPoint;
use roxmltree::{Document, Node};

use crate::LoadError;

/// Extracts every placemark that carries a `LookAt` block, in document
/// order.
///
/// Placemarks without a `LookAt` (or with an empty one) are skipped.
///
/// # Errors
///
/// Returns [`LoadError`] if the XML is malformed, a placemark has no
/// `name`, or a `LookAt` is missing or has a non-numeric coordinate.
pub fn parse_placemarks(xml: &str) -> Result<Vec<GeoPoint>, LoadError> {
    let doc = Document::parse(xml)?;
    let mut points = Vec::new();

    for (index, placemark) in doc
        .descendants()
        .filter(|n| is_element(*n, "Placemark"))
        .enumerate()
    {
        let name = child(placemark, "name")
            .map(|n| n.text().unwrap_or_default().trim().to_string())
            .ok_or_else(|| LoadError::Placemark {
                index,
                message: "missing <name>".to_string(),
            })?;

        let Some(look_at) = child(placemark, "LookAt").filter(|n| has_element_children(*n))
        else {
            log::trace!("Skipping placemark '{name}' without LookAt");
            continue;
        };

        let longitude = number(look_at, "longitude", index)?;
        let latitude = number(look_at, "latitude", index)?;
        let range = number(look_at, "range", index)?;

        points.push(GeoPoint {
            name,
            latitude,
            longitude,
            range,
        });
    }

    Ok(points)
}

fn is_element(node: Node<'_, '_>, local_name: &str) -> bool {
    node.is_element() && node.tag_name().name() == local_name
}

fn has_element_children(node: Node<'_, '_>) -> bool {
    node.children().any(|c| c.is_element())
}

fn child<'a, 'input>(node: Node<'a, 'input>, local_name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is_element(*c, local_name))
}

fn number(look_at: Node<'_, '_>, field: &str, index: usize) -> Result<f64, LoadError> {
    let text = child(look_at, field)
        .and_then(|n| n.text())
        .map(str::trim)
        .ok_or_else(|| LoadError::Placemark {
            index,
            message: format!("missing <LookAt><{field}>"),
        })?;

    text.parse::<f64>().map_err(|e| LoadError::Placemark {
        index,
        message: format!("invalid {field} '{text}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Folder>
      <Placemark>
        <name>Lagos</name>
        <LookAt>
          <longitude>3.3792</longitude>
          <latitude>6.5244</latitude>
          <range>25000</range>
        </LookAt>
      </Placemark>
      <Placemark>
        <name>Somewhere Without Camera</name>
        <Point><coordinates>7.0,9.0,0</coordinates></Point>
      </Placemark>
      <Placemark>
        <name>Abuja</name>
        <LookAt>
          <longitude> 7.3986 </longitude>
          <latitude>9.0765</latitude>
          <range>30000</range>
        </LookAt>
      </Placemark>
    </Folder>
  </Document>
</kml>"#;

    #[test]
    fn extracts_placemarks_with_look_at() {
        let points = parse_placemarks(SAMPLE).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "Lagos");
        assert!((points[0].latitude - 6.5244).abs() < 1e-9);
        assert!((points[0].longitude - 3.3792).abs() < 1e-9);
        assert!((points[0].range - 25000.0).abs() < 1e-9);
        assert_eq!(points[1].name, "Abuja");
        assert!((points[1].longitude - 7.3986).abs() < 1e-9);
    }

    #[test]
    fn parses_without_namespace() {
        let xml = "<kml><Placemark><name>Ibadan</name><LookAt>\
                   <longitude>3.9</longitude><latitude>7.38</latitude><range>1</range>\
                   </LookAt></Placemark></kml>";
        let points = parse_placemarks(xml).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "Ibadan");
    }

    #[test]
    fn empty_look_at_is_skipped() {
        let xml = "<kml><Placemark><name>Kano</name><LookAt/></Placemark></kml>";
        assert!(parse_placemarks(xml).unwrap().is_empty());
    }

    #[test]
    fn missing_name_fails() {
        let xml = "<kml><Placemark><LookAt><longitude>1</longitude>\
                   <latitude>2</latitude><range>3</range></LookAt></Placemark></kml>";
        let err = parse_placemarks(xml).unwrap_err();
        assert!(matches!(err, LoadError::Placemark { index: 0, .. }));
    }

    #[test]
    fn missing_range_fails() {
        let xml = "<kml><Placemark><name>Kano</name><LookAt><longitude>8.5</longitude>\
                   <latitude>12.0</latitude></LookAt></Placemark></kml>";
        assert!(matches!(
            parse_placemarks(xml),
            Err(LoadError::Placemark { .. })
        ));
    }

    #[test]
    fn non_numeric_coordinate_fails() {
        let xml = "<kml><Placemark><name>Kano</name><LookAt><longitude>east</longitude>\
                   <latitude>12.0</latitude><range>1</range></LookAt></Placemark></kml>";
        assert!(matches!(
            parse_placemarks(xml),
            Err(LoadError::Placemark { .. })
        ));
    }

    #[test]
    fn malformed_xml_fails() {
        assert!(matches!(
            parse_placemarks("<kml><Placemark>"),
            Err(LoadError::Xml(_))
        ));
    }
}
