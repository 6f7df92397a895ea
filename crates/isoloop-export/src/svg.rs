//! SVG export serializer.
//!
//! Renders reconstructed loops as an SVG string, one closed `<path>` per
//! loop (`M`, then `L` for each further vertex, then `Z`), using the
//! [`svg`] crate for document construction, XML escaping, and path data
//! formatting.
//!
//! The `viewBox` is the loops' bounding box grown by a margin, so the
//! output is viewable without knowing the contour's coordinate space.
//! Strokes are non-scaling so thin contours stay visible at any zoom.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Path, Title};
use svg::node::{Node, Text, Value};

use isoloop_core::{Polyline, bounding_box};

/// Margin around the bounding box, as a fraction of its longer side.
const MARGIN_RATIO: f64 = 0.05;

/// Margin used when the bounding box is degenerate (a single point or a
/// horizontal/vertical line).
const MIN_MARGIN: f64 = 1.0;

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped by the `svg`
/// crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Emitted as `<desc>`; typically the reconstruction parameters.
    pub description: Option<&'a str>,

    /// Serialized `ReconstructConfig`, emitted inside
    /// `<metadata><isoloop:config>` so a dump records how it was made.
    pub config_json: Option<&'a str>,
}

/// Build the `d` attribute for one closed loop.
///
/// Returns an empty string for loops with fewer than 2 points, which
/// cannot be drawn.
///
/// # Examples
///
/// ```
/// use isoloop_core::{Point, Polyline};
/// use isoloop_export::build_path_data;
///
/// let triangle = Polyline::new(vec![
///     Point::new(0.0, 0.0),
///     Point::new(4.0, 0.0),
///     Point::new(0.0, 3.0),
/// ]);
/// let d = build_path_data(&triangle);
/// assert!(d.starts_with("M0,0 L4,0 L0,3"));
/// ```
#[must_use]
pub fn build_path_data(polyline: &Polyline) -> String {
    let points = polyline.points();
    if points.len() < 2 {
        return String::new();
    }

    let first = &points[0];
    let mut data = Data::new().move_to((first.x, first.y));
    for p in &points[1..] {
        data = data.line_to((p.x, p.y));
    }
    String::from(Value::from(data.close()))
}

/// `(min_x, min_y, width, height)` covering every loop plus a margin.
fn view_box(loops: &[Polyline]) -> (f64, f64, f64, f64) {
    let Some((min_x, min_y, max_x, max_y)) = bounding_box(loops) else {
        return (0.0, 0.0, 1.0, 1.0);
    };
    let longer = (max_x - min_x).max(max_y - min_y);
    let margin = if longer > 0.0 {
        longer * MARGIN_RATIO
    } else {
        MIN_MARGIN
    };
    (
        min_x - margin,
        min_y - margin,
        2.0f64.mul_add(margin, max_x - min_x),
        2.0f64.mul_add(margin, max_y - min_y),
    )
}

/// Render loops as a standalone SVG document.
///
/// Loops with fewer than 2 points are skipped. An empty slice yields a
/// valid document with a unit `viewBox` and no paths.
///
/// # Examples
///
/// ```
/// use isoloop_core::{Point, Polyline};
/// use isoloop_export::{SvgMetadata, to_svg};
///
/// let square = Polyline::new(vec![
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 1.0),
/// ]);
/// let metadata = SvgMetadata {
///     title: Some("square"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&[square], &metadata);
/// assert!(svg.contains("<title>square</title>"));
/// assert!(svg.contains("<path"));
/// ```
#[must_use]
pub fn to_svg(loops: &[Polyline], metadata: &SvgMetadata<'_>) -> String {
    let (x, y, w, h) = view_box(loops);
    let mut doc = Document::new()
        .set("width", w.to_string())
        .set("height", h.to_string())
        .set("viewBox", format!("{x} {y} {w} {h}"));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("isoloop:config");
        config_el.assign("xmlns:isoloop", "urn:isoloop:config:1");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    for polyline in loops {
        let d = build_path_data(polyline);
        if d.is_empty() {
            continue;
        }

        let path = Path::new()
            .set("d", d)
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", 1)
            .set("vector-effect", "non-scaling-stroke");
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
