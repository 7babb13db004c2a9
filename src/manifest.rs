//! `package.xml` manifest reader
//!
//! Parses a ROS package manifest into a [`PackageManifest`] in one pass.
//! Only direct children of the root `<package>` element are looked at, and
//! an element's text is the text that precedes its first child node.
//!
//! ```xml
//! <package>
//!   <name>octomap_ros</name>
//!   <version>0.4.0</version>
//!   <description>octomap_ros provides conversion functions.</description>
//!   <author>Armin Hornung</author>
//!   <license>BSD</license>
//!   <build_depend>roscpp</build_depend>
//!   <run_depend>sensor_msgs</run_depend>
//! </package>
//! ```

use crate::error::{RecipeError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;

/// Marker embedded in the recipe when no line mentions a license.
pub const CLOSED_LICENSE_LINE: &str = "CLOSED";

/// Where the license is declared in the raw manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseLine {
    /// 1-based line number
    Line(usize),
    Closed,
}

impl fmt::Display for LicenseLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(n) => write!(f, "{}", n),
            Self::Closed => f.write_str(CLOSED_LICENSE_LINE),
        }
    }
}

/// Typed contents of a `package.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    /// Normalized with [`normalize_description`].
    pub description: String,
    /// First declared author only.
    pub author: String,
    /// First declared license only.
    pub license: String,
    /// `<build_depend>` entries with `_` replaced by `-`.
    pub build_depends: Vec<String>,
    /// `<run_depend>` entries with `_` replaced by `-`.
    pub run_depends: Vec<String>,
    pub license_line: LicenseLine,
}

impl PackageManifest {
    /// Read and parse a manifest file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| RecipeError::io(path, e))?;
        Self::parse_at(&raw, path)
    }

    /// Parse manifest text held in memory.
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_at(xml, Path::new("package.xml"))
    }

    fn parse_at(raw: &str, path: &Path) -> Result<Self> {
        let xml: &str = &normalize_line_endings(raw);
        let elements = package_children(xml).map_err(|source| RecipeError::XmlParse {
            path: path.to_path_buf(),
            source,
        })?;

        let all = |field: &str| -> Vec<String> {
            elements
                .iter()
                .filter(|(tag, _)| tag == field)
                .map(|(_, text)| dependency_name(text))
                .collect()
        };

        Ok(Self {
            name: first(&elements, "name")?.to_string(),
            version: first(&elements, "version")?.to_string(),
            description: normalize_description(first(&elements, "description")?),
            author: first(&elements, "author")?.to_string(),
            license: first(&elements, "license")?.to_string(),
            build_depends: all("build_depend"),
            run_depends: all("run_depend"),
            license_line: license_line(xml),
        })
    }
}

/// Fold `\r\n` and lone `\r` into `\n`, as an XML processor does before
/// parsing.
fn normalize_line_endings(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\r') {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Text of the first element named `field`.
fn first<'a>(elements: &'a [(String, String)], field: &'static str) -> Result<&'a str> {
    elements
        .iter()
        .find(|(tag, _)| tag == field)
        .map(|(_, text)| text.as_str())
        .ok_or(RecipeError::ManifestFieldMissing { field })
}

/// Collapse a manifest description onto one line.
///
/// Newlines are dropped, runs of spaces become one space, every period gets
/// a following space if it lacks one, and leading spaces are stripped.
pub fn normalize_description(raw: &str) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    let mut prev_space = false;
    for c in raw.chars().filter(|&c| c != '\n') {
        if c == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        collapsed.push(c);
    }

    let mut spaced = String::with_capacity(collapsed.len() + 8);
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        spaced.push(c);
        if c == '.' && chars.peek() != Some(&' ') {
            spaced.push(' ');
        }
    }

    spaced.trim_start_matches(' ').to_string()
}

/// Recipe-style package name: underscores become hyphens.
pub fn dependency_name(dep: &str) -> String {
    dep.replace('_', "-")
}

/// Find the first raw line containing `license`.
pub fn license_line(raw: &str) -> LicenseLine {
    raw.lines()
        .position(|line| line.contains("license"))
        .map_or(LicenseLine::Closed, |idx| LicenseLine::Line(idx + 1))
}

/// Text of one `<package>` child being read.
struct Capture {
    tag: String,
    text: String,
    /// False once the first child node has been seen.
    open: bool,
}

/// Collect `(tag, text)` for every direct child of a root `<package>`, in
/// document order.
fn package_children(xml: &str) -> std::result::Result<Vec<(String, String)>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut elements = Vec::new();
    let mut depth = 0usize;
    let mut in_package = false;
    let mut current: Option<Capture> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if depth == 1 {
                    in_package = e.name().as_ref() == b"package";
                } else if depth == 2 && in_package {
                    current = Some(Capture {
                        tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                        text: String::new(),
                        open: true,
                    });
                } else if let Some(capture) = current.as_mut() {
                    capture.open = false;
                }
            }
            Event::Empty(e) => {
                if depth == 1 && in_package {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    elements.push((tag, String::new()));
                } else if let Some(capture) = current.as_mut() {
                    capture.open = false;
                }
            }
            Event::Text(t) => {
                if let Some(capture) = current.as_mut().filter(|c| c.open) {
                    capture.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(capture) = current.as_mut().filter(|c| c.open) {
                    capture.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::Comment(_) | Event::PI(_) => {
                if let Some(capture) = current.as_mut() {
                    capture.open = false;
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some(capture) = current.take() {
                        elements.push((capture.tag, capture.text));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OCTOMAP_ROS: &str = r#"<?xml version="1.0"?>
<package>
  <name>octomap_ros</name>
  <version>0.4.0</version>
  <description>
    octomap_ros provides conversion functions between ROS and OctoMap's native types.
    This enables a convenient use of the octomap package in ROS.
  </description>
  <author email="hornunga@informatik.uni-freiburg.de">Armin Hornung</author>
  <author>Second Author</author>
  <maintainer email="hornunga@informatik.uni-freiburg.de">Armin Hornung</maintainer>
  <license>BSD</license>
  <license>GPL</license>

  <buildtool_depend>catkin</buildtool_depend>
  <build_depend>octomap_msgs</build_depend>
  <build_depend>roscpp</build_depend>
  <run_depend>sensor_msgs</run_depend>
  <run_depend>tf</run_depend>
</package>
"#;

    #[test]
    fn test_parse_octomap_ros() {
        let m = PackageManifest::parse(OCTOMAP_ROS).unwrap();
        assert_eq!(m.name, "octomap_ros");
        assert_eq!(m.version, "0.4.0");
        assert_eq!(
            m.description,
            "octomap_ros provides conversion functions between ROS and OctoMap's native types. \
             This enables a convenient use of the octomap package in ROS. "
        );
        assert_eq!(m.author, "Armin Hornung");
        assert_eq!(m.license, "BSD");
        assert_eq!(m.build_depends, vec!["octomap-msgs", "roscpp"]);
        assert_eq!(m.run_depends, vec!["sensor-msgs", "tf"]);
        assert_eq!(m.license_line, LicenseLine::Line(12));
    }

    #[test]
    fn test_parse_crlf_manifest() {
        let xml = "<?xml version=\"1.0\"?>\r\n<package>\r\n  <name>crlf_pkg</name>\r\n\
                   <version>1.0.0</version>\r\n  <description>\r\n  First line.\r\n  \
                   Second line.\r\n</description>\r\n  <author>A</author>\r\n  \
                   <license>BSD</license>\r\n  <run_depend>std_msgs</run_depend>\r\n</package>\r\n";
        let m = PackageManifest::parse(xml).unwrap();
        assert_eq!(m.description, "First line. Second line. ");
        assert_eq!(m.name, "crlf_pkg");
        assert_eq!(m.run_depends, vec!["std-msgs"]);
        assert_eq!(m.license_line, LicenseLine::Line(10));
    }

    #[test]
    fn test_lone_carriage_returns_are_line_breaks() {
        let xml = "<package><name>a</name><version>1</version>\r\
                   <description>One.\rTwo\r</description>\
                   <author>x</author><license>MIT</license></package>";
        let m = PackageManifest::parse(xml).unwrap();
        assert_eq!(m.description, "One. Two");
        assert_eq!(m.license_line, LicenseLine::Line(4));
    }

    #[test]
    fn test_missing_required_field() {
        let xml = "<package><name>a</name><version>1</version><description>d</description>\
                   <author>x</author></package>";
        let err = PackageManifest::parse(xml).unwrap_err();
        assert!(matches!(
            err,
            RecipeError::ManifestFieldMissing { field: "license" }
        ));
    }

    #[test]
    fn test_fields_must_be_direct_children_of_package() {
        let xml = "<package><export><name>nested</name></export></package>";
        let err = PackageManifest::parse(xml).unwrap_err();
        assert!(matches!(
            err,
            RecipeError::ManifestFieldMissing { field: "name" }
        ));
    }

    #[test]
    fn test_root_must_be_package() {
        let xml = "<manifest><name>a</name></manifest>";
        assert!(matches!(
            PackageManifest::parse(xml),
            Err(RecipeError::ManifestFieldMissing { field: "name" })
        ));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let xml = "<package><name>a</version></package>";
        assert!(matches!(
            PackageManifest::parse(xml),
            Err(RecipeError::XmlParse { .. })
        ));
    }

    #[test]
    fn test_empty_dependency_lists() {
        let xml = "<package><name>a</name><version>1</version><description>d</description>\
                   <author>x</author><license>MIT</license></package>";
        let m = PackageManifest::parse(xml).unwrap();
        assert!(m.build_depends.is_empty());
        assert!(m.run_depends.is_empty());
    }

    #[test]
    fn test_empty_element_reads_as_empty_text() {
        let xml = "<package><name>a</name><version>1</version><description/>\
                   <author></author><license>MIT</license></package>";
        let m = PackageManifest::parse(xml).unwrap();
        assert_eq!(m.description, "");
        assert_eq!(m.author, "");
    }

    #[test]
    fn test_text_stops_at_first_child() {
        let xml = "<package><name>a</name><version>1</version>\
                   <description>See <a href=\"x\">docs</a> for more</description>\
                   <author>x</author><license>MIT</license></package>";
        let m = PackageManifest::parse(xml).unwrap();
        assert_eq!(m.description, "See ");
    }

    #[test]
    fn test_entities_and_cdata() {
        let xml = "<package><name>a</name><version>1</version>\
                   <description><![CDATA[Fast & small]]></description>\
                   <author>Tom &amp; Jerry</author><license>MIT</license></package>";
        let m = PackageManifest::parse(xml).unwrap();
        assert_eq!(m.description, "Fast & small");
        assert_eq!(m.author, "Tom & Jerry");
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PackageManifest::from_path(&dir.path().join("package.xml")).unwrap_err();
        assert!(matches!(err, RecipeError::Io { .. }));
    }

    #[test]
    fn test_from_path_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.xml");
        std::fs::write(&path, "<package><name></package>").unwrap();
        match PackageManifest::from_path(&path) {
            Err(RecipeError::XmlParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected XmlParse, got {:?}", other),
        }
    }

    // ==================== normalize_description ====================

    #[test]
    fn test_normalize_collapses_spaces_and_newlines() {
        let out = normalize_description("  A  tool\n   for    robots");
        assert_eq!(out, "A tool for robots");
    }

    #[test]
    fn test_normalize_spaces_after_periods() {
        assert_eq!(normalize_description("One.Two. Three."), "One. Two. Three. ");
    }

    #[test]
    fn test_normalize_properties() {
        let inputs = [
            "a.b.c",
            "  lots   of\n\n spaces .  and.periods\n",
            "\n\n",
            "x..y",
            "trailing.",
            "multi\nline\ntext.with  gaps",
            "\r\n  First line.\r\n  Second line.\r\n",
            "old\rmac\rendings.",
        ];
        for input in inputs {
            let out = normalize_description(&normalize_line_endings(input));
            assert!(!out.contains('\r'), "{:?}", out);
            assert!(!out.contains('\n'), "{:?}", out);
            assert!(!out.contains("  "), "{:?}", out);
            assert!(!out.starts_with(' '), "{:?}", out);
            let bytes = out.as_bytes();
            for (i, b) in bytes.iter().enumerate() {
                if *b == b'.' {
                    assert_eq!(bytes.get(i + 1), Some(&b' '), "{:?}", out);
                }
            }
        }
    }

    // ==================== dependency names ====================

    #[test]
    fn test_dependency_underscores_become_hyphens() {
        for dep in ["octomap_msgs", "a_b_c", "_lead", "plain", "trail_"] {
            let out = dependency_name(dep);
            assert!(!out.contains('_'));
            assert_eq!(out.len(), dep.len());
            assert_eq!(
                out.matches('-').count(),
                dep.matches('_').count() + dep.matches('-').count()
            );
        }
    }

    // ==================== license line ====================

    #[test]
    fn test_license_line_first_match() {
        let raw = "<package>\n<name>x</name>\n<license>BSD</license>\n<license>MIT</license>\n";
        assert_eq!(license_line(raw), LicenseLine::Line(3));
    }

    #[test]
    fn test_license_line_is_case_sensitive() {
        let raw = "<package>\n<LICENSE>BSD</LICENSE>\n</package>";
        assert_eq!(license_line(raw), LicenseLine::Closed);
    }

    #[test]
    fn test_license_line_display() {
        assert_eq!(LicenseLine::Line(7).to_string(), "7");
        assert_eq!(LicenseLine::Closed.to_string(), "CLOSED");
    }
}
