//! Shared fixtures: manifests and in-memory GitHub-style source archives.

#![allow(dead_code)]

use sha2::Digest;

/// Manifest of octomap_ros 0.4.0, trimmed. `<license>` is on line 12.
pub const OCTOMAP_ROS_MANIFEST: &str = r#"<?xml version="1.0"?>
<package>
  <name>octomap_ros</name>
  <version>0.4.0</version>
  <description>
    octomap_ros provides conversion functions between ROS and OctoMap's native types.
    This enables a convenient use of the octomap package in ROS.
  </description>
  <author email="hornunga@informatik.uni-freiburg.de">Armin Hornung</author>
  <maintainer email="hornunga@informatik.uni-freiburg.de">Armin Hornung</maintainer>
  <url>http://ros.org/wiki/octomap_ros</url>
  <license>BSD</license>

  <buildtool_depend>catkin</buildtool_depend>
  <build_depend>roscpp</build_depend>
</package>
"#;

/// Manifest with an unlisted license and run dependencies.
pub const APACHE_MANIFEST: &str = r#"<package>
  <name>my_driver</name>
  <version>1.2.3</version>
  <description>Driver.Talks to hardware.</description>
  <author>Jane Doe</author>
  <license>Apache-2.0</license>
  <build_depend>sensor_msgs</build_depend>
  <run_depend>sensor_msgs</run_depend>
  <run_depend>diagnostic_updater</run_depend>
</package>
"#;

/// Build a `.tar.gz` the way GitHub serves tag archives: a pax global
/// header, then everything under `<root>/`.
pub fn source_archive(root: &str, manifest: &str) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let comment = b"52 comment=0123456789abcdef0123456789abcdef01234567\n";
    let mut pax = tar::Header::new_ustar();
    pax.set_entry_type(tar::EntryType::XGlobalHeader);
    pax.set_size(comment.len() as u64);
    pax.set_mode(0o644);
    pax.set_cksum();
    builder
        .append_data(&mut pax, "pax_global_header", &comment[..])
        .unwrap();

    append(&mut builder, &format!("{}/package.xml", root), manifest.as_bytes());
    append(
        &mut builder,
        &format!("{}/CMakeLists.txt", root),
        b"cmake_minimum_required(VERSION 2.8.3)\n",
    );
    append(
        &mut builder,
        &format!("{}/src/conversions.cpp", root),
        b"// conversions\n",
    );

    builder.into_inner().unwrap().finish().unwrap()
}

fn append(
    builder: &mut tar::Builder<flate2::write::GzEncoder<Vec<u8>>>,
    path: &str,
    content: &[u8],
) {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, path, content).unwrap();
}

pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(md5::Md5::digest(data))
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha2::Sha256::digest(data))
}
