//! Known license checksums
//!
//! BitBake verifies `LIC_FILES_CHKSUM` against the MD5 of the license text.
//! These are the digests of the license declaration block for the licenses
//! ROS packages commonly declare.

/// License identifier -> MD5 of its canonical text.
const LICENSE_DIGESTS: &[(&str, &str)] = &[
    ("BSD", "d566ef916e9dedc494f5f793a6690ba5"),
    (
        "Mozilla Public License Version 1.1",
        "e1b5a50d4dd59d8102e41a7a2254462d",
    ),
    ("CC-BY-NC-SA-2.0", "11e24f757f025b2cbebd5b14b4a7ca19"),
    ("LGPL-2.1", "184dd1523b9a109aead3fbbe0b4262e0"),
    ("GPL", "162b49cfbae9eadf37c9b89b2d2ac6be"),
    ("LGPL-2.1+", "58d727014cda5ed405b7fb52666a1f97"),
    ("LGPLv2", "46ee8693f40a89a31023e97ae17ecf19"),
    ("MIT", "58e54c03ca7f821dd3967e2a2cd1596e"),
];

/// Look up the license text digest for an identifier.
///
/// Matching is exact and case-sensitive. Unknown identifiers return `None`.
pub fn license_md5(license: &str) -> Option<&'static str> {
    LICENSE_DIGESTS
        .iter()
        .find(|(id, _)| *id == license)
        .map(|(_, md5)| *md5)
}

/// All identifiers with a known digest, in table order.
pub fn known_licenses() -> impl Iterator<Item = &'static str> {
    LICENSE_DIGESTS.iter().map(|(id, _)| *id)
}
