//! Yocto recipe generator for ROS packages
//!
//! Given a GitHub owner, a package name and a tag, the generator downloads
//! the source archive, reads the `package.xml` inside it and writes a
//! BitBake recipe next to it.
//!
//! # Example
//!
//! ```no_run
//! use ros_recipe::{RecipeBuilder, Settings};
//!
//! let mut builder = RecipeBuilder::new("OctoMap", "octomap-ros", "0.4.0")
//!     .with_settings(Settings::from_env());
//! let recipe = builder.generate()?;
//! assert_eq!(recipe.file_name().unwrap(), "octomap-ros_0.4.0.bb");
//! # Ok::<(), ros_recipe::RecipeError>(())
//! ```
//!
//! # Generated recipe
//!
//! ```text
//! DESCRIPTION = "octomap_ros provides conversion functions ..."
//! AUTHOR = "Armin Hornung"
//! SECTION = "devel"
//! LICENSE = "BSD"
//! LIC_FILES_CHKSUM = "file://package.xml;beginline=12;endline=12;md5=d566ef916e9dedc494f5f793a6690ba5"
//!
//! DEPENDS = "octomap-msgs roscpp"
//!
//! RDEPENDS_${PN} = "sensor-msgs tf"
//!
//! SRC_URI = "https://github.com/OctoMap/${ROS_SPN}/archive/${PV}.tar.gz;downloadfilename=${ROS_SP}.tar.gz"
//! SRC_URI[md5sum] = "..."
//! SRC_URI[sha256sum] = "..."
//!
//! S = "${WORKDIR}/${ROS_SP}"
//!
//! inherit catkin
//! ```

pub mod config;
pub mod error;
pub mod helpers;
pub mod license;
pub mod manifest;
pub mod output;
pub mod recipe;

pub use config::Settings;
pub use error::{RecipeError, Result};
pub use helpers::ArchiveChecksums;
pub use manifest::{LicenseLine, PackageManifest};
pub use recipe::RecipeBuilder;
