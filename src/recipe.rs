//! Recipe generation
//!
//! [`RecipeBuilder`] walks one package through the pipeline:
//!
//! ```text
//! download_archive -> extract_archive -> import_manifest -> write_recipe -> cleanup
//! ```
//!
//! Each step fills in what the next one reads. [`RecipeBuilder::generate`]
//! runs them all in order.

use crate::config::Settings;
use crate::error::{RecipeError, Result};
use crate::helpers::{self, ArchiveChecksums};
use crate::license;
use crate::manifest::PackageManifest;
use crate::output;
use std::path::{Path, PathBuf};

/// Extension of generated recipe files.
pub const RECIPE_EXTENSION: &str = "bb";

/// Name of the manifest at the root of every ROS source archive.
pub const MANIFEST_FILE: &str = "package.xml";

/// GitHub archive URL for a package tag.
///
/// Repositories use underscores where package names use hyphens, so
/// `octomap-ros` is fetched from `.../OctoMap/octomap_ros/archive/<tag>.tar.gz`.
pub fn source_url(base: &str, repository: &str, name: &str, version: &str) -> String {
    format!(
        "{}/{}/{}/archive/{}.tar.gz",
        base.trim_end_matches('/'),
        repository,
        name.replace('-', "_"),
        version
    )
}

/// `<name_with_underscores>-<version>`, the stem of both the archive and
/// the directory it unpacks to.
pub fn source_stem(name: &str, version: &str) -> String {
    format!("{}-{}", name.replace('-', "_"), version)
}

/// `<name-with-hyphens>_<version>.bb`
pub fn recipe_file_name(name: &str, version: &str) -> String {
    format!("{}_{}.{}", name.replace('_', "-"), version, RECIPE_EXTENSION)
}

/// Everything a rendered recipe is made of.
#[derive(Debug, Clone, Copy)]
pub struct RecipeInputs<'a> {
    /// GitHub owner, as given on the command line
    pub repository: &'a str,
    pub manifest: &'a PackageManifest,
    /// `None` when the license has no known digest; rendered empty.
    pub license_md5: Option<&'a str>,
    pub checksums: &'a ArchiveChecksums,
}

/// Line buffer for recipe text. Every line ends in `\n`.
#[derive(Default)]
struct RecipeText {
    buf: String,
}

impl RecipeText {
    /// `KEY = "value"`, value written verbatim.
    fn assign(&mut self, key: &str, value: &str) {
        self.buf.push_str(key);
        self.buf.push_str(" = \"");
        self.buf.push_str(value);
        self.buf.push_str("\"\n");
    }

    fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Assignment of a space-separated list, skipped when empty. The blank
    /// line after it is always written.
    fn list_block(&mut self, key: &str, items: &[String]) {
        if !items.is_empty() {
            self.assign(key, &items.join(" "));
        }
        self.blank();
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// Render the recipe text. Line order and content are fixed.
pub fn render(inputs: &RecipeInputs<'_>) -> String {
    let m = inputs.manifest;
    let mut out = RecipeText::default();

    out.assign("DESCRIPTION", m.description.trim_end());
    out.assign("AUTHOR", &m.author);
    out.assign("SECTION", "devel");
    out.assign("LICENSE", &m.license);
    out.assign(
        "LIC_FILES_CHKSUM",
        &format!(
            "file://{};beginline={};endline={};md5={}",
            MANIFEST_FILE,
            m.license_line,
            m.license_line,
            inputs.license_md5.unwrap_or_default()
        ),
    );
    out.blank();

    out.list_block("DEPENDS", &m.build_depends);
    out.list_block("RDEPENDS_${PN}", &m.run_depends);

    // Package name and version stay BitBake variables here
    out.assign(
        "SRC_URI",
        &format!(
            "https://github.com/{}/${{ROS_SPN}}/archive/${{PV}}.tar.gz;downloadfilename=${{ROS_SP}}.tar.gz",
            inputs.repository
        ),
    );
    out.assign("SRC_URI[md5sum]", &inputs.checksums.md5);
    out.assign("SRC_URI[sha256sum]", &inputs.checksums.sha256);
    out.blank();

    out.assign("S", "${WORKDIR}/${ROS_SP}");
    out.blank();

    out.line("inherit catkin");
    out.finish()
}

/// Generates the recipe for one package tag.
#[derive(Debug, Clone)]
pub struct RecipeBuilder {
    repository: String,
    name: String,
    version: String,
    work_dir: PathBuf,
    settings: Settings,
    source_dir: Option<PathBuf>,
    manifest: Option<PackageManifest>,
    license_md5: Option<&'static str>,
}

impl RecipeBuilder {
    /// Builder working in the current directory with default settings.
    pub fn new(
        repository: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            name: name.into(),
            version: version.into(),
            work_dir: PathBuf::from("."),
            settings: Settings::default(),
            source_dir: None,
            manifest: None,
            license_md5: None,
        }
    }

    /// Directory the archive, its extracted tree and the recipe go into.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn source_url(&self) -> String {
        source_url(
            &self.settings.github_url,
            &self.repository,
            &self.name,
            &self.version,
        )
    }

    pub fn archive_path(&self) -> PathBuf {
        self.work_dir
            .join(format!("{}.tar.gz", source_stem(&self.name, &self.version)))
    }

    /// Directory the archive is expected to unpack to.
    pub fn folder_path(&self) -> PathBuf {
        self.work_dir.join(source_stem(&self.name, &self.version))
    }

    pub fn recipe_path(&self) -> PathBuf {
        self.work_dir
            .join(recipe_file_name(&self.name, &self.version))
    }

    /// Manifest loaded by [`import_manifest`](Self::import_manifest).
    pub fn manifest(&self) -> Option<&PackageManifest> {
        self.manifest.as_ref()
    }

    /// Digest of the declared license, if it is in the table.
    pub fn license_md5(&self) -> Option<&'static str> {
        self.license_md5
    }

    /// Fetch the source archive into the work directory.
    pub fn download_archive(&self) -> Result<PathBuf> {
        let url = self.source_url();
        let dest = self.archive_path();
        output::sub_action("download");
        output::detail(&url);
        helpers::download(&url, &dest, self.settings.http_timeout)?;
        Ok(dest)
    }

    /// Unpack the archive and locate the source directory.
    ///
    /// When `<name>-<version>` is not what the archive holds but it has a
    /// single top-level directory (GitHub drops a leading `v` from tags),
    /// that directory is used instead.
    pub fn extract_archive(&mut self) -> Result<PathBuf> {
        output::sub_action("extract");
        let archive = self.archive_path();
        let roots = helpers::extract_tar_gz(&archive, &self.work_dir)?;

        let expected = self.folder_path();
        let source_dir = if expected.is_dir() {
            expected
        } else {
            match roots.as_slice() {
                [only] if self.work_dir.join(only).is_dir() => {
                    output::warning(&format!(
                        "archive unpacked to {} instead of {}",
                        only,
                        source_stem(&self.name, &self.version)
                    ));
                    self.work_dir.join(only)
                }
                _ => {
                    return Err(RecipeError::archive(
                        &archive,
                        format!(
                            "no {} directory in archive",
                            source_stem(&self.name, &self.version)
                        ),
                    ));
                }
            }
        };

        self.source_dir = Some(source_dir.clone());
        Ok(source_dir)
    }

    /// Read `package.xml` from the extracted sources and resolve the
    /// license digest.
    pub fn import_manifest(&mut self) -> Result<&PackageManifest> {
        let source_dir = self
            .source_dir
            .as_deref()
            .ok_or(RecipeError::StepOutOfOrder {
                step: "import_manifest",
                requires: "extract_archive",
            })?;

        output::sub_action("import");
        let manifest = PackageManifest::from_path(&source_dir.join(MANIFEST_FILE))?;

        let license_md5 = license::license_md5(&manifest.license);
        if license_md5.is_none() {
            if self.settings.strict_license {
                return Err(RecipeError::UnknownLicense {
                    license: manifest.license,
                });
            }
            output::warning(&format!(
                "no checksum known for license '{}'; LIC_FILES_CHKSUM md5 left empty",
                manifest.license
            ));
        }

        output::detail(&format!(
            "{} {} ({}), {} build / {} run dependencies",
            manifest.name,
            manifest.version,
            manifest.license,
            manifest.build_depends.len(),
            manifest.run_depends.len()
        ));

        self.license_md5 = license_md5;
        Ok(self.manifest.insert(manifest))
    }

    /// Checksum the archive and render the recipe text.
    pub fn render_recipe(&self) -> Result<String> {
        let manifest = self.manifest.as_ref().ok_or(RecipeError::StepOutOfOrder {
            step: "render_recipe",
            requires: "import_manifest",
        })?;

        warn_on_quotes(manifest);
        let checksums = helpers::compute_checksums(&self.archive_path())?;

        Ok(render(&RecipeInputs {
            repository: &self.repository,
            manifest,
            license_md5: self.license_md5,
            checksums: &checksums,
        }))
    }

    /// Render and write `<name>_<version>.bb`.
    pub fn write_recipe(&self) -> Result<PathBuf> {
        output::sub_action("render");
        let text = self.render_recipe()?;
        let path = self.recipe_path();
        std::fs::write(&path, text).map_err(|e| RecipeError::io(&path, e))?;
        output::success(&format!("Recipe generated: {}", display_name(&path)));
        Ok(path)
    }

    /// Delete the archive and the extracted tree. Targets already gone are
    /// fine.
    pub fn cleanup(&self) -> Result<()> {
        output::sub_action("cleanup");
        remove_if_exists(&self.archive_path())?;
        let dir = self
            .source_dir
            .clone()
            .unwrap_or_else(|| self.folder_path());
        remove_if_exists(&dir)
    }

    /// Run every step and return the recipe path.
    pub fn generate(&mut self) -> Result<PathBuf> {
        output::action(&format!(
            "Generating recipe for {} {}",
            self.name, self.version
        ));

        self.download_archive()?;
        self.extract_archive()?;
        self.import_manifest()?;
        let recipe = self.write_recipe()?;

        if self.settings.keep_sources {
            output::info(&format!(
                "keeping {} and {}",
                self.archive_path().display(),
                self.folder_path().display()
            ));
        } else {
            self.cleanup()?;
        }

        Ok(recipe)
    }
}

/// Fields are written unescaped; a quote breaks the assignment.
fn warn_on_quotes(manifest: &PackageManifest) {
    let fields = [
        ("description", manifest.description.as_str()),
        ("author", manifest.author.as_str()),
        ("license", manifest.license.as_str()),
    ];
    for (field, value) in fields {
        if value.contains('"') {
            output::warning(&format!(
                "{} contains a double quote; the recipe will need hand editing",
                field
            ));
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(RecipeError::io(path, e)),
        _ => Ok(()),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
