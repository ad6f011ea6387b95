//! Icon sheet composer.
//!
//! Walks a root laid out as `<theme>/<variant>/<category>/*.svg` and writes
//! one `<theme>-<variant>.svg` preview sheet per variant next to the
//! template.

use crate::config::{ConfigError, SheetConfig};
use crate::layout::GridLayout;
use crate::sheet::{inject, render_icon, SheetError};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// One sheet to be generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetJob {
    pub theme: String,
    pub variant: String,
    /// Destination of the generated sheet.
    pub output: PathBuf,
    /// Icons in placement order.
    pub icons: Vec<IconEntry>,
}

/// An icon file found under a category directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    /// File name, used as the caption.
    pub name: String,
    /// Path relative to the sheet root.
    pub relative: PathBuf,
}

impl IconEntry {
    /// Reference to the icon as written into the sheet: `./` plus the
    /// relative path with `/` separators.
    pub fn href(&self) -> String {
        let parts: Vec<_> = self
            .relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect();
        format!("./{}", parts.join("/"))
    }
}

/// Result of a composer run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComposeReport {
    /// Sheets written, in traversal order.
    pub sheets: Vec<SheetReport>,
    /// `(theme, variant)` pairs without any configured category, or whose
    /// sheet would overwrite the template.
    pub skipped: Vec<(String, String)>,
}

/// A single written sheet.
#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub theme: String,
    pub variant: String,
    pub path: PathBuf,
    pub icons: usize,
    /// Hex SHA-256 of the written file.
    pub sha256: String,
}

/// Composes icon sheets under a root directory.
pub struct Composer {
    root: PathBuf,
    config: SheetConfig,
}

impl Composer {
    /// Create a composer for `root`, validating the sheet settings.
    pub fn new(root: impl Into<PathBuf>, config: SheetConfig) -> Result<Self, ComposeError> {
        config.validate()?;
        Ok(Self {
            root: root.into(),
            config,
        })
    }

    /// The directory sheets are read from and written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the template file.
    pub fn template_path(&self) -> PathBuf {
        self.root.join(&self.config.template_name)
    }

    /// Scan the tree and list the sheets that would be written.
    ///
    /// Variants without any configured category directory, or whose sheet
    /// would land on the template, are returned as skipped pairs.
    pub fn plan(&self) -> Result<(Vec<SheetJob>, Vec<(String, String)>), ComposeError> {
        let mut jobs = Vec::new();
        let mut skipped = Vec::new();

        let template_path = self.template_path();

        for theme in list_dirs(&self.root)? {
            let theme_label = theme.to_string_lossy().into_owned();
            if self.config.is_excluded(&theme) {
                debug!(theme = %theme_label, "Skipping excluded theme");
                continue;
            }
            let theme_dir = self.root.join(&theme);

            for variant in list_dirs(&theme_dir)? {
                let variant_label = variant.to_string_lossy().into_owned();
                let variant_dir = theme_dir.join(&variant);
                let Some(icons) = self.collect_icons(&theme, &variant, &variant_dir)? else {
                    debug!(
                        theme = %theme_label,
                        variant = %variant_label,
                        "No category folder, skipping"
                    );
                    skipped.push((theme_label.clone(), variant_label));
                    continue;
                };

                let output = self.root.join(sheet_file_name(&theme, &variant));
                if output == template_path {
                    warn!(
                        path = %output.display(),
                        "Sheet would overwrite the template, skipping"
                    );
                    skipped.push((theme_label.clone(), variant_label));
                    continue;
                }

                jobs.push(SheetJob {
                    theme: theme_label.clone(),
                    variant: variant_label,
                    output,
                    icons,
                });
            }
        }

        Ok((jobs, skipped))
    }

    /// Gather icons from the configured categories of one variant.
    ///
    /// Returns `None` when none of the categories exist.
    fn collect_icons(
        &self,
        theme: &OsStr,
        variant: &OsStr,
        variant_dir: &Path,
    ) -> Result<Option<Vec<IconEntry>>, ComposeError> {
        let mut found_category = false;
        let mut icons = Vec::new();

        for category in &self.config.categories {
            let category_dir = variant_dir.join(category);
            if !category_dir.is_dir() {
                continue;
            }
            found_category = true;

            for name in list_svg_files(&category_dir)? {
                let relative = PathBuf::from(theme).join(variant).join(category).join(&name);
                icons.push(IconEntry {
                    name: name.to_string_lossy().into_owned(),
                    relative,
                });
            }
        }

        Ok(found_category.then_some(icons))
    }

    /// Render the full sheet text for a job.
    pub fn render(&self, template: &str, job: &SheetJob) -> Result<String, ComposeError> {
        let layout = GridLayout::from_config(&self.config);
        let elements: String = job
            .icons
            .iter()
            .enumerate()
            .map(|(index, icon)| {
                render_icon(layout.cell(index), &icon.href(), &icon.name, &self.config)
            })
            .collect();
        Ok(inject(template, &elements, &self.config.injection)?)
    }

    /// Regenerate every sheet under the root.
    pub fn run(&self) -> Result<ComposeReport, ComposeError> {
        let template_path = self.template_path();
        let template =
            fs::read_to_string(&template_path).map_err(|e| ComposeError::io(&template_path, e))?;

        let (jobs, skipped) = self.plan()?;
        let mut report = ComposeReport {
            sheets: Vec::with_capacity(jobs.len()),
            skipped,
        };

        for job in &jobs {
            let content = self.render(&template, job)?;
            write_sheet(&job.output, &content)?;

            let sha256 = hex_digest(content.as_bytes());
            info!(
                theme = %job.theme,
                variant = %job.variant,
                icons = job.icons.len(),
                path = %job.output.display(),
                "Wrote icon sheet"
            );
            report.sheets.push(SheetReport {
                theme: job.theme.clone(),
                variant: job.variant.clone(),
                path: job.output.clone(),
                icons: job.icons.len(),
                sha256,
            });
        }

        Ok(report)
    }
}

/// Replace `path` with `content`, removing any previous file first.
fn write_sheet(path: &Path, content: &str) -> Result<(), ComposeError> {
    if path.is_file() {
        fs::remove_file(path).map_err(|e| ComposeError::io(path, e))?;
    }
    fs::write(path, content).map_err(|e| ComposeError::io(path, e))
}

/// `<theme>-<variant>.svg`, keeping the raw bytes of both names.
fn sheet_file_name(theme: &OsStr, variant: &OsStr) -> OsString {
    let mut name = OsString::from(theme);
    name.push("-");
    name.push(variant);
    name.push(".svg");
    name
}

/// Names of the subdirectories of `dir`, sorted.
fn list_dirs(dir: &Path) -> Result<Vec<OsString>, ComposeError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ComposeError::io(dir, e))? {
        let entry = entry.map_err(|e| ComposeError::io(dir, e))?;
        if entry.path().is_dir() {
            names.push(entry.file_name());
        }
    }
    names.sort();
    Ok(names)
}

/// Names of the `*.svg` files directly in `dir`, sorted.
fn list_svg_files(dir: &Path) -> Result<Vec<OsString>, ComposeError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ComposeError::io(dir, e))? {
        let entry = entry.map_err(|e| ComposeError::io(dir, e))?;
        let path = entry.path();
        let is_svg = path.extension().is_some_and(|ext| ext == "svg");
        if is_svg && path.is_file() {
            names.push(entry.file_name());
        }
    }
    names.sort();
    Ok(names)
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Errors that can occur while composing sheets.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ComposeError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
