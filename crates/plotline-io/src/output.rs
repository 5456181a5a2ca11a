//! All-or-nothing writing of the interchange and preview files.
//!
//! Both documents are written to hidden temporary siblings first and then
//! renamed into place. If anything fails, the temporaries and any file
//! this call already renamed are removed, so a failed request leaves
//! neither output behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ConvertError;

/// Where a conversion writes its two output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Interchange stroke list.
    pub json: PathBuf,
    /// SVG preview.
    pub svg: PathBuf,
}

impl OutputPaths {
    /// `<output_dir>/<stem>.json` and `<output_dir>/<stem>.svg`.
    #[must_use]
    pub fn new(output_dir: &Path, stem: &str) -> Self {
        Self {
            json: output_dir.join(format!("{stem}.json")),
            svg: output_dir.join(format!("{stem}.svg")),
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.tmp"))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConvertError + '_ {
    move |source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn remove_quietly(path: &Path) {
    if let Err(err) = fs::remove_file(path)
        && err.kind() != std::io::ErrorKind::NotFound
    {
        log::warn!("failed to clean up {}: {err}", path.display());
    }
}

/// Write both documents, creating their parent directories if missing.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] naming the first path that could not be
/// created, written, or renamed. On error neither output file exists.
pub fn write_outputs(paths: &OutputPaths, json: &str, svg: &str) -> Result<(), ConvertError> {
    for parent in [paths.json.parent(), paths.svg.parent()]
        .into_iter()
        .flatten()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let json_tmp = temp_path(&paths.json);
    let svg_tmp = temp_path(&paths.svg);

    let staged = fs::write(&json_tmp, json)
        .map_err(io_error(&json_tmp))
        .and_then(|()| fs::write(&svg_tmp, svg).map_err(io_error(&svg_tmp)));
    if let Err(err) = staged {
        remove_quietly(&json_tmp);
        remove_quietly(&svg_tmp);
        return Err(err);
    }

    if let Err(err) = fs::rename(&json_tmp, &paths.json).map_err(io_error(&paths.json)) {
        remove_quietly(&json_tmp);
        remove_quietly(&svg_tmp);
        return Err(err);
    }
    if let Err(err) = fs::rename(&svg_tmp, &paths.svg).map_err(io_error(&paths.svg)) {
        remove_quietly(&svg_tmp);
        remove_quietly(&paths.json);
        return Err(err);
    }

    log::debug!(
        "wrote {} and {}",
        paths.json.display(),
        paths.svg.display()
    );
    Ok(())
}
