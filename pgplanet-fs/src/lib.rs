//! Input and output file helpers built on `cap-std` and `camino`.
//!
//! Inputs are opened either from standard input (`-`) or from a UTF-8 path;
//! paths ending in `.bz2` are decompressed on the fly.
#![forbid(unsafe_code)]

use std::io::{self, BufRead, BufReader};

use bzip2::read::MultiBzDecoder;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use log::debug;
use thiserror::Error;

/// Path argument that selects standard input.
pub const STDIN_MARKER: &str = "-";

/// Errors raised while opening inputs or creating outputs.
#[derive(Debug, Error)]
pub enum FsError {
    /// The input file could not be opened.
    #[error("unable to open {path}")]
    Open {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The output file could not be created.
    #[error("unable to create {path}")]
    Create {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Open a UTF-8 file path using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Whether `path` names a bzip2 stream, judged by a case-insensitive
/// `.bz2` extension.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use pgplanet_fs::is_bz2;
///
/// assert!(is_bz2(Utf8Path::new("planet.osm.BZ2")));
/// assert!(!is_bz2(Utf8Path::new("planet.osm")));
/// ```
#[must_use]
pub fn is_bz2(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bz2"))
}

/// Open the converter input.
///
/// `-` reads standard input; `.bz2` paths are decompressed, including
/// multi-stream archives such as parallel-compressed planet dumps.
///
/// # Errors
/// Returns [`FsError::Open`] when the file cannot be opened.
pub fn open_input(path: &Utf8Path) -> Result<Box<dyn BufRead>, FsError> {
    if path.as_str() == STDIN_MARKER {
        debug!("Reading OSM XML from standard input");
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = open_utf8_file(path).map_err(|source| FsError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if is_bz2(path) {
        debug!("Decompressing {path} as bzip2");
        Ok(Box::new(BufReader::new(MultiBzDecoder::new(BufReader::new(
            file,
        )))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Resolve the parent directory of `path` and return it with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create or truncate the file at `path` inside an existing directory.
///
/// # Errors
/// Returns [`FsError::Create`] when the directory is missing or the file
/// cannot be created.
pub fn create_output_file(path: &Utf8Path) -> Result<fs_utf8::File, FsError> {
    open_dir_and_file(path)
        .and_then(|(dir, name)| dir.create(name))
        .map_err(|source| FsError::Create {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::{Compression, write::BzEncoder};
    use rstest::{fixture, rstest};
    use std::io::{Read, Write};
    use tempfile::TempDir;

    const XML: &str = "<osm version=\"0.3\"></osm>\n";

    #[fixture]
    fn workspace() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        (dir, root)
    }

    fn read_all(mut input: Box<dyn BufRead>) -> String {
        let mut text = String::new();
        input.read_to_string(&mut text).expect("read input");
        text
    }

    #[rstest]
    #[case("dump.bz2", true)]
    #[case("dump.BZ2", true)]
    #[case("planet.osm.bz2", true)]
    #[case("planet.osm", false)]
    #[case("planetbz2", false)]
    #[case("-", false)]
    fn detects_bz2_extensions(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_bz2(Utf8Path::new(name)), expected, "is_bz2({name})");
    }

    #[rstest]
    fn opens_plain_files(workspace: (TempDir, Utf8PathBuf)) {
        let (_dir, root) = workspace;
        let path = root.join("plain.osm");
        std::fs::write(&path, XML).expect("write fixture");
        assert_eq!(read_all(open_input(&path).expect("open plain")), XML);
    }

    #[rstest]
    fn decompresses_concatenated_bz2_streams(workspace: (TempDir, Utf8PathBuf)) {
        let (_dir, root) = workspace;
        let path = root.join("planet.osm.bz2");
        let mut bytes = Vec::new();
        for part in ["<osm version=\"0.3\">", "</osm>\n"] {
            let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(part.as_bytes()).expect("compress");
            bytes.extend(encoder.finish().expect("finish stream"));
        }
        std::fs::write(&path, bytes).expect("write fixture");
        assert_eq!(read_all(open_input(&path).expect("open bz2")), XML);
    }

    #[rstest]
    fn missing_input_reports_its_path(workspace: (TempDir, Utf8PathBuf)) {
        let (_dir, root) = workspace;
        let path = root.join("missing.osm");
        match open_input(&path) {
            Err(FsError::Open { path: reported, .. }) => assert_eq!(reported, path),
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("expected an open error"),
        }
    }

    #[rstest]
    fn creates_output_files(workspace: (TempDir, Utf8PathBuf)) {
        let (_dir, root) = workspace;
        let path = root.join("stats.json");
        let mut file = create_output_file(&path).expect("create output");
        file.write_all(b"{}").expect("write output");
        drop(file);
        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "{}");
    }

    #[rstest]
    fn output_in_missing_directory_fails(workspace: (TempDir, Utf8PathBuf)) {
        let (_dir, root) = workspace;
        let path = root.join("absent").join("stats.json");
        assert!(matches!(
            create_output_file(&path),
            Err(FsError::Create { .. })
        ));
    }
}
