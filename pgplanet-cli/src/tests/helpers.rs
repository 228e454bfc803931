//! Test helpers providing OSM inputs on disk.

use super::*;
use std::fs;
use tempfile::TempDir;

pub(super) const POINT_XML: &str = r#"<?xml version="1.0"?>
<osm version="0.3">
  <node id="1" lon="10" lat="20"><tag k="name" v="Foo"/></node>
  <node id="2" lon="10" lat="20"><tag k="name" v="Foo"/></node>
</osm>
"#;

/// Temporary directory holding one OSM input file.
pub(super) struct OsmWorkspace {
    dir: TempDir,
    input: Utf8PathBuf,
}

impl OsmWorkspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        let input = root.join("points.osm");
        fs::write(&input, POINT_XML).expect("write OSM input");
        Self { dir, input }
    }

    pub(super) fn input(&self) -> &Utf8Path {
        &self.input
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(name)).expect("utf-8 path")
    }
}

pub(super) fn config_for(input: &Utf8Path) -> ConvertConfig {
    ConvertConfig {
        input: input.to_path_buf(),
        options: ConversionOptions::default(),
        stats_json: None,
    }
}

pub(super) fn read_stats(path: &Utf8Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("read stats file");
    serde_json::from_str(&text).expect("stats should be JSON")
}
