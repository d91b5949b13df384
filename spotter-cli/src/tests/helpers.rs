//! Fixtures shared by the CLI unit and behaviour tests.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Three spots around Trafalgar Square plus one in Paris, in import order.
pub(super) const LONDON_SPOTS_JSON: &str = r#"[
    {
        "id": "00000000-0000-0000-0000-000000000001",
        "name": "Fountain",
        "website": null,
        "coordinates": "POINT(-0.1281 51.50818)",
        "description": "Twenty metres north",
        "rating": 3.0
    },
    {
        "id": "00000000-0000-0000-0000-000000000002",
        "name": "Gallery",
        "website": "https://example.org/gallery",
        "coordinates": "POINT(-0.1281 51.50836)",
        "description": "Forty metres north",
        "rating": 4.5
    },
    {
        "id": "00000000-0000-0000-0000-000000000003",
        "name": "Theatre",
        "coordinates": "POINT(-0.1281 51.5125)",
        "rating": 5.0
    },
    {
        "id": "00000000-0000-0000-0000-000000000004",
        "name": "Louvre",
        "coordinates": "POINT(2.3522 48.8566)",
        "rating": 4.9
    }
]"#;

/// Centre used by searches over [`LONDON_SPOTS_JSON`].
pub(super) const TRAFALGAR: (f64, f64) = (51.5080, -0.1281);

/// UTF-8 view of a temporary directory's root.
pub(super) fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace")
}

pub(super) fn write_file(path: &Utf8Path, contents: &str) {
    fs::write(path, contents).expect("write fixture file");
}

pub(super) fn names_in_output(output: &[u8]) -> Vec<String> {
    let value: serde_json::Value = serde_json::from_slice(output).expect("output should be JSON");
    value
        .as_array()
        .expect("output should be a JSON array")
        .iter()
        .map(|spot| {
            spot.get("name")
                .and_then(serde_json::Value::as_str)
                .expect("each spot has a name")
                .to_owned()
        })
        .collect()
}
