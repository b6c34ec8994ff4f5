//! Netlist document loading.

use crate::error::IoError;
use pnr_core::raw::RawNetlist;
use std::path::Path;

/// Reads and parses a netlist document from `path` (§6's input document format).
pub fn load_netlist(path: &Path) -> Result<RawNetlist, IoError> {
    let content = std::fs::read_to_string(path)?;
    load_netlist_from_str(&content)
}

/// Parses a netlist document from an in-memory string. Useful for testing
/// without filesystem dependencies.
pub fn load_netlist_from_str(content: &str) -> Result<RawNetlist, IoError> {
    let netlist: RawNetlist = serde_json::from_str(content)?;
    Ok(netlist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_minimal_document() {
        let json = r#"
        {
            "inverter": {
                "ports": {
                    "A": {"type": "input", "out": ["m0"]},
                    "Y": {"type": "output", "in": ["m0"]}
                },
                "mosfets": {
                    "m0": {"type": "nmos", "drain": "Y", "source": "A", "gate": "A"}
                }
            }
        }
        "#;
        let netlist = load_netlist_from_str(json).unwrap();
        assert!(netlist.modules.contains_key("inverter"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = load_netlist_from_str("{not valid json").unwrap_err();
        assert!(matches!(err, IoError::Parse(_)));
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"top": {{"ports": {{}}}}}}"#).unwrap();
        let netlist = load_netlist(file.path()).unwrap();
        assert!(netlist.modules.contains_key("top"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_netlist(Path::new("/nonexistent/path/netlist.json")).unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
