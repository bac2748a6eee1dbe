//! Reading option bags and cluster-info records from disk

use anyhow::{Context, Result};
use camino::Utf8Path;
use kedriver_core::{ClusterInfo, DriverOptions};
use serde::de::DeserializeOwned;
use std::fs;

/// Parse a JSON or YAML document; `.yaml`/`.yml` files are YAML, anything else JSON
pub fn read_document<T: DeserializeOwned>(path: &Utf8Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;

    match path.extension() {
        Some("yaml") | Some("yml") => serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {}", path)),
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path)),
    }
}

pub fn read_options(path: &Utf8Path) -> Result<DriverOptions> {
    read_document(path)
}

pub fn read_cluster_info(path: &Utf8Path) -> Result<ClusterInfo> {
    read_document(path)
}

/// Write a record as pretty JSON to `path`, or to stdout when no path is given
pub fn write_cluster_info(info: &ClusterInfo, path: Option<&Utf8Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(info)?;
    match path {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path))?;
            tracing::debug!("Wrote cluster info to {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use kedriver_core::OptionKey;
    use tempfile::TempDir;

    fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_read_yaml_options() {
        let dir = TempDir::new().unwrap();
        let path = utf8_dir(&dir).join("options.yaml");
        fs::write(
            &path,
            "name: c1\nproject-id: p1\nnode-count: 3\nenable-http-load-balancing: false\nlocations:\n  - z1\n  - z2\n",
        )
        .unwrap();

        let options = read_options(&path).unwrap();
        assert_eq!(options.string(OptionKey::new(&["name"])), "c1");
        assert_eq!(options.int(OptionKey::new(&["node-count"])), 3);
        assert_eq!(
            options.strings(OptionKey::new(&["locations"])),
            vec!["z1", "z2"]
        );
    }

    #[test]
    fn test_read_json_options() {
        let dir = TempDir::new().unwrap();
        let path = utf8_dir(&dir).join("options.json");
        fs::write(&path, r#"{"projectId": "p1", "nodeCount": 2}"#).unwrap();

        let options = read_options(&path).unwrap();
        assert_eq!(
            options.string(OptionKey::new(&["project-id", "projectId"])),
            "p1"
        );
    }

    #[test]
    fn test_cluster_info_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = utf8_dir(&dir).join("cluster.json");
        let mut info = ClusterInfo::new();
        info.endpoint = "35.1.2.3".into();
        info.set_metadata("zone", "z1");

        write_cluster_info(&info, Some(&path)).unwrap();
        assert_eq!(read_cluster_info(&path).unwrap(), info);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = utf8_dir(&dir).join("absent.json");

        let err = read_cluster_info(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
