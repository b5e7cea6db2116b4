//! Downloads and preprocesses an OSRM extract for the route tests.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Geofabrik extract path, e.g. "europe/monaco".
pub const REGION: &str = "europe/monaco";

#[derive(Debug, Clone)]
pub struct OsrmDataset {
    pub data_dir: PathBuf,
    pub osrm_file: String,
}

/// Makes sure `<data_root>/monaco` holds an MLD-ready foot graph.
pub fn ensure(data_root: &Path) -> Result<OsrmDataset, String> {
    let name = REGION.rsplit('/').next().unwrap_or("region");
    let data_dir = data_root.join(name);
    fs::create_dir_all(&data_dir).map_err(|e| e.to_string())?;

    let pbf = format!("{}-latest.osm.pbf", name);
    let osrm_file = format!("{}-latest.osrm", name);
    let pbf_path = data_dir.join(&pbf);

    if !pbf_path.exists() {
        let url = format!("https://download.geofabrik.de/{}-latest.osm.pbf", REGION);
        let bytes = reqwest::blocking::get(url)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|e| e.to_string())?;
        let tmp = pbf_path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp).map_err(|e| e.to_string())?);
        writer.write_all(&bytes).map_err(|e| e.to_string())?;
        writer.flush().map_err(|e| e.to_string())?;
        drop(writer);
        fs::rename(tmp, &pbf_path).map_err(|e| e.to_string())?;
    }

    if !data_dir.join(format!("{}.partition", osrm_file)).exists() {
        osrm_tool(&data_dir, &["osrm-extract", "-p", "/opt/foot.lua", &format!("/data/{}", pbf)])?;
        osrm_tool(&data_dir, &["osrm-partition", &format!("/data/{}", osrm_file)])?;
        osrm_tool(&data_dir, &["osrm-customize", &format!("/data/{}", osrm_file)])?;
    }

    Ok(OsrmDataset { data_dir, osrm_file })
}

fn osrm_tool(data_dir: &Path, args: &[&str]) -> Result<(), String> {
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg("osrm/osrm-backend")
        .args(args)
        .status()
        .map_err(|e| e.to_string())?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("{} exited with {}", args[0], status))
    }
}
