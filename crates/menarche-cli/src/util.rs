use anyhow::Result;
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

pub fn validate_tsv_or_csv_file(path: &str) -> Result<()> {
    if path.is_empty() {
        anyhow::bail!("No input data file given; set `data_path` in the config or pass --data");
    }
    let pb = PathBuf::from(path);

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

pub fn write_bytes_to_file<P: AsRef<Path>>(path: P, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path.as_ref())?;
    file.write_all(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_extension_and_missing_files() {
        assert!(validate_tsv_or_csv_file("").is_err());
        assert!(validate_tsv_or_csv_file("survey.xlsx").is_err());
        assert!(validate_tsv_or_csv_file("/nonexistent/survey.csv").is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.TSV");
        write_bytes_to_file(&path, b"a\tb\n").unwrap();
        assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_ok());
    }
}
