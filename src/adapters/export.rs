use crate::domain::model::Service;
use crate::utils::error::{Result, SocProofError};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = SocProofError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            other => Err(SocProofError::invalid_argument(
                "format",
                other,
                "Supported formats: csv, tsv, json",
            )),
        }
    }
}

/// Writes `services` with a header row (CSV/TSV) or as a pretty JSON array.
pub fn write_services<W: Write>(writer: W, services: &[Service], format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(writer, services)?;
        }
        ExportFormat::Csv | ExportFormat::Tsv => {
            let delimiter = if format == ExportFormat::Tsv { b'\t' } else { b',' };
            let mut out = csv::WriterBuilder::new().delimiter(delimiter).from_writer(writer);
            for service in services {
                out.serialize(service)?;
            }
            out.flush()?;
        }
    }
    Ok(())
}

pub fn export_services<P: AsRef<Path>>(path: P, services: &[Service], format: ExportFormat) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    write_services(file, services, format)?;
    tracing::info!(path = %path.display(), count = services.len(), "exported services");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn services() -> Vec<Service> {
        vec![
            Service {
                service: 1,
                name: "Followers, HQ".to_string(),
                service_type: "Default".to_string(),
                rate: 0.9,
                min: 10,
                max: 1000,
                refill: true,
                cancel: false,
                category: "Instagram".to_string(),
                description: "Real accounts".to_string(),
                time: "1 hour".to_string(),
            },
            Service {
                service: 2,
                name: "Views".to_string(),
                service_type: "Default".to_string(),
                rate: 0.05,
                min: 100,
                max: 100000,
                refill: false,
                cancel: true,
                category: "YouTube".to_string(),
                description: String::new(),
                time: String::new(),
            },
        ]
    }

    #[test]
    fn test_csv_has_header_and_quotes_commas() {
        let mut buf = Vec::new();
        write_services(&mut buf, &services(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "service,name,type,rate,min,max,refill,cancel,category,description,time"
        );
        assert_eq!(
            lines[1],
            "1,\"Followers, HQ\",Default,0.9,10,1000,true,false,Instagram,Real accounts,1 hour"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_tsv_uses_tabs() {
        let mut buf = Vec::new();
        write_services(&mut buf, &services(), ExportFormat::Tsv).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.lines().next().unwrap().starts_with("service\tname\ttype"));
        assert!(text.contains("2\tViews\tDefault"));
    }

    #[test]
    fn test_export_json_to_nested_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("services.json");

        export_services(&path, &services(), ExportFormat::Json).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Service> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, services());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("TSV".parse::<ExportFormat>().unwrap(), ExportFormat::Tsv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
