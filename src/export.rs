//! Map Export
//!
//! Renders the ISIN -> ticker map as a TypeScript module (consumed by the
//! broker CSV reader) or as plain JSON.

use crate::listing::IsinTickerMap;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize map: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output artifact format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// TypeScript module exporting a `Map`
    #[default]
    #[serde(alias = "ts")]
    #[value(name = "typescript", alias = "ts")]
    TypeScript,
    /// Plain JSON object
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Json => "json",
        }
    }

    /// Guess the format from a file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ts" | "js" | "mjs" => Some(Self::TypeScript),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a TypeScript module exporting a `Map<string, string>`
pub fn render_typescript(map: &IsinTickerMap, var_name: &str) -> Result<String, ExportError> {
    let mut lines = Vec::with_capacity(map.len());
    for (isin, ticker) in map.iter() {
        lines.push(format!(
            "    [{}, {}]",
            serde_json::to_string(isin)?,
            serde_json::to_string(ticker)?
        ));
    }

    let mut out = format!("const {} = new Map([\n", var_name);
    if !lines.is_empty() {
        out.push_str(&lines.join(",\n"));
        out.push('\n');
    }
    out.push_str("]);\n");
    out.push_str(&format!("export default {};\n", var_name));
    Ok(out)
}

/// Render a pretty-printed JSON object sorted by ISIN
pub fn render_json(map: &IsinTickerMap) -> Result<String, ExportError> {
    let mut out = serde_json::to_string_pretty(map)?;
    out.push('\n');
    Ok(out)
}

pub fn render(
    map: &IsinTickerMap,
    format: OutputFormat,
    var_name: &str,
) -> Result<String, ExportError> {
    match format {
        OutputFormat::TypeScript => render_typescript(map, var_name),
        OutputFormat::Json => render_json(map),
    }
}

/// Render and write the map, creating parent directories as needed
pub fn write_output(
    path: &Path,
    map: &IsinTickerMap,
    format: OutputFormat,
    var_name: &str,
) -> Result<(), ExportError> {
    let content = render(map, format, var_name)?;
    let io_err = |source: std::io::Error| ExportError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, content).map_err(io_err)?;

    log::info!(
        "Export: wrote {} entries as {} to {}",
        map.len(),
        format.as_str(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SecurityRecord;

    fn sample_map() -> IsinTickerMap {
        IsinTickerMap::from_records(vec![
            SecurityRecord::new("GB0002634946", "BARC.L"),
            SecurityRecord::new("DE0001234565", "SAP.DE"),
        ])
    }

    #[test]
    fn test_render_typescript() {
        let ts = render_typescript(&sample_map(), "isin_to_ticker").unwrap();
        let expected = r#"const isin_to_ticker = new Map([
    ["DE0001234565", "SAP.DE"],
    ["GB0002634946", "BARC.L"]
]);
export default isin_to_ticker;
"#;
        assert_eq!(ts, expected);
    }

    #[test]
    fn test_render_typescript_empty_map() {
        let ts = render_typescript(&IsinTickerMap::new(), "m").unwrap();
        assert_eq!(ts, "const m = new Map([\n]);\nexport default m;\n");
    }

    #[test]
    fn test_render_typescript_escapes_strings() {
        let map = IsinTickerMap::from_records(vec![SecurityRecord::new("DE0001234565", "A\"B")]);
        let ts = render_typescript(&map, "m").unwrap();
        assert!(ts.contains(r#"["DE0001234565", "A\"B"]"#));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&sample_map()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["DE0001234565"], "SAP.DE");
        assert!(json.find("DE0001234565").unwrap() < json.find("GB0002634946").unwrap());
    }

    #[test]
    fn test_format_parsing() {
        let parse = |s: &str| <OutputFormat as ValueEnum>::from_str(s, true);
        assert_eq!(parse("ts").unwrap(), OutputFormat::TypeScript);
        assert_eq!(parse("typescript").unwrap(), OutputFormat::TypeScript);
        assert_eq!(parse("JSON").unwrap(), OutputFormat::Json);
        assert!(parse("yaml").is_err());
        assert_eq!(
            OutputFormat::from_extension(Path::new("out/map.json")),
            Some(OutputFormat::Json)
        );
        assert_eq!(OutputFormat::from_extension(Path::new("map")), None);
    }

    #[test]
    fn test_write_output_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("isin_to_ticker.ts");

        write_output(&path, &sample_map(), OutputFormat::TypeScript, "isin_to_ticker").unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("const isin_to_ticker = new Map(["));
    }
}
