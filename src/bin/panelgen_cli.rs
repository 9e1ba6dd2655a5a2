use panelgen::{
    about,
    artifact::{ArtifactWriter, DirArtifactWriter},
    catalog_sync,
    error::ExportError,
    export::{self, OutputFormat},
    marker_catalog::DEFAULT_CATALOG_RESOURCE_DIR,
    metadata::MetadataRow,
    panel::Panel,
    CATALOGS,
};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, str::FromStr};
use tracing_subscriber::EnvFilter;

#[derive(Default, Deserialize)]
#[serde(default)]
struct PanelRequest {
    chemistry_format: String,
    species: String,
    output_format: String,
    file_name: String,
    markers: Vec<String>,
    rename: std::collections::HashMap<String, String>,
}

#[derive(Serialize)]
struct ExportSummary {
    filename: String,
    path: String,
    rows: usize,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  panelgen_cli --version\n  \
  panelgen_cli formats\n  \
  panelgen_cli markers FORMAT [SPECIES] [QUERY]\n  \
  panelgen_cli export-panel '<request-json>' [--out DIR]\n  \
  panelgen_cli export-metadata '<rows-json>' [--out DIR]\n  \
  panelgen_cli sync-catalog FORMAT URL [--out DIR]\n\n  \
  Tip: pass @file.json instead of inline JSON"
    );
}

fn load_json_arg(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Could not read JSON file '{path}': {e}"))
    } else {
        Ok(value.to_string())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn parse_out_dir(args: &[String], default: &str) -> String {
    args.windows(2)
        .find(|pair| pair[0] == "--out")
        .map(|pair| pair[1].clone())
        .unwrap_or_else(|| default.to_string())
}

fn export_error_text(e: ExportError) -> String {
    match e {
        ExportError::InvalidRows(issues) => {
            let detail = issues
                .iter()
                .map(|issue| {
                    format!("row {}: missing {}", issue.row + 1, issue.missing.join(", "))
                })
                .collect::<Vec<_>>()
                .join("; ");
            format!("Rows are incomplete: {detail}")
        }
        other => other.to_string(),
    }
}

fn write_and_summarize(
    artifact: &export::Artifact,
    out_dir: &str,
    rows: usize,
) -> Result<(), String> {
    let mut writer = DirArtifactWriter::new(out_dir);
    writer
        .write_artifact(artifact)
        .map_err(|e| e.to_string())?;
    print_json(&ExportSummary {
        filename: artifact.filename.clone(),
        path: writer.path_for(artifact).display().to_string(),
        rows,
    })
}

fn export_panel_command(args: &[String]) -> Result<(), String> {
    let payload = load_json_arg(args.get(2).ok_or("Missing panel request JSON")?)?;
    let request: PanelRequest =
        serde_json::from_str(&payload).map_err(|e| format!("Bad panel request: {e}"))?;

    let catalog = CATALOGS.get(&request.chemistry_format).ok_or_else(|| {
        format!("Unknown chemistry format '{}'", request.chemistry_format)
    })?;
    let filtered = catalog.species_subset(&request.species);

    let mut panel = Panel::default();
    for wanted in &request.markers {
        let entry = filtered
            .entries()
            .iter()
            .find(|e| e.marker == *wanted || e.catalogue_number == *wanted)
            .ok_or_else(|| {
                format!(
                    "Marker '{wanted}' is not in the {} catalog for species '{}'",
                    request.chemistry_format, request.species
                )
            })?;
        panel.add_entry(entry);
    }
    let markers: Vec<String> = panel.rows().iter().map(|row| row.marker.clone()).collect();
    for (index, marker) in markers.iter().enumerate() {
        if let Some(name) = request.rename.get(marker) {
            panel.set_normalized_name(index, name);
        }
    }

    let output_format = if request.output_format.is_empty() {
        None
    } else {
        Some(OutputFormat::from_str(&request.output_format).map_err(export_error_text)?)
    };
    let artifact = export::export_panel(
        &panel,
        output_format,
        &request.chemistry_format,
        &request.file_name,
    )
    .map_err(export_error_text)?;

    let out_dir = parse_out_dir(args, ".");
    write_and_summarize(&artifact, &out_dir, panel.len())
}

fn export_metadata_command(args: &[String]) -> Result<(), String> {
    let payload = load_json_arg(args.get(2).ok_or("Missing metadata rows JSON")?)?;
    let rows: Vec<MetadataRow> =
        serde_json::from_str(&payload).map_err(|e| format!("Bad metadata rows: {e}"))?;
    let artifact = export::export_metadata(&rows).map_err(export_error_text)?;
    let out_dir = parse_out_dir(args, ".");
    write_and_summarize(&artifact, &out_dir, rows.len())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let command = &args[1];
    match command.as_str() {
        "formats" => print_json(&CATALOGS.formats()),
        "markers" => {
            let format = args.get(2).ok_or("Missing FORMAT")?;
            let catalog = CATALOGS
                .get(format)
                .ok_or_else(|| format!("Unknown chemistry format '{format}'"))?;
            let species = args.get(3).cloned().unwrap_or_default();
            let filtered = catalog.species_subset(&species);
            match args.get(4) {
                Some(query) => {
                    let hits: Vec<_> = filtered.search(query).into_iter().cloned().collect();
                    print_json(&hits)
                }
                None => print_json(&filtered.entries().to_vec()),
            }
        }
        "export-panel" => export_panel_command(&args),
        "export-metadata" => export_metadata_command(&args),
        "sync-catalog" => {
            let format = args.get(2).ok_or("Missing FORMAT")?;
            let url = args.get(3).ok_or("Missing URL")?;
            let out_dir = parse_out_dir(&args, DEFAULT_CATALOG_RESOURCE_DIR);
            let report = catalog_sync::sync_catalog(format, url, Path::new(&out_dir))
                .map_err(|e| e.to_string())?;
            print_json(&report)
        }
        other => {
            usage();
            Err(format!("Unknown command '{other}'"))
        }
    }
}
