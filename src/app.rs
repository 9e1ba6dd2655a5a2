//! The desktop frontend: one window, two forms. The ADT panel page
//! drives a `Session`; the metadata page drives a `MetadataSheet`. All
//! validation and CSV assembly lives in the library; this module only
//! renders state and routes clicks.

use crate::{
    error::ExportError,
    export::{self, Artifact, OutputFormat},
    marker_catalog::{CatalogEntry, CHEMISTRY_FORMATS},
    metadata::{MetadataSheet, METADATA_FIELDS},
    session::{Control, Session},
    CATALOGS,
};
use eframe::egui::{self, Ui};

const SPECIES_OPTIONS: [&str; 2] = ["Human", "Mouse"];
const SEARCH_RESULT_LIMIT: usize = 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Page {
    AdtPanel,
    MetadataSheet,
}

pub struct PanelgenApp {
    page: Page,
    session: Session,
    sheet: MetadataSheet,
    search: String,
    csv_name: String,
    invalid_rows: Vec<usize>,
    alert: Option<String>,
}

impl Default for PanelgenApp {
    fn default() -> Self {
        Self {
            page: Page::AdtPanel,
            session: Session::new(),
            sheet: MetadataSheet::default(),
            search: String::new(),
            csv_name: String::new(),
            invalid_rows: vec![],
            alert: None,
        }
    }
}

impl PanelgenApp {
    pub fn new() -> Self {
        Self::default()
    }

    fn render_top_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("panelgen");
            ui.separator();
            if ui
                .selectable_label(self.page == Page::AdtPanel, "ADT panel")
                .clicked()
            {
                self.page = Page::AdtPanel;
            }
            if ui
                .selectable_label(self.page == Page::MetadataSheet, "Metadata sheet")
                .clicked()
            {
                self.page = Page::MetadataSheet;
            }
        });
    }

    fn selector(
        ui: &mut Ui,
        label: &str,
        options: &[&str],
        current: Option<&str>,
        control: Control,
        picked: &mut Option<(Control, String)>,
    ) {
        egui::ComboBox::from_label(label)
            .selected_text(current.unwrap_or("select").to_string())
            .show_ui(ui, |ui| {
                for option in options {
                    if ui
                        .selectable_label(current == Some(*option), *option)
                        .clicked()
                    {
                        *picked = Some((control, option.to_string()));
                    }
                }
            });
    }

    fn render_adt_page(&mut self, ui: &mut Ui) {
        let mut picked: Option<(Control, String)> = None;
        ui.horizontal(|ui| {
            Self::selector(
                ui,
                "Species",
                &SPECIES_OPTIONS,
                self.session.species(),
                Control::Species,
                &mut picked,
            );
            Self::selector(
                ui,
                "Chemistry",
                &CHEMISTRY_FORMATS,
                self.session.chemistry(),
                Control::Chemistry,
                &mut picked,
            );
            let output_options: Vec<&str> =
                OutputFormat::ALL.iter().map(|f| f.as_str()).collect();
            Self::selector(
                ui,
                "Output format",
                &output_options,
                self.session.output_format(),
                Control::OutputFormat,
                &mut picked,
            );
        });
        if let Some((control, value)) = picked {
            if self.session.choice(control).value() != Some(value.as_str()) {
                // ConfirmationRequired leaves a pending change behind;
                // the confirm dialog resolves it.
                let _ = self.session.apply_change(control, &value, &CATALOGS);
            }
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Search markers:");
            ui.text_edit_singleline(&mut self.search);
        });
        let results: Vec<CatalogEntry> = self
            .session
            .search(&self.search)
            .into_iter()
            .take(SEARCH_RESULT_LIMIT)
            .cloned()
            .collect();
        let mut chosen: Option<CatalogEntry> = None;
        for entry in &results {
            let text = format!(
                "{}, clone {}, catalogue number {}",
                entry.marker, entry.clone, entry.catalogue_number
            );
            if ui.selectable_label(false, text).clicked() {
                chosen = Some(entry.clone());
            }
        }
        if let Some(entry) = chosen {
            self.session.panel.add_entry(&entry);
            self.search.clear();
        }

        ui.separator();
        let mut remove: Option<usize> = None;
        egui::ScrollArea::vertical()
            .id_salt("panel_rows_scroll")
            .max_height(320.0)
            .show(ui, |ui| {
                egui::Grid::new("panel_rows")
                    .striped(true)
                    .num_columns(8)
                    .show(ui, |ui| {
                        for header in [
                            "Marker",
                            "Name",
                            "TotalSeq ID",
                            "Catalogue #",
                            "Clone",
                            "Reactivity",
                            "Barcode",
                            "",
                        ] {
                            ui.strong(header);
                        }
                        ui.end_row();
                        for (index, row) in
                            self.session.panel.rows_mut().iter_mut().enumerate()
                        {
                            ui.label(row.marker.as_str());
                            ui.text_edit_singleline(&mut row.normalized_name);
                            ui.label(row.totalseq_id.as_str());
                            ui.label(row.catalogue_number.as_str());
                            ui.label(row.clone.as_str());
                            ui.label(row.reactivity.as_str());
                            ui.monospace(row.barcode.as_str());
                            if ui.button("Remove").clicked() {
                                remove = Some(index);
                            }
                            ui.end_row();
                        }
                    });
            });
        if let Some(index) = remove {
            self.session.panel.remove(index);
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("File name:");
            ui.text_edit_singleline(&mut self.csv_name);
            if ui.button("Generate CSV").clicked() {
                self.export_panel_clicked();
            }
        });
    }

    fn export_panel_clicked(&mut self) {
        let output_format = self
            .session
            .output_format()
            .and_then(|value| value.parse::<OutputFormat>().ok());
        let chemistry = self.session.chemistry().unwrap_or("").to_string();
        match export::export_panel(
            &self.session.panel,
            output_format,
            &chemistry,
            &self.csv_name,
        ) {
            Ok(artifact) => self.save_artifact(&artifact),
            Err(e) => self.alert = Some(e.to_string()),
        }
    }

    fn render_metadata_page(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if ui.button("Add row").clicked() {
                self.sheet.add_row();
                self.invalid_rows.clear();
            }
            if ui.button("Generate CSV").clicked() {
                self.export_metadata_clicked();
            }
        });

        ui.separator();
        let mut remove: Option<usize> = None;
        egui::ScrollArea::both()
            .id_salt("metadata_rows_scroll")
            .show(ui, |ui| {
                egui::Grid::new("metadata_rows").striped(true).show(ui, |ui| {
                    ui.strong("");
                    for field in METADATA_FIELDS {
                        ui.strong(field);
                    }
                    ui.strong("");
                    ui.end_row();
                    for (index, row) in self.sheet.rows_mut().iter_mut().enumerate() {
                        if self.invalid_rows.contains(&index) {
                            ui.colored_label(egui::Color32::RED, "!");
                        } else {
                            ui.label("");
                        }
                        ui.text_edit_singleline(&mut row.assay);
                        ui.text_edit_singleline(&mut row.experiment_id);
                        ui.text_edit_singleline(&mut row.historical_number);
                        ui.text_edit_singleline(&mut row.replicate);
                        ui.text_edit_singleline(&mut row.modality);
                        ui.text_edit_singleline(&mut row.chemistry);
                        ui.text_edit_singleline(&mut row.index_type);
                        ui.text_edit_singleline(&mut row.index);
                        ui.text_edit_singleline(&mut row.species);
                        ui.text_edit_singleline(&mut row.n_donors);
                        ui.text_edit_singleline(&mut row.adt_file);
                        if ui.button("Remove").clicked() {
                            remove = Some(index);
                        }
                        ui.end_row();
                    }
                });
            });
        if let Some(index) = remove {
            self.sheet.remove(index);
            self.invalid_rows.clear();
        }
    }

    fn export_metadata_clicked(&mut self) {
        match export::export_metadata(self.sheet.rows()) {
            Ok(artifact) => {
                self.invalid_rows.clear();
                self.save_artifact(&artifact);
            }
            Err(ExportError::InvalidRows(issues)) => {
                self.invalid_rows = issues.iter().map(|issue| issue.row).collect();
                self.alert =
                    Some("Please complete all fields before generating the CSV.".to_string());
            }
            Err(e) => self.alert = Some(e.to_string()),
        }
    }

    fn save_artifact(&mut self, artifact: &Artifact) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&artifact.filename)
            .save_file()
        else {
            return;
        };
        if let Err(e) = std::fs::write(&path, &artifact.contents) {
            tracing::error!("could not write {}: {e}", path.display());
            self.alert = Some(format!("Could not write {}: {e}", path.display()));
        }
    }

    fn render_confirm_dialog(&mut self, ctx: &egui::Context) {
        if self.session.pending().is_none() {
            return;
        }
        egui::Window::new("Confirm reset")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Changing this will reset all choices. Is this alright?");
                ui.horizontal(|ui| {
                    if ui.button("Reset").clicked() {
                        if let Some(control) = self.session.confirm_pending() {
                            if control != Control::OutputFormat {
                                self.session.refresh_catalog(&CATALOGS);
                            }
                        }
                    }
                    if ui.button("Keep my table").clicked() {
                        let _ = self.session.decline_pending();
                    }
                });
            });
    }

    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.alert = None;
                }
            });
    }
}

impl eframe::App for PanelgenApp {
    fn ui(&mut self, ui: &mut egui::Ui, _frame: &mut eframe::Frame) {
        let ctx = ui.ctx();
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            self.render_top_bar(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::AdtPanel => self.render_adt_page(ui),
            Page::MetadataSheet => self.render_metadata_page(ui),
        });
        self.render_confirm_dialog(ctx);
        self.render_alert(ctx);
    }
}
