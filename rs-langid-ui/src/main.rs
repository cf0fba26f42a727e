use std::env;
use std::time::Duration;

use eframe::{egui, Frame};
use egui::Context;

use reqwest::blocking::Client;
use reqwest::Result;
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

/// One entry of `/v1/detect`.
#[derive(Deserialize, Debug)]
struct Detection {
    language: Option<String>,
    iso_code: Option<String>,
}

/// One entry of `/v1/confidence`.
#[derive(Deserialize, Debug)]
struct Confidence {
    language: String,
    confidence: f64,
}

/// One entry of `/v1/languages`.
#[derive(Deserialize, Debug)]
struct SupportedLanguage {
    language: String,
    iso_code: String,
}

/// REST context holding a reusable blocking HTTP client.
struct RESTContext {
    client: Client,
    base_url: String,
}

impl RESTContext {
    /// Creates a new REST context with a timeout.
    ///
    /// The server address comes from `LANGID_SERVER`, `http://127.0.0.1:5000` by default.
    fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::new(5, 0))
            .build()?;
        let base_url = env::var("LANGID_SERVER").unwrap_or_else(|_| DEFAULT_SERVER.to_owned());
        Ok(Self { client, base_url })
    }

    /// Sends a GET request to `/v1/detect`.
    fn get_detect(&self, text: &str) -> Result<Detection> {
        self.client
            .get(format!("{}/v1/detect", self.base_url))
            .query(&[("text", text)])
            .send()?
            .error_for_status()?
            .json()
    }

    /// Sends a GET request to `/v1/confidence`.
    fn get_confidence(&self, text: &str) -> Result<Vec<Confidence>> {
        self.client
            .get(format!("{}/v1/confidence", self.base_url))
            .query(&[("text", text)])
            .send()?
            .error_for_status()?
            .json()
    }

    /// Sends a GET request to `/v1/languages`.
    fn get_languages(&self) -> Result<Vec<SupportedLanguage>> {
        self.client
            .get(format!("{}/v1/languages", self.base_url))
            .send()?
            .error_for_status()?
            .json()
    }
}

/// Global UI state (MUST persist between frames in egui).
struct DetectorUI {
    rest: RESTContext,
    text: String,
    status: Option<String>,
    confidences: Vec<Confidence>,
    languages: Vec<SupportedLanguage>,
    show_languages: bool,
}

impl DetectorUI {
    /// Initializes the UI and fetches the languages the server supports.
    fn new() -> Result<Self> {
        let mut detector = Self {
            rest: RESTContext::new()?,
            text: String::new(),
            status: None,
            confidences: Vec::new(),
            languages: Vec::new(),
            show_languages: false,
        };
        detector.get_languages();
        Ok(detector)
    }

    /// Performs the detection and confidence requests for the current text.
    fn detect(&mut self) {
        match self.rest.get_detect(&self.text) {
            Ok(Detection { language: Some(language), iso_code }) => {
                self.status = Some(format!("{} ({})", language, iso_code.unwrap_or_default()));
            }
            Ok(Detection { language: None, .. }) => self.status = Some("Unknown language".to_owned()),
            Err(e) => {
                self.status = Some(format!("Error: {e}"));
                self.confidences.clear();
                return;
            }
        }

        match self.rest.get_confidence(&self.text) {
            Ok(confidences) => self.confidences = confidences,
            Err(e) => self.status = Some(format!("Error: {e}")),
        }
    }

    /// Performs the get languages request.
    fn get_languages(&mut self) {
        match self.rest.get_languages() {
            Ok(languages) => self.languages = languages,
            Err(e) => self.status = Some(format!("Error: {e}")),
        }
    }
}

impl eframe::App for DetectorUI {
    /// UI update loop (called every frame).
    fn update(&mut self, ctx: &Context, _: &mut Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label("Text");
            ui.add(
                egui::TextEdit::multiline(&mut self.text)
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );

            ui.horizontal(|ui| {
                if ui
                    .add_sized([200.0, 40.0], egui::Button::new("Detect"))
                    .clicked()
                {
                    self.detect();
                }

                // Output
                match &self.status {
                    Some(status) => ui.label(status),
                    None => ui.label("Type some text and click Detect"),
                };
            });

            ui.separator();

            egui::Grid::new("confidence_grid")
                .num_columns(2)
                .spacing([20.0, 6.0])
                .striped(true)
                .show(ui, |ui| {
                    for entry in &self.confidences {
                        ui.label(&entry.language);
                        ui.add(egui::ProgressBar::new(entry.confidence as f32).text(format!("{:.4}", entry.confidence)));
                        ui.end_row();
                    }
                });

            ui.separator();

            ui.checkbox(&mut self.show_languages, format!("Supported languages ({})", self.languages.len()));
            if self.show_languages {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for language in &self.languages {
                        ui.label(format!("{} - {}", language.iso_code, language.language));
                    }
                });
            }
        });
    }
}

/// Application entry point.
fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 520.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "rs-langid",
        options,
        Box::new(|_| Ok(Box::new(DetectorUI::new()?))),
    )
}
