use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};

use serde::{Deserialize, Serialize};
use rs_langid_core::{DetectionError, DetectorConfig, DirectorySource, Language, LanguageDetector};
use rs_langid_core::detector::config::models_directory;

const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Query parameters of the `/v1/detect` and `/v1/confidence` endpoints
#[derive(Deserialize)]
struct TextQuery {
	text: Option<String>
}

#[derive(Serialize)]
struct Detection {
	language: Option<Language>,
	iso_code: Option<&'static str>
}

#[derive(Serialize)]
struct Confidence {
	language: Language,
	confidence: f64
}

#[derive(Serialize)]
struct SupportedLanguage {
	language: Language,
	iso_code: &'static str
}

struct SharedData {
	detector: LanguageDetector
}

impl TextQuery {
	/// Returns the text to analyse, rejecting a missing parameter.
	fn text(&self) -> Result<&str, HttpResponse> {
		match &self.text {
			Some(text) => Ok(text),
			None => Err(HttpResponse::BadRequest().body("Missing 'text' parameter")),
		}
	}
}

impl Detection {
	fn new(language: Option<Language>) -> Self {
		Self { language, iso_code: language.map(|l| l.iso_code()) }
	}
}

/// Maps a detection error to a response: caller mistakes are 400, the rest 500.
fn error_response(error: DetectionError) -> HttpResponse {
	log::error!("Detection failed: {}", error);
	match error {
		DetectionError::UnsupportedLanguage(_) | DetectionError::InvalidConfig(_) | DetectionError::InvalidNgram(_) => {
			HttpResponse::BadRequest().body(error.to_string())
		}
		_ => HttpResponse::InternalServerError().body(error.to_string()),
	}
}

/// HTTP GET endpoint `/v1/detect`
///
/// Returns the most likely language of `text`, `null` when unknown.
#[get("/v1/detect")]
async fn get_detect(data: web::Data<SharedData>, query: web::Query<TextQuery>) -> impl Responder {
	let text = match query.text() {
		Ok(text) => text,
		Err(response) => return response,
	};

	match data.detector.detect_language_of(text) {
		Ok(language) => HttpResponse::Ok().json(Detection::new(language)),
		Err(e) => error_response(e),
	}
}

/// HTTP GET endpoint `/v1/confidence`
///
/// Returns every candidate language of `text` with its confidence, most likely first.
#[get("/v1/confidence")]
async fn get_confidence(data: web::Data<SharedData>, query: web::Query<TextQuery>) -> impl Responder {
	let text = match query.text() {
		Ok(text) => text,
		Err(response) => return response,
	};

	match data.detector.compute_language_confidence_values(text) {
		Ok(values) => {
			let values: Vec<Confidence> = values
				.iter()
				.map(|(language, confidence)| Confidence { language, confidence })
				.collect();
			HttpResponse::Ok().json(values)
		}
		Err(e) => error_response(e),
	}
}

/// HTTP POST endpoint `/v1/detect_batch`
///
/// Takes a JSON array of texts and returns one detection per text, in order.
#[post("/v1/detect_batch")]
async fn post_detect_batch(data: web::Data<SharedData>, texts: web::Json<Vec<String>>) -> impl Responder {
	match data.detector.detect_languages_of(texts.as_slice()) {
		Ok(languages) => {
			let detections: Vec<Detection> = languages.into_iter().map(Detection::new).collect();
			HttpResponse::Ok().json(detections)
		}
		Err(e) => error_response(e),
	}
}

#[get("/v1/languages")]
async fn get_languages(data: web::Data<SharedData>) -> impl Responder {
	let languages: Vec<SupportedLanguage> = data
		.detector
		.config()
		.languages()
		.iter()
		.map(|language| SupportedLanguage { language: *language, iso_code: language.iso_code() })
		.collect();
	HttpResponse::Ok().json(languages)
}

/// Builds the detector from the `LANGID_*` environment variables.
///
/// Without `LANGID_LANGUAGES`, every language found in the models
/// directory is configured.
fn build_detector() -> Result<LanguageDetector, DetectionError> {
	let mut config = DetectorConfig::from_env()?;
	let source = DirectorySource::new(models_directory(|name| env::var(name).ok()))?;

	if env::var("LANGID_LANGUAGES").is_err() {
		config.set_languages(source.available_languages()?);
	}
	log::info!("Serving models from {}", source.root().display());

	LanguageDetector::new(config, Arc::new(source))
}

/// Main entry point for the server.
///
/// Builds the detector once and shares it between workers. Detection
/// takes `&self`, so no lock is needed around it.
///
/// # Notes
/// - The server binds to `LANGID_BIND`, 127.0.0.1:5000 by default.
/// - Models are read from `LANGID_MODELS`, `./data` by default.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let detector = build_detector().map_err(|e| std::io::Error::other(e.to_string()))?;
	let shared_data = web::Data::new(SharedData { detector });
	let bind = env::var("LANGID_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());
	log::info!("Listening on {}", bind);

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::default().allow_any_origin().allowed_methods(vec!["GET", "POST"]).allow_any_header())
			.app_data(shared_data.clone())
			.service(get_detect)
			.service(get_confidence)
			.service(post_detect_batch)
			.service(get_languages)
	})
		.bind(bind)?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::test;
	use rs_langid_core::MemorySource;

	fn shared_data() -> web::Data<SharedData> {
		let source = MemorySource::new()
			.with_frequency(Language::English, "e", 0.1)
			.unwrap()
			.with_frequency(Language::German, "ß", 0.01)
			.unwrap();
		let detector = LanguageDetector::new(
			DetectorConfig::for_languages([Language::English, Language::German]),
			Arc::new(source),
		)
		.unwrap();
		web::Data::new(SharedData { detector })
	}

	#[actix_web::test]
	async fn detects_single_texts() {
		let app = test::init_service(App::new().app_data(shared_data()).service(get_detect)).await;

		let request = test::TestRequest::get().uri("/v1/detect?text=stra%C3%9Fe").to_request();
		let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
		assert_eq!(body["language"], "GERMAN");
		assert_eq!(body["iso_code"], "de");

		let request = test::TestRequest::get().uri("/v1/detect").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), 400);
	}

	#[actix_web::test]
	async fn detects_batches_in_order() {
		let app = test::init_service(App::new().app_data(shared_data()).service(post_detect_batch)).await;

		let request = test::TestRequest::post()
			.uri("/v1/detect_batch")
			.set_json(vec!["straße", "123", "the tree"])
			.to_request();
		let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
		assert_eq!(body[0]["language"], "GERMAN");
		assert!(body[1]["language"].is_null());
		assert_eq!(body[2]["language"], "ENGLISH");
	}

	#[actix_web::test]
	async fn lists_configured_languages() {
		let app = test::init_service(App::new().app_data(shared_data()).service(get_languages)).await;

		let request = test::TestRequest::get().uri("/v1/languages").to_request();
		let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
		assert_eq!(body.as_array().map(Vec::len), Some(2));
		assert_eq!(body[0]["iso_code"], "en");
	}
}
