use std::env;
use std::sync::Arc;

use rs_langid_core::detector::config::models_directory;
use rs_langid_core::ModelSource;
use rs_langid_core::{DetectorConfig, DirectorySource, Language, LanguageDetector, MemorySource, Ngram};

/// A tiny in-memory model set, used when no trained models are on disk.
fn demo_source() -> Result<MemorySource, Box<dyn std::error::Error>> {
    let mut source = MemorySource::new();
    let tables: [(Language, &[(&str, f64)]); 5] = [
        (Language::English, &[("t", 0.09), ("h", 0.06), ("e", 0.12), ("th", 0.03), ("he", 0.03), ("the", 0.02)]),
        (Language::German, &[("e", 0.16), ("n", 0.1), ("i", 0.08), ("ei", 0.02), ("en", 0.04), ("ein", 0.01)]),
        (Language::French, &[("e", 0.15), ("l", 0.05), ("u", 0.06), ("le", 0.02), ("ou", 0.01), ("les", 0.01)]),
        (Language::Korean, &[("이", 0.03)]),
        (Language::Greek, &[("α", 0.1)]),
    ];
    for (language, frequencies) in tables {
        for (ngram, frequency) in frequencies {
            source = source.with_frequency(language, ngram, *frequency)?;
        }
    }
    Ok(source)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Trained models are read from LANGID_MODELS (or ./data) when present,
    // otherwise the small demo tables above are used
    let directory = models_directory(|name| env::var(name).ok());
    let (source, languages): (Arc<dyn ModelSource>, Vec<Language>) = match DirectorySource::new(&directory) {
        Ok(source) => {
            let languages = source.available_languages()?;
            println!("Using {} trained languages from {}", languages.len(), directory.display());
            (Arc::new(source) as Arc<dyn ModelSource>, languages)
        }
        Err(_) => {
            println!("No models in {}, using demo tables", directory.display());
            (
                Arc::new(demo_source()?) as Arc<dyn ModelSource>,
                vec![Language::English, Language::French, Language::German, Language::Korean, Language::Greek],
            )
        }
    };

    // Every setting can also come from LANGID_* environment variables
    let mut config = DetectorConfig::for_languages(languages);

    // Texts with fewer letters are reported as unknown
    config.set_minimum_text_length(2)?;

    // Require some distance between the two best languages
    config.set_minimum_relative_distance(0.05)?;

    // Invalid values are rejected
    match config.set_minimum_relative_distance(2.0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    // Korean and Greek need no statistics: their alphabets settle them
    let detector = LanguageDetector::new(config, source)?;

    let texts = ["the weather is nice", "ein kleines Haus", "le chat est sur la table", "안녕하세요", "καλημέρα", "12:45 -- 99%", "Straße"];
    for text in texts {
        match detector.detect_language_of(text)? {
            Some(language) => println!("{:>28} -> {} ({})", text, language, language.iso_code()),
            None => println!("{:>28} -> unknown", text),
        }
    }

    // Ranked confidence values
    for (language, confidence) in detector.compute_language_confidence_values("the house")?.iter() {
        println!("{}: {:.4}", language, confidence);
    }

    // Batches keep their order
    let batch = detector.detect_languages_of(&texts)?;
    println!("Batch: {:?}", batch);

    // Raw model lookups
    if detector.config().languages().contains(&Language::English) {
        let ngram = Ngram::new("th")?;
        println!("P(th | English) = {:?}", detector.look_up_ngram_probability(Language::English, &ngram)?);
    }

    Ok(())
}
