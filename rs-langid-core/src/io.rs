use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use tempfile::NamedTempFile;

use crate::language::Language;
use crate::model::ngram::NgramOrder;

/// Reads a whole text file into memory.
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `cache/en/trigrams.json` + `"bin"` → `cache/en/trigrams.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder<P: AsRef<Path>>(input: P) -> PathBuf {
	let input = input.as_ref();
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Location of a trained model file: `<root>/<iso code>/<order>.json`.
pub(crate) fn model_path<P: AsRef<Path>>(root: P, language: Language, order: NgramOrder) -> PathBuf {
	root.as_ref().join(language.iso_code()).join(order.file_name())
}

/// Location of a cached binary model: `<root>/<iso code>/<order>.bin`.
pub(crate) fn cache_path<P: AsRef<Path>>(root: P, language: Language, order: NgramOrder) -> io::Result<PathBuf> {
	build_output_path(model_path(root, language, order), "bin")
}

/// Lists the names of all subdirectories of `dir`.
pub(crate) fn list_dirs<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
	let mut dirs = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_dir() {
			if let Some(name) = path.file_name() {
				dirs.push(name.to_string_lossy().to_string());
			}
		}
	}

	dirs.sort();
	Ok(dirs)
}

/// Writes `bytes` to `path` so readers never observe a partial file.
///
/// The data goes to a temporary file in the same directory, which is then
/// renamed over `path`. Missing parent directories are created.
pub(crate) fn write_atomically<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
	let path = path.as_ref();
	let parent = path.parent().unwrap_or_else(|| Path::new("."));
	fs::create_dir_all(parent)?;

	let mut file = NamedTempFile::new_in(parent)?;
	file.write_all(bytes)?;
	file.flush()?;
	file.persist(path).map_err(|error| error.error)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builds_model_and_cache_paths() {
		let path = model_path("data", Language::German, NgramOrder::Trigram);
		assert_eq!(path, Path::new("data").join("de").join("trigrams.json"));

		let path = cache_path("cache", Language::English, NgramOrder::Fivegram).unwrap();
		assert_eq!(path, Path::new("cache").join("en").join("fivegrams.bin"));
	}

	#[test]
	fn atomic_write_creates_parents_and_replaces() {
		let dir = tempfile::tempdir().unwrap();
		let target = dir.path().join("nested").join("model.bin");

		write_atomically(&target, b"first").unwrap();
		write_atomically(&target, b"second").unwrap();
		assert_eq!(fs::read(&target).unwrap(), b"second");
	}

	#[test]
	fn lists_only_directories() {
		let dir = tempfile::tempdir().unwrap();
		fs::create_dir(dir.path().join("en")).unwrap();
		fs::create_dir(dir.path().join("de")).unwrap();
		fs::write(dir.path().join("notes.txt"), "x").unwrap();

		assert_eq!(list_dirs(dir.path()).unwrap(), vec!["de", "en"]);
	}
}
