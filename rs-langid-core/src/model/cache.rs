use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;
use crate::io;
use crate::language::Language;
use crate::model::language_model::LanguageModel;
use crate::model::ngram::NgramOrder;
use crate::model::source::ModelSource;

/// Identifies one model: a language and an n-gram order.
pub type ModelKey = (Language, NgramOrder);

/// Keeps loaded models around between lookups.
///
/// # Invariants
/// - At most one load runs per key at a time; concurrent callers wait for it
/// - A failed load stores nothing, so the next call tries again
/// - Every backend returns the same model for the same key
pub trait ModelCache: Send + Sync {
	/// Returns the cached model for `key`, loading it from `source` on a miss.
	fn get_or_load(&self, key: ModelKey, source: &dyn ModelSource) -> Result<Arc<LanguageModel>, DetectionError>;

	/// Number of models currently held in memory.
	fn resident_models(&self) -> usize;
}

type Slot = Arc<Mutex<Option<Arc<LanguageModel>>>>;

/// Per-key mutexes guarding loads.
#[derive(Default)]
struct Slots {
	slots: RwLock<HashMap<ModelKey, Slot>>,
}

impl Slots {
	fn get(&self, key: ModelKey) -> Result<Slot, DetectionError> {
		{
			let slots = self.slots.read().map_err(|_| DetectionError::LockPoisoned("model slots"))?;
			if let Some(slot) = slots.get(&key) {
				return Ok(slot.clone());
			}
		}
		let mut slots = self.slots.write().map_err(|_| DetectionError::LockPoisoned("model slots"))?;
		Ok(slots.entry(key).or_default().clone())
	}
}

/// Keeps every loaded model in memory for the cache's lifetime.
#[derive(Default)]
pub struct InMemoryCache {
	slots: Slots,
}

impl InMemoryCache {
	pub fn new() -> Self {
		Self::default()
	}
}

impl ModelCache for InMemoryCache {
	fn get_or_load(&self, key: ModelKey, source: &dyn ModelSource) -> Result<Arc<LanguageModel>, DetectionError> {
		let slot = self.slots.get(key)?;
		let mut guard = slot.lock().map_err(|_| DetectionError::LockPoisoned("model slot"))?;
		if let Some(model) = guard.as_ref() {
			return Ok(model.clone());
		}

		let model = Arc::new(source.load(key.0, key.1)?);
		log::info!("Loaded {:?} model for {} ({} n-grams)", key.1, key.0, model.len());
		*guard = Some(model.clone());
		Ok(model)
	}

	fn resident_models(&self) -> usize {
		self.slots
			.slots
			.read()
			.map(|slots| {
				slots
					.values()
					.filter(|slot| slot.lock().map(|guard| guard.is_some()).unwrap_or(false))
					.count()
			})
			.unwrap_or(0)
	}
}

/// Least recently used models kept in memory by [`DiskCache`].
#[derive(Default)]
struct Resident {
	models: HashMap<ModelKey, Arc<LanguageModel>>,
	recency: VecDeque<ModelKey>,
}

impl Resident {
	fn get(&mut self, key: ModelKey) -> Option<Arc<LanguageModel>> {
		let model = self.models.get(&key)?.clone();
		self.touch(key);
		Some(model)
	}

	fn insert(&mut self, key: ModelKey, model: Arc<LanguageModel>, capacity: usize) {
		self.models.insert(key, model);
		self.touch(key);
		while self.models.len() > capacity {
			match self.recency.pop_front() {
				Some(oldest) => {
					self.models.remove(&oldest);
					log::debug!("Evicted {:?} model for {}", oldest.1, oldest.0);
				}
				None => break,
			}
		}
	}

	fn touch(&mut self, key: ModelKey) {
		self.recency.retain(|held| *held != key);
		self.recency.push_back(key);
	}
}

/// Contents of a cache file: a model and the fingerprint of the data it was built from.
#[derive(Serialize, Deserialize)]
struct CacheEntry {
	fingerprint: String,
	model: LanguageModel,
}

/// Serializes models to a cache directory and bounds how many stay in memory.
///
/// Each model is stored with `postcard` under `<dir>/<iso code>/<order>.bin`
/// together with the source fingerprint it was built from. On a miss the
/// cache file is used if its fingerprint matches the source, otherwise the
/// model is loaded from the source and the file is rewritten. Stale and
/// corrupt files are therefore rebuilt, and a directory shared by several
/// sources never serves one source's data to another.
///
/// # Invariants
/// - At most `max_resident` models are held in memory
/// - Cache files are replaced atomically
/// - A cached model is only used when the source still fingerprints the same
pub struct DiskCache {
	dir: PathBuf,
	max_resident: usize,
	slots: Slots,
	resident: Mutex<Resident>,
}

impl DiskCache {
	/// Creates a disk cache rooted at `dir`.
	///
	/// # Errors
	/// Returns `Cache` if `max_resident` is zero or `dir` cannot be created.
	pub fn new<P: AsRef<Path>>(dir: P, max_resident: usize) -> Result<Self, DetectionError> {
		if max_resident == 0 {
			return Err(DetectionError::Cache("at least one model must stay resident".to_owned()));
		}
		let dir = io::normalize_folder(dir);
		fs::create_dir_all(&dir)
			.map_err(|error| DetectionError::Cache(format!("cannot create {}: {}", dir.display(), error)))?;

		Ok(Self { dir, max_resident, slots: Slots::default(), resident: Mutex::new(Resident::default()) })
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn lock_resident(&self) -> Result<std::sync::MutexGuard<'_, Resident>, DetectionError> {
		self.resident.lock().map_err(|_| DetectionError::LockPoisoned("resident models"))
	}

	/// Reads a cache file, returning `None` if it is missing, unusable or stale.
	fn read_cached(&self, key: ModelKey, fingerprint: &str, path: &Path) -> Option<LanguageModel> {
		let bytes = fs::read(path).ok()?;
		match postcard::from_bytes::<CacheEntry>(&bytes) {
			Ok(entry) if entry.model.language() != key.0 || entry.model.order() != key.1 => {
				log::warn!("Cache file {} holds another model, rebuilding", path.display());
				None
			}
			Ok(entry) if entry.fingerprint != fingerprint => {
				log::info!("Cache file {} is out of date, rebuilding", path.display());
				None
			}
			Ok(entry) => Some(entry.model),
			Err(error) => {
				log::warn!("Corrupt cache file {} ({}), rebuilding", path.display(), error);
				None
			}
		}
	}

	fn write_cached(&self, entry: &CacheEntry, path: &Path) -> Result<(), DetectionError> {
		let bytes = postcard::to_stdvec(entry)?;
		io::write_atomically(path, &bytes)
			.map_err(|error| DetectionError::Cache(format!("cannot write {}: {}", path.display(), error)))?;
		log::info!("Cached {:?} model for {} in {}", entry.model.order(), entry.model.language(), path.display());
		Ok(())
	}
}

impl ModelCache for DiskCache {
	fn get_or_load(&self, key: ModelKey, source: &dyn ModelSource) -> Result<Arc<LanguageModel>, DetectionError> {
		if let Some(model) = self.lock_resident()?.get(key) {
			return Ok(model);
		}

		let slot = self.slots.get(key)?;
		let _loading = slot.lock().map_err(|_| DetectionError::LockPoisoned("model slot"))?;

		// Another caller may have finished the load while we waited.
		if let Some(model) = self.lock_resident()?.get(key) {
			return Ok(model);
		}

		let path = io::cache_path(&self.dir, key.0, key.1)?;
		let fingerprint = source.fingerprint(key.0, key.1)?;
		let model = match self.read_cached(key, &fingerprint, &path) {
			Some(model) => model,
			None => {
				let entry = CacheEntry { fingerprint, model: source.load(key.0, key.1)? };
				self.write_cached(&entry, &path)?;
				entry.model
			}
		};

		let model = Arc::new(model);
		self.lock_resident()?.insert(key, model.clone(), self.max_resident);
		Ok(model)
	}

	fn resident_models(&self) -> usize {
		self.resident.lock().map(|resident| resident.models.len()).unwrap_or(0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::source::MemorySource;
	use std::sync::atomic::{AtomicUsize, Ordering};

	/// Counts the loads it forwards to an in-memory source.
	struct Counting {
		inner: MemorySource,
		loads: AtomicUsize,
	}

	impl Counting {
		fn new(inner: MemorySource) -> Self {
			Self { inner, loads: AtomicUsize::new(0) }
		}

		fn loads(&self) -> usize {
			self.loads.load(Ordering::SeqCst)
		}
	}

	impl ModelSource for Counting {
		fn load(&self, language: Language, order: NgramOrder) -> Result<LanguageModel, DetectionError> {
			self.loads.fetch_add(1, Ordering::SeqCst);
			self.inner.load(language, order)
		}

		fn is_available(&self, language: Language) -> bool {
			self.inner.is_available(language)
		}

		fn fingerprint(&self, language: Language, order: NgramOrder) -> Result<String, DetectionError> {
			self.inner.fingerprint(language, order)
		}
	}

	fn source(a: f64) -> MemorySource {
		MemorySource::new()
			.with_frequency(Language::English, "a", a)
			.unwrap()
			.with_frequency(Language::German, "a", 0.5)
			.unwrap()
	}

	const ENGLISH: ModelKey = (Language::English, NgramOrder::Unigram);
	const GERMAN: ModelKey = (Language::German, NgramOrder::Unigram);

	#[test]
	fn in_memory_cache_loads_once() {
		let cache = InMemoryCache::new();
		let source = Counting::new(source(0.5));

		let first = cache.get_or_load(ENGLISH, &source).unwrap();
		let second = cache.get_or_load(ENGLISH, &source).unwrap();
		assert_eq!(source.loads(), 1);
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(cache.resident_models(), 1);
	}

	#[test]
	fn failed_loads_are_not_cached() {
		let cache = InMemoryCache::new();

		assert!(cache.get_or_load(ENGLISH, &MemorySource::new()).is_err());
		assert_eq!(cache.resident_models(), 0);
		assert!(cache.get_or_load(ENGLISH, &source(0.5)).is_ok());
	}

	#[test]
	fn disk_cache_evicts_and_reads_back_from_disk() {
		let dir = tempfile::tempdir().unwrap();
		let cache = DiskCache::new(dir.path(), 1).unwrap();
		let source = Counting::new(source(0.5));

		let first = cache.get_or_load(ENGLISH, &source).unwrap();
		cache.get_or_load(GERMAN, &source).unwrap();
		assert_eq!(cache.resident_models(), 1);
		assert!(dir.path().join("en").join("unigrams.bin").is_file());

		let again = cache.get_or_load(ENGLISH, &source).unwrap();
		assert_eq!(source.loads(), 2);
		assert_eq!(*again, *first);
	}

	#[test]
	fn disk_cache_reuses_files_of_the_same_source() {
		let dir = tempfile::tempdir().unwrap();
		DiskCache::new(dir.path(), 4).unwrap().get_or_load(ENGLISH, &source(0.5)).unwrap();

		let source = Counting::new(source(0.5));
		let model = DiskCache::new(dir.path(), 4).unwrap().get_or_load(ENGLISH, &source).unwrap();
		assert_eq!(source.loads(), 0);
		assert_eq!(model.relative_frequency("a"), Some(0.5));
	}

	#[test]
	fn disk_cache_rebuilds_files_of_another_source() {
		let dir = tempfile::tempdir().unwrap();
		let old = DiskCache::new(dir.path(), 4).unwrap().get_or_load(ENGLISH, &source(0.01)).unwrap();
		assert_eq!(old.relative_frequency("a"), Some(0.01));

		let retrained = Counting::new(source(0.5));
		let model = DiskCache::new(dir.path(), 4).unwrap().get_or_load(ENGLISH, &retrained).unwrap();
		assert_eq!(retrained.loads(), 1);
		assert_eq!(model.relative_frequency("a"), Some(0.5));

		let bytes = fs::read(dir.path().join("en").join("unigrams.bin")).unwrap();
		let entry = postcard::from_bytes::<CacheEntry>(&bytes).unwrap();
		assert_eq!(entry.fingerprint, retrained.fingerprint(Language::English, NgramOrder::Unigram).unwrap());
	}

	#[test]
	fn disk_cache_rebuilds_corrupt_files() {
		let dir = tempfile::tempdir().unwrap();
		fs::create_dir_all(dir.path().join("en")).unwrap();
		fs::write(dir.path().join("en").join("unigrams.bin"), [0xFF, 0xFF, 0xFF]).unwrap();

		let cache = DiskCache::new(dir.path(), 4).unwrap();
		let loaded = cache.get_or_load(ENGLISH, &source(0.5)).unwrap();
		assert_eq!(loaded.relative_frequency("a"), Some(0.5));

		let bytes = fs::read(dir.path().join("en").join("unigrams.bin")).unwrap();
		let entry = postcard::from_bytes::<CacheEntry>(&bytes).unwrap();
		assert_eq!(entry.model, *loaded);
	}

	#[test]
	fn disk_cache_needs_room_for_one_model() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(DiskCache::new(dir.path(), 0), Err(DetectionError::Cache(_))));
	}
}
