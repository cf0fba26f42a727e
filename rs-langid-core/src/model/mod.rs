//! N-gram language models and where they come from.
//!
//! This module provides:
//! - N-gram values and extraction (`Ngram`, `NgramOrder`)
//! - Per-language, per-order frequency tables (`LanguageModel`)
//! - Model sources (`ModelSource`, `DirectorySource`, `MemorySource`)
//! - Model caches (`ModelCache`, `InMemoryCache`, `DiskCache`)
//! - Lazy lookups on top of both (`ModelProvider`)

/// N-gram values, orders and extraction from words.
pub mod ngram;

/// Relative frequency table of one language and one n-gram order.
///
/// Parses trained JSON tables and validates their content.
pub mod language_model;

/// Sources of trained models: a directory of JSON files or in-process tables.
pub mod source;

/// In-memory and disk-backed caches with single-flight loading.
pub mod cache;

/// Lazy model access used by the detector, including parallel preloading.
pub mod provider;
