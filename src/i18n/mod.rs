//! Locale bundles for the web frontend.
//!
//! # Data Flow
//! ```text
//! locales/<locale>.toml
//!     → parse_bundle   (key → { variant → text })
//!     → flatten_bundle (key → text of the "other" variant)
//!     → JSON object served at /api/i18n/<locale>
//! ```
//!
//! Bundles are read on every request; nothing is cached.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

use rust_embed::RustEmbed;
use thiserror::Error;

/// Locale served when the request names none.
pub const DEFAULT_LOCALE: &str = "en";

/// Variant that every surfaced message must carry.
pub const DEFAULT_VARIANT: &str = "other";

pub type Bundle = BTreeMap<String, BTreeMap<String, String>>;
pub type Translations = BTreeMap<String, String>;

#[derive(RustEmbed)]
#[folder = "locales/"]
struct LocaleAssets;

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("language not found: {0}")]
    NotFound(String),
    #[error("failed to parse translations for {locale}: {message}")]
    Parse { locale: String, message: String },
}

enum Source {
    Embedded,
    Directory(PathBuf),
}

/// Resolves locale identifiers to flattened translation tables.
pub struct TranslationLoader {
    source: Source,
}

impl TranslationLoader {
    /// Loader over the bundles compiled into the binary.
    pub fn embedded() -> Self {
        Self {
            source: Source::Embedded,
        }
    }

    /// Loader over `<dir>/<locale>.toml` files on disk.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Directory(dir.into()),
        }
    }

    pub fn load(&self, locale: &str) -> Result<Translations, I18nError> {
        let raw = self
            .read(locale)
            .ok_or_else(|| I18nError::NotFound(locale.to_string()))?;
        let bundle = parse_bundle(&raw).map_err(|message| I18nError::Parse {
            locale: locale.to_string(),
            message,
        })?;
        Ok(flatten_bundle(bundle))
    }

    fn read(&self, locale: &str) -> Option<Cow<'static, [u8]>> {
        if !is_locale_name(locale) {
            return None;
        }
        let file = format!("{}.toml", locale);
        match &self.source {
            Source::Embedded => LocaleAssets::get(&file).map(|asset| asset.data),
            Source::Directory(dir) => std::fs::read(dir.join(file)).ok().map(Cow::Owned),
        }
    }
}

impl Default for TranslationLoader {
    fn default() -> Self {
        Self::embedded()
    }
}

fn is_locale_name(locale: &str) -> bool {
    !locale.is_empty()
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Stage one: decode a bundle into `key → { variant → text }`.
pub fn parse_bundle(raw: &[u8]) -> Result<Bundle, String> {
    let text = std::str::from_utf8(raw).map_err(|e| e.to_string())?;
    toml::from_str(text).map_err(|e| e.to_string())
}

/// Stage two: keep the `other` variant of each entry. Entries without it
/// are dropped, not reported.
pub fn flatten_bundle(bundle: Bundle) -> Translations {
    bundle
        .into_iter()
        .filter_map(|(key, mut variants)| {
            variants
                .remove(DEFAULT_VARIANT)
                .map(|text| (key, text))
        })
        .collect()
}
