//! Quiz catalog: which subjects exist and where their banks live.
//!
//! ```toml
//! [[quiz]]
//! subject = "html"
//! title = "HTML Quiz"
//! bank = "data/html.json"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use quiz_core::model::Subject;

use crate::bank::BankSource;
use crate::error::CatalogError;

/// Subjects served when no catalog file exists.
pub const BUILTIN_SUBJECTS: [&str; 3] = ["html", "css", "js"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    quiz: Vec<QuizEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuizEntry {
    subject: String,
    title: Option<String>,
    bank: String,
}

/// One quiz page: its subject, heading and bank location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPage {
    subject: Subject,
    title: String,
    bank: BankSource,
}

impl QuizPage {
    #[must_use]
    pub fn new(subject: Subject, title: Option<String>, bank: BankSource) -> Self {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| subject.quiz_title());
        Self {
            subject,
            title,
            bank,
        }
    }

    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn bank(&self) -> &BankSource {
        &self.bank
    }
}

/// Ordered, duplicate-free list of quiz pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCatalog {
    pages: Vec<QuizPage>,
}

impl QuizCatalog {
    /// `html`, `css` and `js`, each reading `data/<subject>.json`.
    #[must_use]
    pub fn builtin() -> Self {
        let pages = BUILTIN_SUBJECTS
            .iter()
            .filter_map(|raw| Subject::new(*raw).ok())
            .map(|subject| {
                let bank = BankSource::File(PathBuf::from(format!("data/{subject}.json")));
                QuizPage::new(subject, None, bank)
            })
            .collect();
        Self { pages }
    }

    /// # Errors
    ///
    /// Returns `CatalogError` when the list is empty or names a subject twice.
    pub fn new(pages: Vec<QuizPage>) -> Result<Self, CatalogError> {
        if pages.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for page in &pages {
            if !seen.insert(page.subject.clone()) {
                return Err(CatalogError::Duplicate(page.subject.to_string()));
            }
        }
        Ok(Self { pages })
    }

    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for malformed TOML, invalid subjects, blank bank
    /// locations, duplicates, or an empty catalog.
    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw)?;
        let pages = file
            .quiz
            .into_iter()
            .map(|entry| {
                let subject = Subject::new(entry.subject)?;
                if entry.bank.trim().is_empty() {
                    return Err(CatalogError::EmptyBank {
                        subject: subject.to_string(),
                    });
                }
                Ok(QuizPage::new(subject, entry.title, BankSource::parse(&entry.bank)))
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;
        Self::new(pages)
    }

    /// Anchor relative file banks at `dir`. URLs and absolute paths are kept.
    #[must_use]
    pub fn relative_to(mut self, dir: &Path) -> Self {
        if dir.as_os_str().is_empty() {
            return self;
        }
        for page in &mut self.pages {
            if let BankSource::File(bank) = &mut page.bank {
                if bank.is_relative() {
                    *bank = dir.join(&*bank);
                }
            }
        }
        self
    }

    /// Read the catalog at `path`. Relative bank paths resolve next to it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, or any parse error.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_toml_str(&raw)?.relative_to(catalog_dir(path));
        info!(path = %path.display(), quizzes = catalog.pages.len(), "loaded quiz catalog");
        Ok(catalog)
    }

    /// Read `path` if it exists, otherwise fall back to [`QuizCatalog::builtin`]
    /// with its banks under the directory `path` would live in.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if an existing file is unreadable or invalid.
    pub fn load_or_builtin(path: &Path) -> Result<Self, CatalogError> {
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "no quiz catalog file, using built-in quizzes");
            Ok(Self::builtin().relative_to(catalog_dir(path)))
        }
    }

    #[must_use]
    pub fn pages(&self) -> &[QuizPage] {
        &self.pages
    }

    #[must_use]
    pub fn find(&self, subject: &Subject) -> Option<&QuizPage> {
        self.pages.iter().find(|page| &page.subject == subject)
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.pages.iter().map(QuizPage::subject)
    }
}

fn catalog_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

impl Default for QuizCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
