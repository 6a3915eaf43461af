use std::fmt;
use std::path::{Path, PathBuf};

use quiz_core::model::{QuestionBank, QuestionBankDocument, Subject};
use reqwest::Url;
use tracing::{debug, info};

use crate::error::BankLoadError;

/// Where a subject's question bank lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankSource {
    File(PathBuf),
    Url(Url),
}

impl BankSource {
    /// `http://` and `https://` locations are fetched; everything else is a file path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            if let Ok(url) = Url::parse(trimmed) {
                return Self::Url(url);
            }
        }
        Self::File(PathBuf::from(trimmed))
    }
}

impl fmt::Display for BankSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankSource::File(path) => write!(f, "{}", path.display()),
            BankSource::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Fetches static question bank documents.
#[derive(Debug, Clone, Default)]
pub struct QuestionBankLoader {
    http: reqwest::Client,
    base_dir: Option<PathBuf>,
}

impl QuestionBankLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative file sources against `dir` instead of the working directory.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Load and validate the bank for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `BankLoadError` when the source cannot be read, the response is
    /// not successful, the JSON is malformed, or a question is invalid.
    pub async fn load(
        &self,
        subject: &Subject,
        source: &BankSource,
    ) -> Result<QuestionBank, BankLoadError> {
        let body = match source {
            BankSource::File(path) => self.read_file(path).await?,
            BankSource::Url(url) => self.fetch(url.clone()).await?,
        };
        let bank = Self::parse(subject.clone(), &body)?;
        info!(%subject, %source, questions = bank.len(), "loaded question bank");
        Ok(bank)
    }

    /// Parse a bank document already in memory.
    ///
    /// # Errors
    ///
    /// Returns `BankLoadError::Malformed` or `BankLoadError::Invalid`.
    pub fn parse(subject: Subject, body: &str) -> Result<QuestionBank, BankLoadError> {
        let document: QuestionBankDocument = serde_json::from_str(body)?;
        Ok(QuestionBank::from_document(subject, document)?)
    }

    async fn read_file(&self, path: &Path) -> Result<String, BankLoadError> {
        let resolved = match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        };
        debug!(path = %resolved.display(), "reading question bank");
        tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|source| BankLoadError::Io {
                path: resolved,
                source,
            })
    }

    async fn fetch(&self, url: Url) -> Result<String, BankLoadError> {
        debug!(%url, "fetching question bank");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BankLoadError::HttpStatus(status));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Subject {
        Subject::new("html").unwrap()
    }

    #[test]
    fn source_parsing_distinguishes_urls_and_paths() {
        assert!(matches!(
            BankSource::parse("https://example.com/html.json"),
            BankSource::Url(_)
        ));
        assert_eq!(
            BankSource::parse("data/html.json"),
            BankSource::File(PathBuf::from("data/html.json"))
        );
    }

    #[test]
    fn parse_reports_malformed_json() {
        let err = QuestionBankLoader::parse(subject(), "{ not json").unwrap_err();
        assert!(matches!(err, BankLoadError::Malformed(_)));
    }

    #[test]
    fn parse_reports_invalid_question() {
        let body = r#"{"questions": [{"question": "A?", "options": ["x"], "answer": 3}]}"#;
        let err = QuestionBankLoader::parse(subject(), body).unwrap_err();
        assert!(matches!(err, BankLoadError::Invalid(_)));
    }

    #[tokio::test]
    async fn load_reads_relative_file_from_base_dir() {
        let dir = std::env::temp_dir().join(format!("quiz-bank-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(
            dir.join("html.json"),
            r#"{"questions": [{"question": "Tag for a link?", "options": ["<a>", "<p>"], "answer": 0}]}"#,
        )
        .await
        .unwrap();

        let loader = QuestionBankLoader::new().with_base_dir(&dir);
        let bank = loader
            .load(&subject(), &BankSource::parse("html.json"))
            .await
            .unwrap();

        assert_eq!(bank.len(), 1);
        assert_eq!(bank.questions()[0].id().as_str(), "html-0");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let loader = QuestionBankLoader::new();
        let err = loader
            .load(&subject(), &BankSource::parse("/definitely/not/here.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, BankLoadError::Io { .. }));
    }
}
