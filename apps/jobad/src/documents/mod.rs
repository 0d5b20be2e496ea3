//! Markdown job ads on disk: discovery, YAML front matter, atomic writes.

pub mod clean;

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::storage::write_atomic;

pub const JOB_SKILLS_FIELD: &str = "job_skills";

/// A markdown file split into its front matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub front_matter: Mapping,
    pub body: String,
}

impl Document {
    /// Splits a leading `---` block off `text`. No block means empty front matter.
    pub fn parse(name: &str, text: &str) -> Result<Self, AppError> {
        let (yaml, body) = match split_front_matter(text) {
            Some(parts) => parts,
            None => ("", text),
        };

        let front_matter = if yaml.trim().is_empty() {
            Mapping::new()
        } else {
            match serde_yaml::from_str::<Value>(yaml) {
                Ok(Value::Mapping(mapping)) => mapping,
                Ok(Value::Null) => Mapping::new(),
                Ok(_) => {
                    return Err(AppError::FrontMatter {
                        document: name.to_string(),
                        reason: "front matter is not a mapping".to_string(),
                    })
                }
                Err(e) => {
                    return Err(AppError::FrontMatter {
                        document: name.to_string(),
                        reason: e.to_string(),
                    })
                }
            }
        };

        Ok(Document {
            name: name.to_string(),
            front_matter,
            body: body.to_string(),
        })
    }

    pub fn render(&self) -> Result<String, AppError> {
        let yaml = serde_yaml::to_string(&self.front_matter).map_err(|e| AppError::FrontMatter {
            document: self.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(format!("---\n{yaml}---\n{}", self.body))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.front_matter.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.front_matter.insert(Value::from(key), value.into());
    }

    /// The skills recorded by the analysis stage. Non-string entries are ignored.
    pub fn job_skills(&self) -> Result<Vec<String>, AppError> {
        match self.get(JOB_SKILLS_FIELD) {
            Some(Value::Sequence(items)) => Ok(items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()),
            _ => Err(AppError::MissingField {
                document: self.name.clone(),
                field: JOB_SKILLS_FIELD.to_string(),
            }),
        }
    }

    pub fn set_job_skills(&mut self, skills: &[String]) {
        let items = skills.iter().map(|s| Value::from(s.as_str())).collect();
        self.set(JOB_SKILLS_FIELD, Value::Sequence(items));
    }
}

fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---\n")?;
    if let Some(body) = rest.strip_prefix("---\n") {
        return Some(("", body));
    }
    if let Some(end) = rest.find("\n---\n") {
        return Some((&rest[..end], &rest[end + 5..]));
    }
    rest.strip_suffix("\n---").map(|yaml| (yaml, ""))
}

/// Lists `*.md` files in `dir`, sorted by name. Creates the directory if it is missing.
pub fn list_markdown_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        info!("Created directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        warn!("No markdown files found in {}", dir.display());
    }
    Ok(files)
}

/// File name as UTF-8 (lossy), used as the document name in logs and output paths.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn read_document(path: &Path) -> Result<Document, AppError> {
    let text = std::fs::read_to_string(path)?;
    Document::parse(&file_name(path), &text)
}

/// Reads every markdown document in `dir`. Unreadable documents are logged and skipped.
pub fn read_documents(dir: &Path) -> Result<Vec<Document>, AppError> {
    let mut documents = Vec::new();
    for path in list_markdown_files(dir)? {
        match read_document(&path) {
            Ok(doc) => documents.push(doc),
            Err(e) => warn!("🚨 Skipping {}: {e}", path.display()),
        }
    }
    Ok(documents)
}

/// Writes `doc` into `dir` under its own name.
pub fn write_document(dir: &Path, doc: &Document) -> Result<PathBuf, AppError> {
    let path = dir.join(&doc.name);
    write_atomic(&path, doc.render()?.as_bytes())?;
    Ok(path)
}
