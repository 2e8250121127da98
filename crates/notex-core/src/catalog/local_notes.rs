//! Notes on disk, used with the builtin catalog.
//!
//! One markdown file per topic under the notes directory, with an optional
//! exam-scoped variant. A `.meta.json` sidecar records when the note was
//! saved and under which revision.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{CatalogError, NoteMeta};

#[derive(Debug, Clone)]
pub struct LocalNotesStore {
    dir: PathBuf,
}

impl LocalNotesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn stem(topic_id: &str, exam_id: Option<&str>) -> String {
        match exam_id {
            Some(exam) => format!("{topic_id}--{exam}"),
            None => topic_id.to_string(),
        }
    }

    fn note_path(&self, topic_id: &str, exam_id: Option<&str>) -> PathBuf {
        self.dir.join(format!("{}.md", Self::stem(topic_id, exam_id)))
    }

    fn meta_path(&self, topic_id: &str, exam_id: Option<&str>) -> PathBuf {
        self.dir
            .join(format!("{}.meta.json", Self::stem(topic_id, exam_id)))
    }

    /// Reads a saved note. The exam-scoped file wins over the generic one;
    /// a missing file is not an error.
    pub fn read(
        &self,
        topic_id: &str,
        exam_id: Option<&str>,
    ) -> Result<Option<String>, CatalogError> {
        if exam_id.is_some()
            && let Some(text) = read_if_present(&self.note_path(topic_id, exam_id))?
        {
            return Ok(Some(text));
        }
        read_if_present(&self.note_path(topic_id, None))
    }

    /// Writes a note and its metadata sidecar. The note body lands via a
    /// temp file and rename so a crash cannot leave a half-written note.
    pub fn write(
        &self,
        topic_id: &str,
        exam_id: Option<&str>,
        text: &str,
        meta: &NoteMeta,
    ) -> Result<(), CatalogError> {
        fs::create_dir_all(&self.dir).map_err(|e| CatalogError::io(&e))?;

        let path = self.note_path(topic_id, exam_id);
        let tmp = path.with_extension("md.tmp");
        fs::write(&tmp, text).map_err(|e| CatalogError::io(&e))?;
        fs::rename(&tmp, &path).map_err(|e| CatalogError::io(&e))?;

        let meta_json = serde_json::to_string_pretty(meta)
            .map_err(|e| CatalogError::parse(format!("Could not encode note metadata: {e}")))?;
        fs::write(self.meta_path(topic_id, exam_id), meta_json)
            .map_err(|e| CatalogError::io(&e))?;
        Ok(())
    }
}

fn read_if_present(path: &Path) -> Result<Option<String>, CatalogError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CatalogError::io(&e)),
    }
}
