use std::path::Path;

use calamine::{Data, Range, Reader as _};

use crate::catalog::Catalog;
use crate::cell::{self, CellError};
use crate::error::CatalogError;
use crate::formats::LessonRecord;

pub const SEMESTER_HEADER: &str = "Semestre";
pub const SUBJECT_HEADER: &str = "Materia";
pub const TOPIC_HEADER: &str = "Tema";
pub const SUBTOPIC_HEADER: &str = "Subtema";
pub const LESSON_HEADER: &str = "Aula";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Video,
    Pdf,
    Quiz,
}

impl LinkKind {
    /// Classifies a header as a link column.
    ///
    /// The lowercased header must contain `link`; `aula`/`video` is checked
    /// before `pdf`, which is checked before `quiz`.
    pub fn classify(header: &str) -> Option<Self> {
        let lower = header.to_lowercase();
        if !lower.contains("link") {
            return None;
        }
        if lower.contains("aula") || lower.contains("video") {
            Some(Self::Video)
        } else if lower.contains("pdf") {
            Some(Self::Pdf)
        } else if lower.contains("quiz") {
            Some(Self::Quiz)
        } else {
            None
        }
    }
}

/// Absolute column positions of the fields in one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    pub headers: Vec<String>,
    pub semester: Option<u32>,
    pub subject: Option<u32>,
    pub topic: Option<u32>,
    pub subtopic: Option<u32>,
    pub lesson: Option<u32>,
    pub video_link: Option<u32>,
    pub pdf_link: Option<u32>,
    pub quiz_link: Option<u32>,
}

impl ColumnLayout {
    pub fn resolve(headers: Vec<String>) -> Self {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.to_lowercase() == name.to_lowercase())
                .map(|idx| idx as u32)
        };

        let mut layout = Self {
            semester: find(SEMESTER_HEADER),
            subject: find(SUBJECT_HEADER),
            topic: find(TOPIC_HEADER),
            subtopic: find(SUBTOPIC_HEADER),
            lesson: find(LESSON_HEADER),
            ..Self::default()
        };

        for (idx, header) in headers.iter().enumerate() {
            let slot = match LinkKind::classify(header) {
                Some(LinkKind::Video) => &mut layout.video_link,
                Some(LinkKind::Pdf) => &mut layout.pdf_link,
                Some(LinkKind::Quiz) => &mut layout.quiz_link,
                None => continue,
            };
            *slot = Some(idx as u32);
        }

        layout.headers = headers;
        layout
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            (SEMESTER_HEADER, self.semester),
            (SUBJECT_HEADER, self.subject),
            (TOPIC_HEADER, self.topic),
            (SUBTOPIC_HEADER, self.subtopic),
            (LESSON_HEADER, self.lesson),
        ]
        .into_iter()
        .filter(|(_, col)| col.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    fn header_name(&self, col: u32) -> &str {
        self.headers
            .get(col as usize)
            .map(String::as_str)
            .unwrap_or("?")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("column '{column}': {source}")]
pub struct RowError {
    column: String,
    #[source]
    source: CellError,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetStats {
    pub loaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Reads the whole workbook at `path`, logging and returning an empty catalog
/// when it cannot be read.
pub fn ingest(path: &Path) -> Catalog {
    match load_workbook(path) {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::error!(path = %path.display(), %err, "failed to ingest workbook");
            Catalog::new()
        }
    }
}

pub fn load_workbook(path: &Path) -> Result<Catalog, CatalogError> {
    let parse_error = |err: calamine::Error| CatalogError::Parse {
        path: path.to_owned(),
        message: err.to_string(),
    };

    let mut workbook = calamine::open_workbook_auto(path).map_err(parse_error)?;
    let sheet_names = workbook.sheet_names();
    tracing::info!(path = %path.display(), sheets = ?sheet_names, "reading workbook");

    let mut catalog = Catalog::new();
    for institution in sheet_names {
        let range = workbook.worksheet_range(&institution).map_err(parse_error)?;
        let stats = ingest_sheet(&mut catalog, &institution, &range);
        tracing::info!(
            institution = %institution,
            loaded = stats.loaded,
            skipped = stats.skipped,
            failed = stats.failed,
            "ingested sheet"
        );
    }

    Ok(catalog)
}

/// Adds every valid data row of `range` to `catalog` under `institution`.
pub fn ingest_sheet(catalog: &mut Catalog, institution: &str, range: &Range<Data>) -> SheetStats {
    catalog.ensure_institution(institution);

    let layout = ColumnLayout::resolve(header_row(range));
    tracing::debug!(institution, headers = ?layout.headers, "resolved headers");
    for column in layout.missing_required() {
        tracing::warn!(institution, column, "required column not found");
    }

    let mut stats = SheetStats::default();
    let Some((last_row, _)) = range.end() else {
        return stats;
    };

    for row in 1..=last_row {
        // 1-based, as shown by spreadsheet applications.
        let row_number = row + 1;
        match extract_row(range, &layout, row) {
            Ok(record) => {
                if catalog.insert(institution, &record) {
                    stats.loaded += 1;
                } else {
                    tracing::debug!(institution, row = row_number, "skipping incomplete row");
                    stats.skipped += 1;
                }
            }
            Err(err) => {
                tracing::warn!(institution, row = row_number, %err, "failed to read row");
                stats.failed += 1;
            }
        }
    }

    stats
}

/// Header texts for columns `A..=last`, with `Column<N>` for blank cells.
pub fn header_row(range: &Range<Data>) -> Vec<String> {
    let Some((_, last_col)) = range.end() else {
        return Vec::new();
    };

    (0..=last_col)
        .map(|col| {
            let text = range
                .get_value((0, col))
                .and_then(|value| cell::coerce(value).ok())
                .map(|value| value.trim().to_owned())
                .unwrap_or_default();
            if text.is_empty() {
                format!("Column{}", col + 1)
            } else {
                text
            }
        })
        .collect()
}

fn extract_row(
    range: &Range<Data>,
    layout: &ColumnLayout,
    row: u32,
) -> Result<LessonRecord, RowError> {
    let read = |col: Option<u32>| -> Result<String, RowError> {
        let Some(col) = col else {
            return Ok(String::new());
        };
        cell::coerce_trimmed(range.get_value((row, col))).map_err(|source| RowError {
            column: layout.header_name(col).to_owned(),
            source,
        })
    };
    let read_link = |col: Option<u32>| -> Result<Option<String>, RowError> {
        Ok(Some(read(col)?).filter(|value| !value.is_empty()))
    };

    Ok(LessonRecord {
        semester: read(layout.semester)?,
        subject: read(layout.subject)?,
        topic: read(layout.topic)?,
        subtopic: read(layout.subtopic)?,
        lesson_name: read(layout.lesson)?,
        video_link: read_link(layout.video_link)?,
        pdf_link: read_link(layout.pdf_link)?,
        quiz_link: read_link(layout.quiz_link)?,
    })
}

#[cfg(test)]
mod tests {
    use calamine::CellErrorType;

    use super::*;
    use crate::formats::Lesson;

    fn sheet(rows: &[&[&str]]) -> Range<Data> {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1).max(1) as u32;
        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    range.set_value((r as u32, c as u32), Data::String((*value).to_owned()));
                }
            }
        }
        range
    }

    fn entries(catalog: &Catalog, path: [&str; 4]) -> Vec<(String, Lesson)> {
        catalog
            .institution(path[0])
            .and_then(|i| i.semester(path[1]))
            .and_then(|s| s.subjects.get(path[2]))
            .and_then(|s| s.topics.get(path[3]))
            .map(|t| {
                t.entries
                    .iter()
                    .map(|e| (e.subtopic.clone(), e.lesson.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn duplicate_rows_are_kept_and_empty_link_is_absent() {
        let range = sheet(&[
            &["Semestre", "Materia", "Tema", "Subtema", "Aula", "Link Aula"],
            &["1", "Math", "Algebra", "Linear Eq", "Lesson1", "http://v1"],
            &["1", "Math", "Algebra", "Linear Eq", "Lesson1", ""],
        ]);

        let mut catalog = Catalog::new();
        let stats = ingest_sheet(&mut catalog, "FIU", &range);
        assert_eq!(stats.loaded, 2);

        let got = entries(&catalog, ["FIU", "1", "Math", "Algebra"]);
        assert_eq!(
            got,
            vec![
                (
                    "Linear Eq".to_owned(),
                    Lesson {
                        name: "Lesson1".to_owned(),
                        video_link: Some("http://v1".to_owned()),
                        pdf_link: None,
                        quiz_link: None,
                    }
                ),
                (
                    "Linear Eq".to_owned(),
                    Lesson {
                        name: "Lesson1".to_owned(),
                        video_link: None,
                        pdf_link: None,
                        quiz_link: None,
                    }
                ),
            ]
        );
    }

    #[test]
    fn headers_match_case_insensitively_in_any_order() {
        let range = sheet(&[
            &["link quiz", "AULA", "subtema", "TEMA", "materia", "semestre", "Link PDF"],
            &["q", "L1", "S1", "T1", "M1", "2", "p"],
        ]);

        let mut catalog = Catalog::new();
        ingest_sheet(&mut catalog, "UF", &range);

        let got = entries(&catalog, ["UF", "2", "M1", "T1"]);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].0, "S1");
        assert_eq!(got[0].1.name, "L1");
        assert_eq!(got[0].1.pdf_link.as_deref(), Some("p"));
        assert_eq!(got[0].1.quiz_link.as_deref(), Some("q"));
        assert_eq!(got[0].1.video_link, None);
    }

    #[test]
    fn incomplete_rows_are_skipped_without_affecting_others() {
        let range = sheet(&[
            &["Semestre", "Materia", "Tema", "Subtema", "Aula"],
            &["1", "Math", "Algebra", "A", "L1"],
            &["1", "Math", "", "B", "L2"],
            &["1", "Math", "Algebra", "   ", "L3"],
            &[],
            &["1", "Math", "Algebra", "D", "L4"],
        ]);

        let mut catalog = Catalog::new();
        let stats = ingest_sheet(&mut catalog, "FIU", &range);
        assert_eq!(
            stats,
            SheetStats {
                loaded: 2,
                skipped: 3,
                failed: 0
            }
        );

        let subtopics: Vec<_> = entries(&catalog, ["FIU", "1", "Math", "Algebra"])
            .into_iter()
            .map(|(s, _)| s)
            .collect();
        assert_eq!(subtopics, vec!["A", "D"]);
    }

    #[test]
    fn missing_required_column_skips_every_row_but_keeps_institution() {
        let range = sheet(&[
            &["Semestre", "Materia", "Tema", "Aula"],
            &["1", "Math", "Algebra", "L1"],
        ]);

        let mut catalog = Catalog::new();
        let stats = ingest_sheet(&mut catalog, "NoSub", &range);
        assert_eq!(stats.loaded, 0);
        assert_eq!(stats.skipped, 1);
        assert!(catalog.contains_institution("NoSub"));
        assert_eq!(catalog.lesson_count(), 0);
    }

    #[test]
    fn error_cell_fails_only_its_row() {
        let mut range = sheet(&[
            &["Semestre", "Materia", "Tema", "Subtema", "Aula"],
            &["1", "Math", "Algebra", "A", "L1"],
            &["1", "Math", "Algebra", "B", "L2"],
        ]);
        range.set_value((1, 3), Data::Error(CellErrorType::Ref));

        let mut catalog = Catalog::new();
        let stats = ingest_sheet(&mut catalog, "FIU", &range);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.loaded, 1);
        assert_eq!(entries(&catalog, ["FIU", "1", "Math", "Algebra"])[0].0, "B");
    }

    #[test]
    fn numeric_cells_are_coerced_to_strings() {
        let mut range = sheet(&[
            &["Semestre", "Materia", "Tema", "Subtema", "Aula"],
            &["", "Math", "Algebra", "A", "L1"],
        ]);
        range.set_value((1, 0), Data::Float(3.0));

        let mut catalog = Catalog::new();
        ingest_sheet(&mut catalog, "FIU", &range);
        assert!(catalog.institution("FIU").unwrap().semester("3").is_some());
    }

    #[test]
    fn blank_header_gets_positional_placeholder() {
        let range = sheet(&[&["Semestre", "", "Tema"], &["1", "x", "y"]]);
        assert_eq!(header_row(&range), vec!["Semestre", "Column2", "Tema"]);
    }

    #[test]
    fn rightmost_link_header_wins() {
        let layout = ColumnLayout::resolve(
            ["Aula", "Link Aula", "Link da Aula (backup)", "Link PDF"]
                .iter()
                .map(|h| (*h).to_owned())
                .collect(),
        );
        assert_eq!(layout.lesson, Some(0));
        assert_eq!(layout.video_link, Some(2));
        assert_eq!(layout.pdf_link, Some(3));
        assert_eq!(layout.quiz_link, None);
        assert_eq!(
            layout.missing_required(),
            vec!["Semestre", "Materia", "Tema", "Subtema"]
        );
    }

    #[test]
    fn link_kind_classification() {
        assert_eq!(LinkKind::classify("Link Aula"), Some(LinkKind::Video));
        assert_eq!(LinkKind::classify("LINK VIDEO"), Some(LinkKind::Video));
        assert_eq!(LinkKind::classify("Link PDF"), Some(LinkKind::Pdf));
        assert_eq!(LinkKind::classify("link do quiz"), Some(LinkKind::Quiz));
        assert_eq!(LinkKind::classify("Aula"), None);
        assert_eq!(LinkKind::classify("Link"), None);
    }
}
