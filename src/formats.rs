use serde::ser::SerializeMap as _;
use serde::{Deserialize, Serialize, Serializer};

/// A lesson as served by the API. Missing links are `None` (JSON `null`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "link_aula")]
    pub video_link: Option<String>,
    #[serde(rename = "link_pdf")]
    pub pdf_link: Option<String>,
    #[serde(rename = "link_quiz")]
    pub quiz_link: Option<String>,
}

/// One spreadsheet data row after extraction and trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonRecord {
    pub semester: String,
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
    pub lesson_name: String,
    pub video_link: Option<String>,
    pub pdf_link: Option<String>,
    pub quiz_link: Option<String>,
}

impl LessonRecord {
    /// All five hierarchy fields must be non-blank.
    pub fn is_valid(&self) -> bool {
        [
            &self.semester,
            &self.subject,
            &self.topic,
            &self.subtopic,
            &self.lesson_name,
        ]
        .iter()
        .all(|value| !value.trim().is_empty())
    }

    pub fn lesson(&self) -> Lesson {
        Lesson {
            name: self.lesson_name.clone(),
            video_link: non_blank(self.video_link.as_deref()),
            pdf_link: non_blank(self.pdf_link.as_deref()),
            quiz_link: non_blank(self.quiz_link.as_deref()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtopicView {
    #[serde(rename = "subtema")]
    pub subtopic: String,
    #[serde(rename = "aulas")]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicView {
    #[serde(rename = "tema")]
    pub topic: String,
    #[serde(rename = "subtemas")]
    pub subtopics: Vec<SubtopicView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectView {
    #[serde(rename = "materia")]
    pub subject: String,
    #[serde(rename = "temas")]
    pub topics: Vec<TopicView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemesterView {
    pub name: String,
    pub subjects: Vec<SubjectView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionView {
    pub name: String,
    pub semesters: Vec<SemesterView>,
}

impl InstitutionView {
    pub fn semester(&self, name: &str) -> Option<&SemesterView> {
        self.semesters.iter().find(|s| s.name == name)
    }
}

/// Response-shaped projection of the catalog.
///
/// Serializes as `{"<ies>": {"<semestre>": [subject, ...]}}`, keeping the
/// catalog's insertion order for both map levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedView {
    pub institutions: Vec<InstitutionView>,
}

impl ProjectedView {
    pub fn institution(&self, name: &str) -> Option<&InstitutionView> {
        self.institutions.iter().find(|i| i.name == name)
    }
}

impl Serialize for ProjectedView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.institutions.len()))?;
        for institution in &self.institutions {
            map.serialize_entry(&institution.name, &SemesterMap(&institution.semesters))?;
        }
        map.end()
    }
}

struct SemesterMap<'a>(&'a [SemesterView]);

impl Serialize for SemesterMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for semester in self.0 {
            map.serialize_entry(&semester.name, &semester.subjects)?;
        }
        map.end()
    }
}
