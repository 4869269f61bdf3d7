use crate::catalog::{Catalog, Institution, Semester};
use crate::formats::{
    InstitutionView, ProjectedView, SemesterView, SubjectView, SubtopicView, TopicView,
};

/// Projects `catalog`, optionally narrowed to one institution and semester.
///
/// A filter naming a key that does not exist is ignored; callers that need a
/// not-found answer check existence first.
pub fn project(
    catalog: &Catalog,
    institution: Option<&str>,
    semester: Option<&str>,
) -> ProjectedView {
    let selected: Vec<(&str, &Institution)> =
        match institution.and_then(|name| catalog.institution(name).map(|found| (name, found))) {
            Some(one) => vec![one],
            None => catalog.institutions().collect(),
        };

    ProjectedView {
        institutions: selected
            .into_iter()
            .map(|(name, institution)| project_institution(name, institution, semester))
            .collect(),
    }
}

fn project_institution(
    name: &str,
    institution: &Institution,
    semester: Option<&str>,
) -> InstitutionView {
    let selected: Vec<(&str, &Semester)> =
        match semester.and_then(|key| institution.semester(key).map(|found| (key, found))) {
            Some(one) => vec![one],
            None => institution.semesters.iter().collect(),
        };

    InstitutionView {
        name: name.to_owned(),
        semesters: selected
            .into_iter()
            .map(|(name, semester)| SemesterView {
                name: name.to_owned(),
                subjects: project_semester(semester),
            })
            .collect(),
    }
}

fn project_semester(semester: &Semester) -> Vec<SubjectView> {
    semester
        .subjects
        .iter()
        .map(|(subject, topics)| SubjectView {
            subject: subject.to_owned(),
            topics: topics
                .topics
                .iter()
                .map(|(topic, lessons)| TopicView {
                    topic: topic.to_owned(),
                    subtopics: lessons
                        .entries
                        .iter()
                        .map(|entry| SubtopicView {
                            subtopic: entry.subtopic.clone(),
                            lessons: vec![entry.lesson.clone()],
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}
