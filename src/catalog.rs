use std::collections::HashMap;

use crate::formats::{Lesson, LessonRecord};

/// Ordered string-keyed container used for each level of the hierarchy.
#[derive(Debug, Clone)]
pub struct OrderedLevel<T> {
    nodes: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for OrderedLevel<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> OrderedLevel<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&idx| &self.nodes[idx].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the node for `key`, creating it with `make` on first use.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> T) -> &mut T {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.nodes.len();
                self.nodes.push((key.to_owned(), make()));
                self.index.insert(key.to_owned(), idx);
                idx
            }
        };
        &mut self.nodes[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.nodes.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonEntry {
    pub subtopic: String,
    pub lesson: Lesson,
}

#[derive(Debug, Clone, Default)]
pub struct Topic {
    pub entries: Vec<LessonEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct Subject {
    pub topics: OrderedLevel<Topic>,
}

#[derive(Debug, Clone, Default)]
pub struct Semester {
    pub subjects: OrderedLevel<Subject>,
}

#[derive(Debug, Clone, Default)]
pub struct Institution {
    pub semesters: OrderedLevel<Semester>,
}

/// Institution → semester → subject → topic → lessons, each level in
/// first-seen order. Built once by ingestion, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    institutions: OrderedLevel<Institution>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.institutions.is_empty()
    }

    pub fn institutions(&self) -> impl Iterator<Item = (&str, &Institution)> {
        self.institutions.iter()
    }

    pub fn institution(&self, name: &str) -> Option<&Institution> {
        self.institutions.get(name)
    }

    pub fn contains_institution(&self, name: &str) -> bool {
        self.institutions.contains_key(name)
    }

    pub fn institution_names(&self) -> Vec<String> {
        self.institutions.keys().map(str::to_owned).collect()
    }

    /// Registers an institution even if none of its rows turn out valid.
    pub fn ensure_institution(&mut self, name: &str) -> &mut Institution {
        self.institutions.get_or_insert_with(name, Institution::default)
    }

    /// Appends the record under its institution/semester/subject/topic path.
    ///
    /// Returns `false` (and leaves the catalog untouched) when a required field
    /// is blank.
    pub fn insert(&mut self, institution: &str, record: &LessonRecord) -> bool {
        if !record.is_valid() {
            return false;
        }

        let topic = self
            .ensure_institution(institution)
            .semesters
            .get_or_insert_with(&record.semester, Semester::default)
            .subjects
            .get_or_insert_with(&record.subject, Subject::default)
            .topics
            .get_or_insert_with(&record.topic, Topic::default);
        topic.entries.push(LessonEntry {
            subtopic: record.subtopic.clone(),
            lesson: record.lesson(),
        });
        true
    }

    pub fn lesson_count(&self) -> usize {
        self.institutions
            .iter()
            .map(|(_, institution)| institution.lesson_count())
            .sum()
    }
}

impl Institution {
    pub fn semester(&self, name: &str) -> Option<&Semester> {
        self.semesters.get(name)
    }

    pub fn semester_names(&self) -> Vec<String> {
        self.semesters.keys().map(str::to_owned).collect()
    }

    pub fn lesson_count(&self) -> usize {
        self.semesters
            .iter()
            .flat_map(|(_, semester)| semester.subjects.iter())
            .flat_map(|(_, subject)| subject.topics.iter())
            .map(|(_, topic)| topic.entries.len())
            .sum()
    }
}
