//! Static subject/topic catalog for browsing.
//!
//! The backend owns the authoritative catalog; this local copy lets the app
//! render the browse screens without a network round-trip and seeds the
//! subject/topic arguments for study-material requests.

use sm_api_types::{Subject, Topic};

fn topic(id: &str, name: &str, subtopics: &[&str]) -> Topic {
    Topic {
        id: id.to_string(),
        name: name.to_string(),
        subtopics: subtopics.iter().map(|s| s.to_string()).collect(),
    }
}

/// All subjects available for browsing, in display order.
pub fn subjects() -> Vec<Subject> {
    vec![
        Subject {
            id: "math".into(),
            name: "Mathematics".into(),
            description: Some("Arithmetic through calculus".into()),
            topics: vec![
                topic("algebra", "Algebra", &["linear equations", "quadratics", "polynomials"]),
                topic("geometry", "Geometry", &["triangles", "circles", "solids"]),
                topic("calculus", "Calculus", &["limits", "derivatives", "integrals"]),
            ],
        },
        Subject {
            id: "science".into(),
            name: "Science".into(),
            description: Some("Biology, chemistry, and physics".into()),
            topics: vec![
                topic("biology", "Biology", &["cells", "genetics", "ecology"]),
                topic("chemistry", "Chemistry", &["atoms", "bonding", "reactions"]),
                topic("physics", "Physics", &["mechanics", "electricity", "waves"]),
            ],
        },
        Subject {
            id: "history".into(),
            name: "History".into(),
            description: Some("World and regional history".into()),
            topics: vec![
                topic("ancient", "Ancient History", &["egypt", "greece", "rome"]),
                topic("modern", "Modern History", &["industrial era", "world wars"]),
            ],
        },
        Subject {
            id: "languages".into(),
            name: "Languages".into(),
            description: Some("Vocabulary and grammar practice".into()),
            topics: vec![
                topic("spanish", "Spanish", &["vocabulary", "verb conjugation"]),
                topic("french", "French", &["vocabulary", "verb conjugation"]),
            ],
        },
    ]
}

/// Look up a subject by id or (case-insensitive) display name.
pub fn find_subject(key: &str) -> Option<Subject> {
    let key_lower = key.to_lowercase();
    subjects()
        .into_iter()
        .find(|s| s.id == key_lower || s.name.to_lowercase() == key_lower)
}

/// Look up a topic within a subject by id or display name.
pub fn find_topic(subject: &Subject, key: &str) -> Option<Topic> {
    let key_lower = key.to_lowercase();
    subject
        .topics
        .iter()
        .find(|t| t.id == key_lower || t.name.to_lowercase() == key_lower)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_non_empty_and_has_topics() {
        let all = subjects();
        assert!(all.len() >= 3);
        assert!(all.iter().all(|s| !s.topics.is_empty()));
    }

    #[test]
    fn find_subject_by_id_and_name() {
        assert_eq!(find_subject("math").unwrap().name, "Mathematics");
        assert_eq!(find_subject("Mathematics").unwrap().id, "math");
        assert!(find_subject("underwater basket weaving").is_none());
    }

    #[test]
    fn find_topic_within_subject() {
        let science = find_subject("science").unwrap();
        let bio = find_topic(&science, "Biology").unwrap();
        assert_eq!(bio.id, "biology");
        assert!(bio.subtopics.contains(&"cells".to_string()));
        assert!(find_topic(&science, "algebra").is_none());
    }
}
