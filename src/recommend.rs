// Upskilling recommendations for missing job skills.
//
// A small course catalog keyed by normalized skill token. The first few
// missing skills (in job-description order) each get a course from the
// catalog, or a generic "learn it" hint when the catalog has no entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How many missing skills get a recommendation unless the caller says otherwise.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 3;

const DEFAULT_COURSES: [(&str, &str, &str); 7] = [
    (
        "aws",
        "AWS Cloud Services",
        "Complete AWS Certified Solutions Architect course",
    ),
    (
        "machine learning",
        "Advanced Machine Learning",
        "Enroll in Advanced ML for Data Science program",
    ),
    (
        "project management",
        "Project Management",
        "Consider PMP certification for leadership skills",
    ),
    (
        "sql",
        "Advanced SQL",
        "Master SQL for data analysis and database management",
    ),
    (
        "communication",
        "Communication Skills",
        "Improve presentation and communication skills",
    ),
    (
        "docker",
        "Docker & Containers",
        "Learn containerization with Docker and Kubernetes",
    ),
    (
        "tensorflow",
        "TensorFlow Deep Learning",
        "Master deep learning with TensorFlow",
    ),
];

/// A suggested next step for one missing skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub skill: String,
    pub title: String,
    pub action: String,
}

#[derive(Debug, Clone)]
struct Course {
    title: String,
    action: String,
}

/// Skill token -> course lookup.
#[derive(Debug, Clone)]
pub struct CourseCatalog {
    courses: HashMap<String, Course>,
}

impl Default for CourseCatalog {
    fn default() -> Self {
        DEFAULT_COURSES
            .iter()
            .fold(Self::empty(), |catalog, (skill, title, action)| {
                catalog.with_course(skill, title, action)
            })
    }
}

impl CourseCatalog {
    /// A catalog with no courses: every recommendation uses the generic hint.
    pub fn empty() -> Self {
        Self {
            courses: HashMap::new(),
        }
    }

    /// Add (or replace) the course for a skill. The key is lower-cased with
    /// whitespace collapsed, matching normalized skill tokens.
    pub fn with_course(mut self, skill: &str, title: &str, action: &str) -> Self {
        self.courses.insert(
            key(skill),
            Course {
                title: title.to_string(),
                action: action.to_string(),
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Recommendations for the first `limit` missing skills, in order.
    pub fn recommend(&self, missing: &[String], limit: usize) -> Vec<Recommendation> {
        missing
            .iter()
            .take(limit)
            .map(|skill| match self.courses.get(&key(skill)) {
                Some(course) => Recommendation {
                    skill: skill.clone(),
                    title: course.title.clone(),
                    action: course.action.clone(),
                },
                None => Recommendation {
                    skill: skill.clone(),
                    title: skill.clone(),
                    action: format!("Learn {skill} to match job requirements"),
                },
            })
            .collect()
    }
}

fn key(skill: &str) -> String {
    skill
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
