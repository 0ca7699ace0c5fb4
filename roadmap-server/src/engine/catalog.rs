//! Static learning path templates
//!
//! The four paths are fixed at compile time. `PathId::ALL` is the canonical
//! order used for scoring output and for breaking ties between equal scores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four canned learning tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathId {
    Frontend,
    Backend,
    Mobile,
    DataScience,
}

impl PathId {
    /// Canonical enumeration order
    pub const ALL: [PathId; 4] = [
        PathId::Frontend,
        PathId::Backend,
        PathId::Mobile,
        PathId::DataScience,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PathId::Frontend => "frontend",
            PathId::Backend => "backend",
            PathId::Mobile => "mobile",
            PathId::DataScience => "data_science",
        }
    }

    fn index(self) -> usize {
        match self {
            PathId::Frontend => 0,
            PathId::Backend => 1,
            PathId::Mobile => 2,
            PathId::DataScience => 3,
        }
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathId::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown learning path: {}", s))
    }
}

/// A value per learning path, serialized as a map in canonical order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerPath<T> {
    pub frontend: T,
    pub backend: T,
    pub mobile: T,
    pub data_science: T,
}

impl<T> PerPath<T> {
    pub fn from_fn(mut f: impl FnMut(PathId) -> T) -> Self {
        Self {
            frontend: f(PathId::Frontend),
            backend: f(PathId::Backend),
            mobile: f(PathId::Mobile),
            data_science: f(PathId::DataScience),
        }
    }

    pub fn get(&self, path: PathId) -> &T {
        match path {
            PathId::Frontend => &self.frontend,
            PathId::Backend => &self.backend,
            PathId::Mobile => &self.mobile,
            PathId::DataScience => &self.data_science,
        }
    }

    pub fn get_mut(&mut self, path: PathId) -> &mut T {
        match path {
            PathId::Frontend => &mut self.frontend,
            PathId::Backend => &mut self.backend,
            PathId::Mobile => &mut self.mobile,
            PathId::DataScience => &mut self.data_science,
        }
    }

    /// Entries in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (PathId, &T)> {
        PathId::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerPath<U> {
        PerPath::from_fn(|p| f(self.get(p)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Skill taught in a stage; `level` runs 1 (beginner) to 3 (advanced)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSkill {
    pub name: String,
    pub level: u8,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub duration_weeks: u32,
    pub skills: Vec<StageSkill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathTemplate {
    pub name: String,
    pub description: String,
    pub duration_weeks: u32,
    pub difficulty: Difficulty,
    pub core_technologies: Vec<String>,
    pub stages: Vec<Stage>,
}

/// The built-in set of path templates, one per `PathId`
#[derive(Debug, Clone)]
pub struct PathCatalog {
    templates: [PathTemplate; 4],
}

impl PathCatalog {
    pub fn builtin() -> Self {
        Self {
            templates: [frontend(), backend(), mobile(), data_science()],
        }
    }

    pub fn get(&self, path: PathId) -> &PathTemplate {
        &self.templates[path.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PathId, &PathTemplate)> {
        PathId::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

impl Default for PathCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn skill(name: &str, level: u8, priority: Priority) -> StageSkill {
    StageSkill {
        name: name.to_string(),
        level,
        priority,
    }
}

fn stage(name: &str, duration_weeks: u32, skills: Vec<StageSkill>) -> Stage {
    Stage {
        name: name.to_string(),
        duration_weeks,
        skills,
    }
}

fn technologies(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn frontend() -> PathTemplate {
    use Priority::*;
    PathTemplate {
        name: "Frontend Development".to_string(),
        description: "Web development focused on user interfaces and user experience".to_string(),
        duration_weeks: 24,
        difficulty: Difficulty::Beginner,
        core_technologies: technologies(&["HTML", "CSS", "JavaScript", "React", "Vue"]),
        stages: vec![
            stage(
                "Foundations",
                8,
                vec![
                    skill("HTML5", 1, High),
                    skill("CSS3", 1, High),
                    skill("JavaScript basics", 1, High),
                    skill("DOM manipulation", 1, Medium),
                ],
            ),
            stage(
                "Intermediate",
                10,
                vec![
                    skill("React/Vue frameworks", 2, High),
                    skill("State management", 2, Medium),
                    skill("Frontend tooling", 2, Medium),
                    skill("Consuming APIs", 2, High),
                ],
            ),
            stage(
                "Advanced",
                6,
                vec![
                    skill("Performance optimization", 3, Medium),
                    skill("Testing frameworks", 3, Low),
                    skill("Micro-frontends", 3, Low),
                ],
            ),
        ],
    }
}

fn backend() -> PathTemplate {
    use Priority::*;
    PathTemplate {
        name: "Backend Development".to_string(),
        description: "Server-side logic, databases and API development".to_string(),
        duration_weeks: 26,
        difficulty: Difficulty::Intermediate,
        core_technologies: technologies(&["Python", "Node.js", "Database", "API", "Cloud"]),
        stages: vec![
            stage(
                "Foundations",
                10,
                vec![
                    skill("Python/Java/Node.js", 1, High),
                    skill("Database fundamentals", 1, High),
                    skill("HTTP protocol", 1, Medium),
                    skill("RESTful APIs", 1, High),
                ],
            ),
            stage(
                "Intermediate",
                12,
                vec![
                    skill("Framework development", 2, High),
                    skill("Database design", 2, High),
                    skill("Caching", 2, Medium),
                    skill("Message queues", 2, Medium),
                ],
            ),
            stage(
                "Advanced",
                4,
                vec![
                    skill("Microservice architecture", 3, Medium),
                    skill("Container deployment", 3, Medium),
                    skill("Performance optimization", 3, Low),
                ],
            ),
        ],
    }
}

fn mobile() -> PathTemplate {
    use Priority::*;
    PathTemplate {
        name: "Mobile Development".to_string(),
        description: "iOS and Android application development".to_string(),
        duration_weeks: 28,
        difficulty: Difficulty::Intermediate,
        core_technologies: technologies(&["React Native", "Flutter", "Swift", "Kotlin"]),
        stages: vec![
            stage(
                "Foundations",
                12,
                vec![
                    skill("Mobile development basics", 1, High),
                    skill("React Native/Flutter", 1, High),
                    skill("Mobile UI design", 1, Medium),
                ],
            ),
            stage(
                "Intermediate",
                12,
                vec![
                    skill("Native feature integration", 2, High),
                    skill("State management", 2, Medium),
                    skill("Data persistence", 2, High),
                ],
            ),
            stage(
                "Advanced",
                4,
                vec![
                    skill("Performance optimization", 3, Medium),
                    skill("App store release", 3, High),
                ],
            ),
        ],
    }
}

fn data_science() -> PathTemplate {
    use Priority::*;
    PathTemplate {
        name: "Data Science".to_string(),
        description: "Data analysis, machine learning and AI applications".to_string(),
        duration_weeks: 30,
        difficulty: Difficulty::Advanced,
        core_technologies: technologies(&["Python", "SQL", "Machine Learning", "Statistics"]),
        stages: vec![
            stage(
                "Foundations",
                12,
                vec![
                    skill("Data processing in Python", 1, High),
                    skill("SQL databases", 1, High),
                    skill("Statistics fundamentals", 1, High),
                    skill("Data visualization", 1, Medium),
                ],
            ),
            stage(
                "Intermediate",
                14,
                vec![
                    skill("Machine learning algorithms", 2, High),
                    skill("Feature engineering", 2, High),
                    skill("Model evaluation", 2, High),
                    skill("Deep learning basics", 2, Medium),
                ],
            ),
            stage(
                "Advanced",
                4,
                vec![
                    skill("Applied deep learning", 3, Medium),
                    skill("Model deployment", 3, High),
                    skill("MLOps", 3, Low),
                ],
            ),
        ],
    }
}
