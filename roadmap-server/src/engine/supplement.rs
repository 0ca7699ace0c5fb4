//! Supplementary skill suggestions per chosen path

use serde::{Deserialize, Serialize};

use super::catalog::{PathId, Priority};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplementarySkill {
    pub name: String,
    pub priority: Priority,
    pub reason: String,
}

fn suggestion(name: &str, priority: Priority, reason: &str) -> SupplementarySkill {
    SupplementarySkill {
        name: name.to_string(),
        priority,
        reason: reason.to_string(),
    }
}

pub fn supplementary_skills(path: PathId) -> Vec<SupplementarySkill> {
    use Priority::*;
    match path {
        PathId::Frontend => vec![
            suggestion("Design fundamentals", Medium, "Strengthens UI/UX work"),
            suggestion("Backend basics", Low, "Path towards full-stack development"),
        ],
        PathId::Backend => vec![
            suggestion("Frontend basics", Medium, "Understand the full stack"),
            suggestion("DevOps basics", Medium, "Deploy and operate your services"),
        ],
        PathId::Mobile => vec![
            suggestion("Backend API design", Medium, "Smoother client/server collaboration"),
            suggestion("UI/UX design", High, "Mobile user experience"),
        ],
        PathId::DataScience => vec![
            suggestion("Cloud platforms", Medium, "Large-scale data processing"),
            suggestion("Web development basics", Low, "Ship data products"),
        ],
    }
}
