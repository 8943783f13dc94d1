use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a random base-36 record id.
pub fn new_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpertiseArea {
    Frontend,
    Backend,
    Mobile,
    DevOps,
    Qa,
    Other,
}

impl ExpertiseArea {
    pub const ALL: [ExpertiseArea; 6] = [
        ExpertiseArea::Frontend,
        ExpertiseArea::Backend,
        ExpertiseArea::Mobile,
        ExpertiseArea::DevOps,
        ExpertiseArea::Qa,
        ExpertiseArea::Other,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Mobile => "mobile",
            Self::DevOps => "devOps",
            Self::Qa => "qa",
            Self::Other => "other",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let lower = token.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|area| area.key().to_ascii_lowercase() == lower)
    }

    /// Chip label: short keys are upper-cased, longer ones get a capital first letter.
    pub fn label(self) -> String {
        let key = self.key();
        if key.len() > 2 {
            let mut chars = key.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        } else {
            key.to_ascii_uppercase()
        }
    }
}

impl fmt::Display for ExpertiseArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Fixed-key flag map over every [`ExpertiseArea`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpertiseAreas {
    pub frontend: bool,
    pub backend: bool,
    pub mobile: bool,
    pub dev_ops: bool,
    pub qa: bool,
    pub other: bool,
}

impl ExpertiseAreas {
    pub fn none_set() -> Self {
        Self::default()
    }

    pub fn with(areas: &[ExpertiseArea]) -> Self {
        let mut flags = Self::default();
        for area in areas {
            flags.set(*area, true);
        }
        flags
    }

    pub fn get(&self, area: ExpertiseArea) -> bool {
        match area {
            ExpertiseArea::Frontend => self.frontend,
            ExpertiseArea::Backend => self.backend,
            ExpertiseArea::Mobile => self.mobile,
            ExpertiseArea::DevOps => self.dev_ops,
            ExpertiseArea::Qa => self.qa,
            ExpertiseArea::Other => self.other,
        }
    }

    pub fn set(&mut self, area: ExpertiseArea, value: bool) {
        let slot = match area {
            ExpertiseArea::Frontend => &mut self.frontend,
            ExpertiseArea::Backend => &mut self.backend,
            ExpertiseArea::Mobile => &mut self.mobile,
            ExpertiseArea::DevOps => &mut self.dev_ops,
            ExpertiseArea::Qa => &mut self.qa,
            ExpertiseArea::Other => &mut self.other,
        };
        *slot = value;
    }

    pub fn toggle(&mut self, area: ExpertiseArea) {
        self.set(area, !self.get(area));
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExpertiseArea, bool)> + '_ {
        ExpertiseArea::ALL.into_iter().map(|area| (area, self.get(area)))
    }

    pub fn active(&self) -> Vec<ExpertiseArea> {
        self.iter()
            .filter(|(_, on)| *on)
            .map(|(area, _)| area)
            .collect()
    }

    pub fn any(&self) -> bool {
        self.iter().any(|(_, on)| on)
    }

    pub fn is_empty(&self) -> bool {
        !self.any()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub expertise_areas: ExpertiseAreas,
}

impl User {
    pub fn new(name: impl Into<String>, expertise_areas: ExpertiseAreas) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            expertise_areas,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expertise_areas: ExpertiseAreas,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLink {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl ProjectLink {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectUserBrush {
    pub user: User,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<ProjectNode>,
    #[serde(default)]
    pub links: Vec<ProjectLink>,
    #[serde(default)]
    pub user_areas: Vec<ProjectUserBrush>,
}

impl Project {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: description.into(),
            nodes: Vec::new(),
            links: Vec::new(),
            user_areas: Vec::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&ProjectNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Links whose source or target does not name a node of this project.
    pub fn dangling_links(&self) -> Vec<&ProjectLink> {
        self.links
            .iter()
            .filter(|link| self.node(&link.source).is_none() || self.node(&link.target).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_nine_base36_chars() {
        let id = new_id();
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn area_labels_follow_chip_rules() {
        assert_eq!(ExpertiseArea::Qa.label(), "QA");
        assert_eq!(ExpertiseArea::DevOps.label(), "DevOps");
        assert_eq!(ExpertiseArea::Frontend.label(), "Frontend");
    }

    #[test]
    fn expertise_areas_serialize_with_fixed_keys() {
        let areas = ExpertiseAreas::with(&[ExpertiseArea::DevOps]);
        let json = serde_json::to_value(areas).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "frontend": false,
                "backend": false,
                "mobile": false,
                "devOps": true,
                "qa": false,
                "other": false,
            })
        );
    }

    #[test]
    fn toggle_flips_one_flag() {
        let mut areas = ExpertiseAreas::none_set();
        assert!(areas.is_empty());
        areas.toggle(ExpertiseArea::Backend);
        assert_eq!(areas.active(), vec![ExpertiseArea::Backend]);
        areas.toggle(ExpertiseArea::Backend);
        assert!(!areas.any());
    }

    #[test]
    fn area_tokens_are_case_insensitive() {
        assert_eq!(ExpertiseArea::from_token("DEVOPS"), Some(ExpertiseArea::DevOps));
        assert_eq!(ExpertiseArea::from_token("qa"), Some(ExpertiseArea::Qa));
        assert_eq!(ExpertiseArea::from_token("design"), None);
    }

    #[test]
    fn project_loads_with_missing_optional_fields() {
        let project: Project = serde_json::from_str(r#"{"id":"p1","name":"Site"}"#).unwrap();
        assert_eq!(project.description, "");
        assert!(project.nodes.is_empty());
        assert!(project.user_areas.is_empty());
    }

    #[test]
    fn link_handles_are_omitted_when_absent() {
        let link = ProjectLink::new("l1", "a", "b");
        let json = serde_json::to_string(&link).unwrap();
        assert_eq!(json, r#"{"id":"l1","source":"a","target":"b"}"#);
    }

    #[test]
    fn dangling_links_are_reported() {
        let mut project = Project::new("P", "d");
        project.nodes.push(ProjectNode {
            id: "a".into(),
            name: "A".into(),
            description: "a".into(),
            expertise_areas: ExpertiseAreas::default(),
            x: 0.0,
            y: 0.0,
        });
        project.links.push(ProjectLink::new("l1", "a", "gone"));
        assert_eq!(project.dangling_links().len(), 1);
    }
}
