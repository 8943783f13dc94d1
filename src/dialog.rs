//! Edit drafts behind the node, user and project dialogs.
//!
//! Saving is gated rather than validated: a draft reports `can_save()` and
//! the save paths refuse drafts that would fail it.

use crate::config::CardMetrics;
use crate::diagram::Point;
use crate::error::{PlannerError, Result};
use crate::footprint::footprint;
use crate::model::{ExpertiseArea, ExpertiseAreas, Project, ProjectNode, User, new_id};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraft {
    pub id: String,
    pub name: String,
    pub description: String,
    pub expertise_areas: ExpertiseAreas,
    pub x: f64,
    pub y: f64,
}

impl NodeDraft {
    /// Blank draft; the empty id marks it as a node still to be created.
    pub fn blank() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            expertise_areas: ExpertiseAreas::none_set(),
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn from_node(node: &ProjectNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            description: node.description.clone(),
            expertise_areas: node.expertise_areas,
            x: node.x,
            y: node.y,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn toggle_area(&mut self, area: ExpertiseArea) {
        self.expertise_areas.toggle(area);
    }

    pub fn can_save(&self) -> bool {
        !self.name.is_empty() && !self.description.is_empty() && self.expertise_areas.any()
    }

    pub fn title(&self) -> String {
        titled("Node", &self.name)
    }

    /// Writes the draft into `project`. A new node gets a fresh id and is
    /// centered on `center`; an existing one replaces the node with its id.
    pub fn save_into(&self, project: &mut Project, center: Point, metrics: &CardMetrics) -> Result<String> {
        if !self.can_save() {
            return Err(PlannerError::InvalidDraft("node"));
        }
        if self.is_new() {
            let size = footprint(&self.name, &self.description, &self.expertise_areas, metrics);
            let node = ProjectNode {
                id: new_id(),
                name: self.name.clone(),
                description: self.description.clone(),
                expertise_areas: self.expertise_areas,
                x: center.x - size.width / 2.0,
                y: center.y - size.height / 2.0,
            };
            let id = node.id.clone();
            project.nodes.push(node);
            return Ok(id);
        }
        let slot = project
            .nodes
            .iter_mut()
            .find(|node| node.id == self.id)
            .ok_or_else(|| PlannerError::NodeNotFound(self.id.clone()))?;
        *slot = ProjectNode {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            expertise_areas: self.expertise_areas,
            x: self.x,
            y: self.y,
        };
        Ok(self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub user: User,
}

impl UserDraft {
    pub fn blank() -> Self {
        Self {
            user: User::new("", ExpertiseAreas::none_set()),
        }
    }

    pub fn edit(user: &User) -> Self {
        Self { user: user.clone() }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.user.name = name.into();
    }

    pub fn toggle_area(&mut self, area: ExpertiseArea) {
        self.user.expertise_areas.toggle(area);
    }

    pub fn can_save(&self) -> bool {
        !self.user.name.is_empty() && self.user.expertise_areas.any()
    }

    pub fn into_user(self) -> Result<User> {
        if !self.can_save() {
            return Err(PlannerError::InvalidDraft("user"));
        }
        Ok(self.user)
    }
}

pub fn project_can_save(project: &Project) -> bool {
    !project.name.is_empty() && !project.description.is_empty()
}

pub fn project_title(project: &Project) -> String {
    titled("Project", &project.name)
}

fn titled(kind: &str, name: &str) -> String {
    if name.is_empty() {
        kind.to_string()
    } else {
        format!("{kind} - {name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> NodeDraft {
        let mut draft = NodeDraft::blank();
        draft.set_name("Auth");
        draft.set_description("login service");
        draft.toggle_area(ExpertiseArea::Backend);
        draft
    }

    #[test]
    fn node_save_gating() {
        let mut draft = filled();
        assert!(draft.can_save());
        draft.set_description("");
        assert!(!draft.can_save());

        let mut draft = filled();
        draft.set_name("");
        assert!(!draft.can_save());

        let mut draft = filled();
        draft.toggle_area(ExpertiseArea::Backend);
        assert!(!draft.can_save());
    }

    #[test]
    fn user_save_gating_ignores_description() {
        let mut draft = UserDraft::blank();
        assert!(!draft.can_save());
        draft.set_name("Ana");
        assert!(!draft.can_save());
        draft.toggle_area(ExpertiseArea::Qa);
        assert!(draft.can_save());
    }

    #[test]
    fn new_node_is_centered_on_viewport() {
        let metrics = CardMetrics::default();
        let draft = filled();
        let mut project = Project::new("P", "d");
        let id = draft
            .save_into(&mut project, Point::new(400.0, 300.0), &metrics)
            .unwrap();
        let node = project.node(&id).unwrap();
        let size = footprint(&node.name, &node.description, &node.expertise_areas, &metrics);
        assert!((node.x + size.width / 2.0 - 400.0).abs() < 1e-9);
        assert!((node.y + size.height / 2.0 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn existing_node_is_replaced_by_id() {
        let metrics = CardMetrics::default();
        let mut project = Project::new("P", "d");
        let id = filled()
            .save_into(&mut project, Point::default(), &metrics)
            .unwrap();
        let mut draft = NodeDraft::from_node(project.node(&id).unwrap());
        draft.set_name("Auth v2");
        draft.save_into(&mut project, Point::default(), &metrics).unwrap();
        assert_eq!(project.nodes.len(), 1);
        assert_eq!(project.nodes[0].name, "Auth v2");
    }

    #[test]
    fn invalid_draft_leaves_project_untouched() {
        let mut project = Project::new("P", "d");
        let result = NodeDraft::blank().save_into(&mut project, Point::default(), &CardMetrics::default());
        assert!(matches!(result, Err(PlannerError::InvalidDraft("node"))));
        assert!(project.nodes.is_empty());
    }

    #[test]
    fn titles_include_name_when_present() {
        assert_eq!(NodeDraft::blank().title(), "Node");
        assert_eq!(filled().title(), "Node - Auth");
        assert!(!project_can_save(&Project::new("P", "")));
        assert_eq!(project_title(&Project::new("P", "")), "Project - P");
    }
}
