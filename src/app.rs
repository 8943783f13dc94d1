//! Application root: the user and project stores, the dialog confirm paths
//! and the navigation surface.

use crate::config::Config;
use crate::dialog::{UserDraft, project_can_save};
use crate::editor::ProjectEditor;
use crate::error::{PlannerError, Result};
use crate::model::{ExpertiseArea, Project, User};
use crate::store::{PROJECTS_KEY, ProjectStore, RecordStore, Storage, USERS_KEY, UserStore};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static PROJECT_ROUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/projects/([^/]+)/?$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Users,
    Projects,
    Planning,
    Project(String),
}

impl Route {
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim();
        let route = match trimmed.trim_end_matches('/') {
            "" => Route::Home,
            "/users" => Route::Users,
            "/projects" => Route::Projects,
            "/planning" => Route::Planning,
            _ => {
                let caps = PROJECT_ROUTE_RE
                    .captures(trimmed)
                    .ok_or_else(|| PlannerError::Route(path.to_string()))?;
                Route::Project(caps[1].to_string())
            }
        };
        Ok(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Users => "/users".to_string(),
            Route::Projects => "/projects".to_string(),
            Route::Planning => "/planning".to_string(),
            Route::Project(id) => format!("/projects/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Read-only summary of one project for the planning page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub node_count: usize,
    pub link_count: usize,
    /// Nodes tagged with each area, in fixed area order.
    pub area_counts: Vec<(ExpertiseArea, usize)>,
}

impl ProjectSummary {
    pub fn of(project: &Project) -> Self {
        let area_counts = ExpertiseArea::ALL
            .iter()
            .map(|area| {
                let count = project
                    .nodes
                    .iter()
                    .filter(|node| node.expertise_areas.get(*area))
                    .count();
                (*area, count)
            })
            .collect();
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            node_count: project.nodes.len(),
            link_count: project.links.len(),
            area_counts,
        }
    }
}

/// Both record stores over one shared storage port.
pub struct Planner<S: Storage + Clone> {
    users: UserStore<S>,
    projects: ProjectStore<S>,
}

impl<S: Storage + Clone> Planner<S> {
    pub fn load(storage: S) -> Result<Self> {
        let users = RecordStore::load(USERS_KEY, storage.clone())?;
        let projects = RecordStore::load(PROJECTS_KEY, storage)?;
        Ok(Self { users, projects })
    }

    pub fn users(&self) -> &[User] {
        self.users.all()
    }

    pub fn projects(&self) -> &[Project] {
        self.projects.all()
    }

    pub fn user(&self, id: &str) -> Result<&User> {
        self.users
            .get(id)
            .ok_or_else(|| PlannerError::UserNotFound(id.to_string()))
    }

    pub fn project(&self, id: &str) -> Result<&Project> {
        self.projects
            .get(id)
            .ok_or_else(|| PlannerError::ProjectNotFound(id.to_string()))
    }

    /// Confirms the user dialog: a draft without id is added, any other
    /// replaces the user with its id.
    pub fn confirm_user(&mut self, draft: UserDraft) -> Result<String> {
        let user = draft.into_user()?;
        if user.id.is_empty() {
            return self.users.add(user);
        }
        let id = user.id.clone();
        if !self.users.edit(user)? {
            return Err(PlannerError::UserNotFound(id));
        }
        Ok(id)
    }

    pub fn confirm_project(&mut self, project: Project) -> Result<String> {
        if !project_can_save(&project) {
            return Err(PlannerError::InvalidDraft("project"));
        }
        if project.id.is_empty() {
            return self.projects.add(project);
        }
        let id = project.id.clone();
        if !self.projects.edit(project)? {
            return Err(PlannerError::ProjectNotFound(id));
        }
        Ok(id)
    }

    pub fn delete_user(&mut self, id: &str) -> Result<bool> {
        self.users.delete(id)
    }

    pub fn delete_project(&mut self, id: &str) -> Result<bool> {
        self.projects.delete(id)
    }

    /// Editing session over a copy of the stored project.
    pub fn open_project(&self, id: &str, config: Config) -> Result<ProjectEditor> {
        Ok(ProjectEditor::open(self.project(id)?.clone(), config))
    }

    pub fn planning_overview(&self) -> Vec<ProjectSummary> {
        self.projects.all().iter().map(ProjectSummary::of).collect()
    }
}
