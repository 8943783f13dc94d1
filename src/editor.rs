//! A project editing session: the working copy of a project, the canvas
//! built from it and the node dialog, kept convergent after every call.

use crate::canvas::{Canvas, Connection, EdgeChange, NodeChange, Viewport};
use crate::config::Config;
use crate::diagram::to_diagram;
use crate::dialog::{NodeDraft, project_can_save, project_title};
use crate::error::{PlannerError, Result};
use crate::layout::{LayoutDirection, layout_nodes};
use crate::model::Project;
use crate::sync::{Origin, reconcile};
use log::debug;

pub struct ProjectEditor {
    project: Project,
    canvas: Canvas,
    node_dialog: Option<NodeDraft>,
    config: Config,
}

impl ProjectEditor {
    /// Session for a project that does not exist yet.
    pub fn new(config: Config) -> Self {
        Self::open(Project::new("", ""), config)
    }

    pub fn open(project: Project, config: Config) -> Self {
        let (nodes, edges) = to_diagram(&project);
        let viewport = Viewport::new(config.canvas.width, config.canvas.height);
        let mut canvas = Canvas::new(nodes, edges, viewport);
        canvas.fit_view(&config.card, config.canvas.fit_padding, config.canvas.fit_max_zoom);
        Self {
            project,
            canvas,
            node_dialog: None,
            config,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.project.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.project.description = description.into();
    }

    pub fn can_save(&self) -> bool {
        project_can_save(&self.project)
    }

    pub fn title(&self) -> String {
        project_title(&self.project)
    }

    /// Opens the node dialog with a blank draft.
    pub fn create_node(&mut self) -> &mut NodeDraft {
        self.node_dialog.insert(NodeDraft::blank())
    }

    /// Opens the node dialog on the double-clicked node, if it is a project node.
    pub fn double_click(&mut self, id: &str) -> Option<&mut NodeDraft> {
        let id = self.canvas.double_click(id)?;
        let node = self.project.node(&id)?;
        Some(self.node_dialog.insert(NodeDraft::from_node(node)))
    }

    pub fn node_dialog(&self) -> Option<&NodeDraft> {
        self.node_dialog.as_ref()
    }

    pub fn node_dialog_mut(&mut self) -> Option<&mut NodeDraft> {
        self.node_dialog.as_mut()
    }

    pub fn close_node_dialog(&mut self) {
        self.node_dialog = None;
    }

    /// Saves the open draft into the project and closes the dialog. A draft
    /// that cannot be saved leaves the dialog open and the project untouched.
    pub fn save_node_dialog(&mut self) -> Result<String> {
        let draft = self
            .node_dialog
            .as_ref()
            .ok_or(PlannerError::InvalidDraft("node"))?;
        let center = self.canvas.viewport_center();
        let id = draft.save_into(&mut self.project, center, &self.config.card)?;
        self.node_dialog = None;
        reconcile(&mut self.project, &mut self.canvas, Origin::Domain);
        Ok(id)
    }

    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) {
        self.canvas.apply_node_changes(changes);
        reconcile(&mut self.project, &mut self.canvas, Origin::Canvas);
    }

    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) {
        self.canvas.apply_edge_changes(changes);
        reconcile(&mut self.project, &mut self.canvas, Origin::Canvas);
    }

    pub fn connect(&mut self, connection: Connection) -> Option<String> {
        let id = self.canvas.connect(connection)?;
        reconcile(&mut self.project, &mut self.canvas, Origin::Canvas);
        Some(id)
    }

    /// Wraps the selected project nodes in a new area node.
    pub fn selection_end(&mut self, selected: &[String]) -> Option<String> {
        let id = self
            .canvas
            .selection_end(selected, &self.config.card, self.config.layout.area_padding)?;
        reconcile(&mut self.project, &mut self.canvas, Origin::Canvas);
        Some(id)
    }

    /// Replaces every project node position with the layout result and
    /// writes the positions back to the project.
    pub fn auto_layout(&mut self, direction: LayoutDirection) {
        self.canvas.nodes = layout_nodes(
            &self.canvas.nodes,
            &self.canvas.edges,
            direction,
            &self.config.layout,
            &self.config.card,
        );
        let passes = reconcile(&mut self.project, &mut self.canvas, Origin::Canvas);
        debug!("auto layout {direction:?}: {passes} reconcile passes");
        self.canvas
            .fit_view(&self.config.card, self.config.canvas.fit_padding, self.config.canvas.fit_max_zoom);
    }

    /// Ends the session; the result is what the project dialog confirms.
    pub fn finish(self) -> Project {
        self.project
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{HandleSide, Point};
    use crate::model::ExpertiseArea;

    fn add_node(editor: &mut ProjectEditor, name: &str) -> String {
        let draft = editor.create_node();
        draft.set_name(name);
        draft.set_description(format!("{name} work"));
        draft.toggle_area(ExpertiseArea::Frontend);
        editor.save_node_dialog().unwrap()
    }

    #[test]
    fn saved_node_appears_on_canvas() {
        let mut editor = ProjectEditor::new(Config::default());
        let id = add_node(&mut editor, "A");
        assert!(editor.node_dialog().is_none());
        assert_eq!(editor.project().nodes.len(), 1);
        assert!(editor.canvas().node(&id).is_some());
    }

    #[test]
    fn unsavable_draft_keeps_dialog_open() {
        let mut editor = ProjectEditor::new(Config::default());
        editor.create_node().set_name("A");
        assert!(editor.save_node_dialog().is_err());
        assert!(editor.node_dialog().is_some());
        assert!(editor.project().nodes.is_empty());
    }

    #[test]
    fn connect_and_drag_write_back() {
        let mut editor = ProjectEditor::new(Config::default());
        let a = add_node(&mut editor, "A");
        let b = add_node(&mut editor, "B");
        editor
            .connect(Connection::new(a.clone(), b.clone()).with_handles(HandleSide::Bottom, HandleSide::Top))
            .unwrap();
        assert_eq!(editor.project().links.len(), 1);
        assert_eq!(editor.project().links[0].source_handle.as_deref(), Some("bottom"));

        editor.apply_node_changes(vec![NodeChange::Position {
            id: b.clone(),
            position: Point::new(10.0, 500.0),
            dragging: false,
        }]);
        let node = editor.project().node(&b).unwrap();
        assert_eq!((node.x, node.y), (10.0, 500.0));
    }

    #[test]
    fn double_click_edits_existing_node() {
        let mut editor = ProjectEditor::new(Config::default());
        let a = add_node(&mut editor, "A");
        editor.double_click(&a).unwrap().set_name("Alpha");
        editor.save_node_dialog().unwrap();
        assert_eq!(editor.project().nodes.len(), 1);
        assert_eq!(editor.project().node(&a).unwrap().name, "Alpha");
        let data = editor.canvas().node(&a).unwrap().project_data().unwrap();
        assert_eq!(data.name, "Alpha");
    }

    #[test]
    fn vertical_layout_orders_dependency_downwards() {
        let mut editor = ProjectEditor::new(Config::default());
        let a = add_node(&mut editor, "A");
        let b = add_node(&mut editor, "B");
        editor.connect(Connection::new(a.clone(), b.clone()));
        editor.auto_layout(LayoutDirection::TopToBottom);
        let project = editor.finish();
        assert!(project.node(&a).unwrap().y < project.node(&b).unwrap().y);
        assert_eq!(project.links.len(), 1);
    }

    #[test]
    fn area_stays_on_canvas_only() {
        let mut editor = ProjectEditor::new(Config::default());
        let a = add_node(&mut editor, "A");
        let area = editor.selection_end(&[a]).unwrap();
        assert!(editor.canvas().node(&area).unwrap().is_area());
        assert_eq!(editor.project().nodes.len(), 1);
        assert!(editor.selection_end(&[]).is_none());
    }
}
