use planr::canvas::{Connection, EdgeChange, NodeChange};
use planr::diagram::{HandleSide, Point};
use planr::dialog::UserDraft;
use planr::{
    Config, ExpertiseArea, FileStorage, LayoutDirection, Planner, Project, ProjectEditor, Route,
};

fn add_node(editor: &mut ProjectEditor, name: &str, area: ExpertiseArea) -> String {
    let draft = editor.create_node();
    draft.set_name(name);
    draft.set_description(format!("{name} description"));
    draft.toggle_area(area);
    editor.save_node_dialog().expect("node saves")
}

#[test]
fn user_survives_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let id = {
        let mut planner = Planner::load(FileStorage::open(dir.path()).unwrap()).unwrap();
        let mut draft = UserDraft::blank();
        draft.set_name("Ana");
        draft.toggle_area(ExpertiseArea::Backend);
        planner.confirm_user(draft).unwrap()
    };

    let planner = Planner::load(FileStorage::open(dir.path()).unwrap()).unwrap();
    let user = planner.user(&id).unwrap();
    assert_eq!(user.name, "Ana");
    assert_eq!(user.expertise_areas.active(), vec![ExpertiseArea::Backend]);
    assert_eq!(id.len(), 9);
}

#[test]
fn project_graph_is_laid_out_and_persisted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut planner = Planner::load(FileStorage::open(dir.path()).unwrap()).unwrap();
    let project_id = planner
        .confirm_project(Project::new("Website", "Marketing site relaunch"))
        .unwrap();

    let mut editor = planner.open_project(&project_id, Config::default()).unwrap();
    let a = add_node(&mut editor, "A", ExpertiseArea::Backend);
    let b = add_node(&mut editor, "B", ExpertiseArea::Frontend);
    editor
        .connect(Connection::new(a.clone(), b.clone()).with_handles(HandleSide::Bottom, HandleSide::Top))
        .expect("edge added");
    editor.auto_layout(LayoutDirection::TopToBottom);
    planner.confirm_project(editor.finish()).unwrap();

    let reloaded = Planner::load(FileStorage::open(dir.path()).unwrap()).unwrap();
    let project = reloaded.project(&project_id).unwrap();
    assert_eq!(project.nodes.len(), 2);
    assert_eq!(project.links.len(), 1);
    assert_eq!(project.links[0].source, a);
    assert_eq!(project.links[0].target, b);
    assert!(project.node(&a).unwrap().y < project.node(&b).unwrap().y);
    assert_eq!(
        Route::parse(&format!("/projects/{project_id}")).unwrap(),
        Route::Project(project_id.clone())
    );
}

#[test]
fn horizontal_layout_orders_left_to_right() {
    let mut editor = ProjectEditor::open(Project::new("P", "d"), Config::default());
    let a = add_node(&mut editor, "First", ExpertiseArea::Qa);
    let b = add_node(&mut editor, "Second", ExpertiseArea::Qa);
    editor.connect(Connection::new(a.clone(), b.clone()));
    editor.auto_layout(LayoutDirection::LeftToRight);
    let project = editor.finish();
    assert!(project.node(&a).unwrap().x < project.node(&b).unwrap().x);
}

#[test]
fn removing_an_edge_and_dragging_converge_in_one_call() {
    let mut editor = ProjectEditor::open(Project::new("P", "d"), Config::default());
    let a = add_node(&mut editor, "A", ExpertiseArea::Mobile);
    let b = add_node(&mut editor, "B", ExpertiseArea::Mobile);
    let edge = editor.connect(Connection::new(a.clone(), b)).unwrap();

    editor.apply_edge_changes(vec![EdgeChange::Remove { id: edge }]);
    assert!(editor.project().links.is_empty());

    editor.apply_node_changes(vec![NodeChange::Position {
        id: a.clone(),
        position: Point::new(-40.0, 12.5),
        dragging: true,
    }]);
    let node = editor.project().node(&a).unwrap();
    assert_eq!((node.x, node.y), (-40.0, 12.5));
}
