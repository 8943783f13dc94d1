use crate::app::{Planner, Route};
use crate::canvas::Connection;
use crate::config::{Config, load_config};
use crate::diagram::HandleSide;
use crate::dialog::{NodeDraft, UserDraft};
use crate::layout::LayoutDirection;
use crate::layout_dump::write_layout_dump;
use crate::logging::init_logging;
use crate::model::{ExpertiseArea, ExpertiseAreas, Project};
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output_svg};
use crate::store::FileStorage;
use anyhow::{Context, Result, anyhow, bail};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "planr", version, about = "Project and resource planning on a dependency canvas")]
pub struct Args {
    /// Directory holding users.json and projects.json
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace); defaults to RUST_LOG
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Add or edit project nodes
    #[command(subcommand)]
    Node(NodeCommand),
    /// Connect project nodes
    #[command(subcommand)]
    Link(LinkCommand),
    /// Wrap nodes in an area and render the result
    Area {
        project: String,
        /// Node ids inside the selection
        #[arg(required = true)]
        nodes: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Auto-layout a project and store the new positions
    Layout {
        project: String,
        #[arg(long = "direction", value_enum, default_value = "vertical")]
        direction: Direction,
        /// Write the laid-out canvas as JSON
        #[arg(long = "dump")]
        dump: Option<PathBuf>,
    },
    /// Render a project canvas
    Render {
        project: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Per-project overview as JSON
    Planning,
    /// Resolve a navigation path
    Route { path: String },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Add {
        #[arg(long)]
        name: String,
        /// Comma-separated expertise areas
        #[arg(long, value_delimiter = ',')]
        areas: Vec<String>,
    },
    List,
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// Areas to switch on or off
        #[arg(long, value_delimiter = ',')]
        toggle: Vec<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    List,
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommand {
    Add {
        project: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long, value_delimiter = ',')]
        areas: Vec<String>,
    },
    Edit {
        project: String,
        node: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_delimiter = ',')]
        toggle: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LinkCommand {
    Add {
        project: String,
        source: String,
        target: String,
        #[arg(long = "source-handle")]
        source_handle: Option<String>,
        #[arg(long = "target-handle")]
        target_handle: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
pub struct OutputArgs {
    /// Output file. Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Direction {
    Vertical,
    Horizontal,
}

impl From<Direction> for LayoutDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Vertical => LayoutDirection::TopToBottom,
            Direction::Horizontal => LayoutDirection::LeftToRight,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref()).map_err(|err| anyhow!(err))?;

    let mut config = load_config(args.config.as_deref())
        .with_context(|| format!("loading config {:?}", args.config))?;
    if let Some(dir) = args.data_dir {
        config.storage.data_dir = dir;
    }
    let storage = FileStorage::open(&config.storage.data_dir)
        .with_context(|| format!("opening data dir {}", config.storage.data_dir.display()))?;
    let mut planner = Planner::load(storage)?;

    match args.command {
        Command::User(command) => run_user(&mut planner, command),
        Command::Project(command) => run_project(&mut planner, command),
        Command::Node(command) => run_node(&mut planner, &config, command),
        Command::Link(LinkCommand::Add {
            project,
            source,
            target,
            source_handle,
            target_handle,
        }) => {
            let mut editor = planner.open_project(&project, config)?;
            let mut connection = Connection::new(source, target);
            connection.source_handle = source_handle.as_deref().map(parse_handle).transpose()?;
            connection.target_handle = target_handle.as_deref().map(parse_handle).transpose()?;
            let id = editor
                .connect(connection)
                .ok_or_else(|| anyhow!("connection rejected: unknown node or identical link"))?;
            planner.confirm_project(editor.finish())?;
            println!("{id}");
            Ok(())
        }
        Command::Area {
            project,
            nodes,
            output,
        } => {
            let mut editor = planner.open_project(&project, config)?;
            let id = editor
                .selection_end(&nodes)
                .ok_or_else(|| anyhow!("none of the selected nodes are in project {project}"))?;
            eprintln!("{id}");
            let svg = render_svg(editor.canvas(), &editor.config().theme, editor.config());
            write_render(&svg, &output, editor.config())
        }
        Command::Layout {
            project,
            direction,
            dump,
        } => {
            let direction = LayoutDirection::from(direction);
            let mut editor = planner.open_project(&project, config)?;
            editor.auto_layout(direction);
            if let Some(path) = dump {
                write_layout_dump(&path, editor.canvas(), direction, &editor.config().card)?;
            }
            planner.confirm_project(editor.finish())?;
            Ok(())
        }
        Command::Render { project, output } => {
            let editor = planner.open_project(&project, config)?;
            let svg = render_svg(editor.canvas(), &editor.config().theme, editor.config());
            write_render(&svg, &output, editor.config())
        }
        Command::Planning => {
            println!("{}", serde_json::to_string_pretty(&planner.planning_overview())?);
            Ok(())
        }
        Command::Route { path } => {
            let route = Route::parse(&path)?;
            match &route {
                Route::Project(id) => {
                    let project = planner.project(id)?;
                    println!("{route} -> project {}", project.name);
                }
                _ => println!("{route} -> {route:?}"),
            }
            Ok(())
        }
    }
}

fn run_user(planner: &mut Planner<FileStorage>, command: UserCommand) -> Result<()> {
    match command {
        UserCommand::Add { name, areas } => {
            let mut draft = UserDraft::blank();
            draft.set_name(name);
            draft.user.expertise_areas = parse_areas(&areas)?;
            println!("{}", planner.confirm_user(draft)?);
        }
        UserCommand::List => {
            for user in planner.users() {
                let areas: Vec<String> = user.expertise_areas.active().into_iter().map(|a| a.label()).collect();
                println!("{}\t{}\t{}", user.id, user.name, areas.join(", "));
            }
        }
        UserCommand::Edit { id, name, toggle } => {
            let mut draft = UserDraft::edit(planner.user(&id)?);
            if let Some(name) = name {
                draft.set_name(name);
            }
            for area in parse_area_list(&toggle)? {
                draft.toggle_area(area);
            }
            planner.confirm_user(draft)?;
        }
        UserCommand::Delete { id } => {
            if !planner.delete_user(&id)? {
                bail!("user with id {id} not found");
            }
        }
    }
    Ok(())
}

fn run_project(planner: &mut Planner<FileStorage>, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Add { name, description } => {
            println!("{}", planner.confirm_project(Project::new(name, description))?);
        }
        ProjectCommand::Edit {
            id,
            name,
            description,
        } => {
            let mut editor = planner.open_project(&id, Config::default())?;
            if let Some(name) = name {
                editor.set_name(name);
            }
            if let Some(description) = description {
                editor.set_description(description);
            }
            if !editor.can_save() {
                bail!("project name and description must not be empty");
            }
            planner.confirm_project(editor.finish())?;
        }
        ProjectCommand::List => {
            for project in planner.projects() {
                println!(
                    "{}\t{}\t{} nodes\t{} links",
                    project.id,
                    project.name,
                    project.nodes.len(),
                    project.links.len()
                );
            }
        }
        ProjectCommand::Show { id } => {
            println!("{}", serde_json::to_string_pretty(planner.project(&id)?)?);
        }
        ProjectCommand::Delete { id } => {
            if !planner.delete_project(&id)? {
                bail!("project with id {id} not found");
            }
        }
    }
    Ok(())
}

fn run_node(planner: &mut Planner<FileStorage>, config: &Config, command: NodeCommand) -> Result<()> {
    match command {
        NodeCommand::Add {
            project,
            name,
            description,
            areas,
        } => {
            let mut editor = planner.open_project(&project, config.clone())?;
            let draft = editor.create_node();
            draft.set_name(name);
            draft.set_description(description);
            draft.expertise_areas = parse_areas(&areas)?;
            let id = editor.save_node_dialog()?;
            planner.confirm_project(editor.finish())?;
            println!("{id}");
        }
        NodeCommand::Edit {
            project,
            node,
            name,
            description,
            toggle,
        } => {
            let toggle = parse_area_list(&toggle)?;
            let mut editor = planner.open_project(&project, config.clone())?;
            let draft: &mut NodeDraft = editor
                .double_click(&node)
                .ok_or_else(|| anyhow!("node with id {node} not found"))?;
            if let Some(name) = name {
                draft.set_name(name);
            }
            if let Some(description) = description {
                draft.set_description(description);
            }
            for area in toggle {
                draft.toggle_area(area);
            }
            editor.save_node_dialog()?;
            planner.confirm_project(editor.finish())?;
        }
    }
    Ok(())
}

fn write_render(svg: &str, output: &OutputArgs, config: &Config) -> Result<()> {
    match output.output_format {
        OutputFormat::Svg => write_output_svg(svg, output.output.as_deref()),
        OutputFormat::Png => {
            let path = output
                .output
                .as_deref()
                .ok_or_else(|| anyhow!("Output path required for png output"))?;
            write_png(svg, path, config)
        }
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, path: &std::path::Path, config: &Config) -> Result<()> {
    write_output_png(svg, path, &config.render, &config.card.font_family)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _path: &std::path::Path, _config: &Config) -> Result<()> {
    bail!("png output requires the `png` feature")
}

fn parse_area_list(tokens: &[String]) -> Result<Vec<ExpertiseArea>> {
    tokens
        .iter()
        .filter(|token| !token.trim().is_empty())
        .map(|token| {
            ExpertiseArea::from_token(token).ok_or_else(|| anyhow!("unknown expertise area `{token}`"))
        })
        .collect()
}

fn parse_areas(tokens: &[String]) -> Result<ExpertiseAreas> {
    Ok(ExpertiseAreas::with(&parse_area_list(tokens)?))
}

fn parse_handle(token: &str) -> Result<HandleSide> {
    HandleSide::from_token(&token.to_ascii_lowercase()).ok_or_else(|| anyhow!("unknown handle `{token}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_subcommands() {
        let args = Args::try_parse_from([
            "planr",
            "--data-dir",
            "/tmp/x",
            "node",
            "add",
            "p1",
            "--name",
            "Auth",
            "--description",
            "login",
            "--areas",
            "backend,devOps",
        ])
        .unwrap();
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/x")));
        match args.command {
            Command::Node(NodeCommand::Add { areas, .. }) => {
                let parsed = parse_areas(&areas).unwrap();
                assert!(parsed.get(ExpertiseArea::DevOps));
                assert!(parsed.get(ExpertiseArea::Backend));
                assert!(!parsed.get(ExpertiseArea::Qa));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn layout_direction_defaults_to_vertical() {
        let args = Args::try_parse_from(["planr", "layout", "p1"]).unwrap();
        match args.command {
            Command::Layout { direction, .. } => {
                assert_eq!(LayoutDirection::from(direction), LayoutDirection::TopToBottom);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_area_is_rejected() {
        assert!(parse_areas(&["cooking".to_string()]).is_err());
        assert_eq!(parse_handle("Left").unwrap(), HandleSide::Left);
    }

    #[test]
    fn project_edit_updates_name_and_description() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        let mut planner = Planner::load(storage.clone()).unwrap();
        let id = planner
            .confirm_project(Project::new("Website", "relaunch"))
            .unwrap();

        let args = Args::try_parse_from(["planr", "project", "edit", id.as_str(), "--name", "Portal"]).unwrap();
        match args.command {
            Command::Project(command) => run_project(&mut planner, command).unwrap(),
            other => panic!("unexpected command {other:?}"),
        }

        let reloaded = Planner::load(storage).unwrap();
        let project = reloaded.project(&id).unwrap();
        assert_eq!(project.name, "Portal");
        assert_eq!(project.description, "relaunch");

        let blank = ProjectCommand::Edit {
            id: id.clone(),
            name: None,
            description: Some(String::new()),
        };
        assert!(run_project(&mut planner, blank).is_err());
        assert_eq!(planner.project(&id).unwrap().description, "relaunch");
    }
}
