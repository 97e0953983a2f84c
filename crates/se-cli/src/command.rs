//! Shell command parsing

use glam::Vec3;
use se_core::{EditError, ElementType, Layer, ToolKind};
use thiserror::Error;

/// Errors from parsing or running a shell command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command: {0} (try 'help')")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Unknown element type: {0}")]
    InvalidElementType(String),
    #[error("Unknown tool: {0}")]
    InvalidTool(String),
    #[error("Unknown layer: {0}")]
    InvalidLayer(String),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What to preview
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewTarget {
    Point(Vec3),
    Segment(usize, usize),
    Arc(usize, usize, usize),
    Spline(Vec<usize>),
    Face(Vec<usize>),
}

/// A parsed shell command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Point(Vec3),
    Segment(usize, usize),
    Arc(usize, usize, usize),
    Spline(Vec<usize>),
    Face(Vec<usize>),
    Preview(PreviewTarget),
    EndPreview(Option<ToolKind>),
    Mode(ElementType),
    Pick { origin: Vec3, direction: Vec3, multi: bool },
    Select { element_type: ElementType, id: usize, multi: bool },
    Deselect { element_type: ElementType, id: usize },
    Clear(Option<ElementType>),
    Tool(ToolKind),
    Input(Vec3),
    CloseTool { keep_selection: bool },
    Confirm,
    Undo,
    Redo,
    Jump(usize),
    History,
    List(Option<ElementType>),
    Toggle(Layer),
    Highlight(bool),
    Help,
    Quit,
}

pub const HELP: &str = "\
Edits:
  point X Y Z                 add a point
  segment A B                 add a segment between points A and B
  arc A M B                   add an arc from A through M to B
  spline ID...                add a spline through points
  face ID...                  add a face bounded by curves
Previews:
  preview point X Y Z | segment A B | arc A M B | spline ID... | face ID...
  end-preview [point|segment|arc|spline|face]
Selection:
  mode point|curve|surface    set the click selection mode
  pick OX OY OZ DX DY DZ [--multi]
  select TYPE ID [--multi]
  deselect TYPE ID
  clear [TYPE]                clear all selections except TYPE
Tools:
  tool point|segment|arc|spline|face
  input X Y Z                 coordinates for the point tool
  confirm                     commit the open tool's construction
  close-tool [--keep]         close the open tool
History:
  undo | redo | jump INDEX | history
Display:
  list [TYPE]                 list elements of the committed shape
  toggle mesh|surfaces|edges|points
  highlight on|off            multi-select highlight style
  help | quit";

impl Command {
    /// Parse one input line; returns `Ok(None)` for blank lines and comments
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words: Vec<&str> = line.split_whitespace().collect();
        let multi = take_flag(&mut words, "--multi");
        let keep = take_flag(&mut words, "--keep");
        let (name, args) = words.split_first().ok_or(CommandError::Usage("help"))?;

        let command = match *name {
            "point" => Command::Point(parse_vec3(args, "point X Y Z")?),
            "segment" => {
                let [a, b] = parse_ids::<2>(args, "segment A B")?;
                Command::Segment(a, b)
            }
            "arc" => {
                let [a, m, b] = parse_ids::<3>(args, "arc A M B")?;
                Command::Arc(a, m, b)
            }
            "spline" => Command::Spline(parse_id_list(args, "spline ID...")?),
            "face" => Command::Face(parse_id_list(args, "face ID...")?),
            "preview" => Command::Preview(parse_preview(args)?),
            "end-preview" => match args {
                [] | ["all"] => Command::EndPreview(None),
                [kind] => Command::EndPreview(Some(parse_tool(kind)?)),
                _ => return Err(CommandError::Usage("end-preview [KIND]")),
            },
            "mode" => match args {
                [ty] => Command::Mode(parse_element_type(ty)?),
                _ => return Err(CommandError::Usage("mode point|curve|surface")),
            },
            "pick" => {
                const USAGE: &str = "pick OX OY OZ DX DY DZ [--multi]";
                if args.len() != 6 {
                    return Err(CommandError::Usage(USAGE));
                }
                Command::Pick {
                    origin: parse_vec3(&args[..3], USAGE)?,
                    direction: parse_vec3(&args[3..], USAGE)?,
                    multi,
                }
            }
            "select" => match args {
                [ty, id] => Command::Select {
                    element_type: parse_element_type(ty)?,
                    id: parse_id(id)?,
                    multi,
                },
                _ => return Err(CommandError::Usage("select TYPE ID [--multi]")),
            },
            "deselect" => match args {
                [ty, id] => Command::Deselect {
                    element_type: parse_element_type(ty)?,
                    id: parse_id(id)?,
                },
                _ => return Err(CommandError::Usage("deselect TYPE ID")),
            },
            "clear" => match args {
                [] => Command::Clear(None),
                [ty] => Command::Clear(Some(parse_element_type(ty)?)),
                _ => return Err(CommandError::Usage("clear [TYPE]")),
            },
            "tool" => match args {
                [kind] => Command::Tool(parse_tool(kind)?),
                _ => return Err(CommandError::Usage("tool KIND")),
            },
            "input" => Command::Input(parse_vec3(args, "input X Y Z")?),
            "close-tool" => Command::CloseTool {
                keep_selection: keep,
            },
            "confirm" => Command::Confirm,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "jump" => match args {
                [index] => Command::Jump(parse_id(index)?),
                _ => return Err(CommandError::Usage("jump INDEX")),
            },
            "history" => Command::History,
            "list" => match args {
                [] => Command::List(None),
                [ty] => Command::List(Some(parse_element_type(ty)?)),
                _ => return Err(CommandError::Usage("list [TYPE]")),
            },
            "toggle" => match args {
                [layer] => Command::Toggle(
                    Layer::from_name(layer)
                        .ok_or_else(|| CommandError::InvalidLayer(layer.to_string()))?,
                ),
                _ => return Err(CommandError::Usage("toggle LAYER")),
            },
            "highlight" => match args {
                ["on"] => Command::Highlight(true),
                ["off"] => Command::Highlight(false),
                _ => return Err(CommandError::Usage("highlight on|off")),
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn take_flag(words: &mut Vec<&str>, flag: &str) -> bool {
    let before = words.len();
    words.retain(|w| *w != flag);
    words.len() != before
}

fn parse_preview(args: &[&str]) -> Result<PreviewTarget, CommandError> {
    const USAGE: &str = "preview point|segment|arc|spline|face ARGS...";
    let (kind, rest) = args.split_first().ok_or(CommandError::Usage(USAGE))?;
    Ok(match parse_tool(kind)? {
        ToolKind::Point => PreviewTarget::Point(parse_vec3(rest, "preview point X Y Z")?),
        ToolKind::Segment => {
            let [a, b] = parse_ids::<2>(rest, "preview segment A B")?;
            PreviewTarget::Segment(a, b)
        }
        ToolKind::Arc => {
            let [a, m, b] = parse_ids::<3>(rest, "preview arc A M B")?;
            PreviewTarget::Arc(a, m, b)
        }
        ToolKind::Spline => PreviewTarget::Spline(parse_id_list(rest, "preview spline ID...")?),
        ToolKind::Face => PreviewTarget::Face(parse_id_list(rest, "preview face ID...")?),
    })
}

fn parse_element_type(word: &str) -> Result<ElementType, CommandError> {
    ElementType::from_name(word).ok_or_else(|| CommandError::InvalidElementType(word.to_string()))
}

fn parse_tool(word: &str) -> Result<ToolKind, CommandError> {
    ToolKind::from_name(word).ok_or_else(|| CommandError::InvalidTool(word.to_string()))
}

fn parse_id(word: &str) -> Result<usize, CommandError> {
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

fn parse_ids<const N: usize>(args: &[&str], usage: &'static str) -> Result<[usize; N], CommandError> {
    if args.len() != N {
        return Err(CommandError::Usage(usage));
    }
    let mut ids = [0; N];
    for (slot, word) in ids.iter_mut().zip(args) {
        *slot = parse_id(word)?;
    }
    Ok(ids)
}

fn parse_id_list(args: &[&str], usage: &'static str) -> Result<Vec<usize>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    args.iter().map(|word| parse_id(word)).collect()
}

fn parse_vec3(args: &[&str], usage: &'static str) -> Result<Vec3, CommandError> {
    let [x, y, z] = args else {
        return Err(CommandError::Usage(usage));
    };
    let parse = |word: &str| {
        word.parse::<f32>()
            .map_err(|_| CommandError::InvalidNumber(word.to_string()))
    };
    Ok(Vec3::new(parse(*x)?, parse(*y)?, parse(*z)?))
}
