//! Interactive shell over an editing session

use std::io::{BufRead, Write};

use se_core::{EditSession, ElementType, Ray, ToolKind};
use se_kernel::ModelKernel;
use tracing::warn;

use crate::command::{Command, CommandError, HELP, PreviewTarget};

/// Whether the shell keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs commands against a session and writes results to `out`
pub struct Shell<K: ModelKernel, W: Write> {
    session: EditSession<K>,
    out: W,
}

impl<K: ModelKernel, W: Write> Shell<K, W> {
    pub fn new(session: EditSession<K>, out: W) -> Self {
        Self { session, out }
    }

    /// Read commands line by line until input ends or `quit`
    ///
    /// Command failures are reported and the shell keeps going.
    pub fn run(&mut self, input: impl BufRead, prompt: bool) -> Result<(), CommandError> {
        if prompt {
            self.prompt()?;
        }
        for line in input.lines() {
            let line = line?;
            match Command::parse(&line).and_then(|command| match command {
                Some(command) => self.execute(command),
                None => Ok(Flow::Continue),
            }) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(CommandError::Io(e)) => return Err(CommandError::Io(e)),
                Err(e) => {
                    warn!("{}", e);
                    writeln!(self.out, "error: {e}")?;
                }
            }
            if prompt {
                self.prompt()?;
            }
        }
        Ok(())
    }

    fn prompt(&mut self) -> Result<(), CommandError> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(())
    }

    /// Execute one command
    pub fn execute(&mut self, command: Command) -> Result<Flow, CommandError> {
        match command {
            Command::Point(position) => {
                self.session.add_point(position)?;
                self.report_commit()?;
            }
            Command::Segment(first, second) => {
                self.session.add_segment(first, second)?;
                self.report_commit()?;
            }
            Command::Arc(first, mid, second) => {
                self.session.add_arc(first, mid, second)?;
                self.report_commit()?;
            }
            Command::Spline(points) => {
                self.session.add_spline(&points)?;
                self.report_commit()?;
            }
            Command::Face(curves) => {
                self.session.add_face(&curves)?;
                self.report_commit()?;
            }
            Command::Preview(target) => self.preview(target)?,
            Command::EndPreview(kind) => {
                match kind {
                    None => self.session.end_all_visualizations(),
                    Some(ToolKind::Point) => self.session.end_point_visualization(),
                    Some(ToolKind::Segment) => self.session.end_segment_visualization(),
                    Some(ToolKind::Arc) => {
                        self.session.end_arc_visualization();
                    }
                    Some(ToolKind::Spline) => {
                        self.session.end_spline_visualization();
                    }
                    Some(ToolKind::Face) => {
                        self.session.end_face_visualization();
                    }
                }
                writeln!(self.out, "shapes: {}", self.session.kernel().shape_count())?;
            }
            Command::Mode(mode) => {
                self.session.set_selection_mode(mode);
                writeln!(self.out, "selection mode: {mode}")?;
            }
            Command::Pick {
                origin,
                direction,
                multi,
            } => {
                let ray = Ray::new(origin, direction);
                match self.session.click(&ray, multi) {
                    Some(hit) => writeln!(
                        self.out,
                        "picked {} {} in shape {} (distance {:.4})",
                        hit.element_type, hit.element_id, hit.shape_index, hit.distance
                    )?,
                    None => writeln!(
                        self.out,
                        "nothing within {}, selection cleared",
                        self.session.config().pick_margin
                    )?,
                }
                self.report_selection()?;
            }
            Command::Select {
                element_type,
                id,
                multi,
            } => {
                self.session.select(element_type, 0, id, multi)?;
                self.report_selection()?;
            }
            Command::Deselect { element_type, id } => {
                if !self.session.deselect(element_type, id) {
                    writeln!(self.out, "{element_type} {id} was not selected")?;
                }
                self.report_selection()?;
            }
            Command::Clear(except) => {
                self.session.select_one_type(except);
                self.report_selection()?;
            }
            Command::Tool(kind) => {
                self.session.open_tool(kind);
                writeln!(
                    self.out,
                    "{kind} tool open, selection mode: {}",
                    self.session.selection_mode()
                )?;
            }
            Command::Input(position) => self.session.set_point_input(position)?,
            Command::CloseTool { keep_selection } => match self.session.close_tool(!keep_selection) {
                Some(kind) => writeln!(self.out, "{kind} tool closed")?,
                None => writeln!(self.out, "no tool open")?,
            },
            Command::Confirm => {
                self.session.confirm_tool()?;
                self.report_commit()?;
            }
            Command::Undo => {
                self.session.undo()?;
                self.report_history_position()?;
            }
            Command::Redo => {
                self.session.redo()?;
                self.report_history_position()?;
            }
            Command::Jump(index) => {
                self.session.jump_to(index)?;
                self.report_history_position()?;
            }
            Command::History => {
                for row in self.session.timeline() {
                    let marker = if row.is_current { '*' } else { ' ' };
                    writeln!(self.out, "{marker} {:>3}  {}", row.index, row.label)?;
                }
            }
            Command::List(element_type) => self.list(element_type)?,
            Command::Toggle(layer) => {
                let visible = self.session.toggle_layer(layer);
                writeln!(
                    self.out,
                    "{} {}",
                    layer.name(),
                    if visible { "visible" } else { "hidden" }
                )?;
            }
            Command::Highlight(enabled) => {
                self.session.set_multi_select_highlighting(enabled);
                writeln!(
                    self.out,
                    "multi-select highlighting {}",
                    if enabled { "on" } else { "off" }
                )?;
            }
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn preview(&mut self, target: PreviewTarget) -> Result<(), CommandError> {
        match target {
            PreviewTarget::Point(position) => {
                let marker = self.session.visualize_add_point(position)?;
                writeln!(self.out, "point marker at {}", marker.position)?;
            }
            PreviewTarget::Segment(first, second) => {
                let proxy = self.session.visualize_add_segment(first, second)?;
                writeln!(
                    self.out,
                    "segment proxy at {} with length {:.4}",
                    proxy.position, proxy.scale.z
                )?;
            }
            PreviewTarget::Arc(first, mid, second) => {
                let shape = self.session.visualize_add_arc(first, mid, second)?;
                writeln!(self.out, "arc preview on shape {shape}")?;
            }
            PreviewTarget::Spline(points) => {
                let shape = self.session.visualize_add_spline(&points)?;
                writeln!(self.out, "spline preview on shape {shape}")?;
            }
            PreviewTarget::Face(curves) => {
                let shape = self.session.visualize_add_face(&curves)?;
                writeln!(self.out, "face preview on shape {shape}")?;
            }
        }
        Ok(())
    }

    fn list(&mut self, element_type: Option<ElementType>) -> Result<(), CommandError> {
        let Some(shape) = self.session.index().shape(0) else {
            return Ok(());
        };
        let types = element_type.map_or(ElementType::ALL.to_vec(), |ty| vec![ty]);
        for ty in types {
            writeln!(self.out, "{}s: {}", ty, shape.count(ty))?;
            match ty {
                ElementType::Point => {
                    for point in &shape.points {
                        writeln!(self.out, "  {:>3}  {}", point.element_id, point.position)?;
                    }
                }
                ElementType::Curve => {
                    for id in 0..shape.count(ty) {
                        let mut segments = shape.curves.iter().filter(|c| c.element_id == id);
                        let first = segments.next();
                        let last = segments.last().or(first);
                        if let (Some(first), Some(last)) = (first, last) {
                            writeln!(self.out, "  {:>3}  {} -> {}", id, first.start, last.end)?;
                        }
                    }
                }
                ElementType::Surface => {
                    for id in 0..shape.count(ty) {
                        let triangles = shape.surfaces.iter().filter(|s| s.element_id == id).count();
                        writeln!(self.out, "  {:>3}  {} triangles", id, triangles)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn report_commit(&mut self) -> Result<(), CommandError> {
        let index = self.session.history_index();
        let label = self.session.history_labels().get(index).copied().unwrap_or("");
        writeln!(self.out, "{label} (history entry {index})")?;
        Ok(())
    }

    fn report_history_position(&mut self) -> Result<(), CommandError> {
        let index = self.session.history_index();
        let label = self.session.history_labels().get(index).copied().unwrap_or("");
        writeln!(
            self.out,
            "at history entry {index} of {}: {label}",
            self.session.history().len()
        )?;
        Ok(())
    }

    fn report_selection(&mut self) -> Result<(), CommandError> {
        let selection = self.session.selection();
        writeln!(
            self.out,
            "selected points {:?}, curves {:?}, surfaces {:?}",
            selection.points(),
            selection.curves(),
            selection.surfaces()
        )?;
        Ok(())
    }
}
