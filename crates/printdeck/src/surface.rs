use crossterm::event::KeyEvent;
use printdeck_core::DisplaySurface;
use ratatui::{layout::Rect, widgets::Clear, Frame};
use std::rc::Rc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    None,
    OpenDetails,
}

/// Drawable content of a panel.
pub trait View {
    fn render(&self, frame: &mut Frame, area: Rect);

    fn handle_key(&self, _key: KeyEvent) -> ViewAction {
        ViewAction::None
    }
}

pub type ViewNode = Rc<dyn View>;

/// The one slot the current panel's view is drawn into.
#[derive(Default)]
pub struct Slot {
    node: Option<ViewNode>,
}

impl Slot {
    pub fn node(&self) -> Option<&ViewNode> {
        self.node.as_ref()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        if let Some(node) = &self.node {
            node.render(frame, area);
        }
    }
}

impl DisplaySurface for Slot {
    type Node = ViewNode;

    fn attach(&mut self, node: ViewNode) {
        if self.node.is_some() {
            warn!("display_slot_occupied: replacing attached view");
        }
        self.node = Some(node);
    }

    fn detach(&mut self, node: &ViewNode) {
        match &self.node {
            Some(current) if Rc::ptr_eq(current, node) => self.node = None,
            Some(_) => warn!("display_slot_detach_mismatch"),
            None => {}
        }
    }
}
