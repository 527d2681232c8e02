use crate::panel::{DisplaySurface, PanelRef};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no panel is currently shown")]
    Empty,
    #[error("panel {panel} has no parent to go back to")]
    NoParent { panel: String },
}

/// Tracks the current panel and swaps it into the display surface.
pub struct Navigator<D: DisplaySurface> {
    surface: D,
    current: Option<PanelRef<D::Node>>,
}

impl<D: DisplaySurface> Navigator<D> {
    pub fn new(surface: D) -> Self {
        Self {
            surface,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&PanelRef<D::Node>> {
        self.current.as_ref()
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    /// Replace the current panel with `panel`.
    ///
    /// The outgoing node is detached before the incoming one is attached, so
    /// the slot never holds two nodes.
    pub fn show_panel(&mut self, panel: PanelRef<D::Node>) {
        if let Some(previous) = self.current.take() {
            self.surface.detach(&previous.root());
            previous.hide();
        }

        debug!("panel_show: {}", panel.name());
        panel.show();
        self.surface.attach(panel.root());
        self.current = Some(panel);
    }

    /// Return to the parent of the current panel.
    pub fn go_back(&mut self) -> Result<(), NavigationError> {
        let current = self.current.as_ref().ok_or(NavigationError::Empty)?;
        let parent = current.parent().ok_or_else(|| NavigationError::NoParent {
            panel: current.name().to_string(),
        })?;
        self.show_panel(parent);
        Ok(())
    }

    pub fn can_go_back(&self) -> bool {
        self.current
            .as_ref()
            .map(|panel| panel.parent().is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Panel;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Show(u32),
        Hide(u32),
        Attach(u32),
        Detach(u32),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct TestPanel {
        id: u32,
        visible: Cell<bool>,
        parent: Option<PanelRef<u32>>,
        log: Log,
    }

    impl TestPanel {
        fn new(id: u32, parent: Option<PanelRef<u32>>, log: &Log) -> Rc<Self> {
            Rc::new(Self {
                id,
                visible: Cell::new(false),
                parent,
                log: log.clone(),
            })
        }
    }

    impl Panel<u32> for TestPanel {
        fn name(&self) -> &str {
            "test"
        }

        fn show(&self) {
            self.visible.set(true);
            self.log.borrow_mut().push(Event::Show(self.id));
        }

        fn hide(&self) {
            self.visible.set(false);
            self.log.borrow_mut().push(Event::Hide(self.id));
        }

        fn root(&self) -> u32 {
            self.id
        }

        fn parent(&self) -> Option<PanelRef<u32>> {
            self.parent.clone()
        }
    }

    struct Slot {
        attached: Vec<u32>,
        log: Log,
    }

    impl DisplaySurface for Slot {
        type Node = u32;

        fn attach(&mut self, node: u32) {
            self.attached.push(node);
            self.log.borrow_mut().push(Event::Attach(node));
        }

        fn detach(&mut self, node: &u32) {
            self.attached.retain(|id| id != node);
            self.log.borrow_mut().push(Event::Detach(*node));
        }
    }

    fn navigator(log: &Log) -> Navigator<Slot> {
        Navigator::new(Slot {
            attached: Vec::new(),
            log: log.clone(),
        })
    }

    #[test]
    fn first_panel_is_shown_and_attached() {
        let log = Log::default();
        let mut nav = navigator(&log);
        let panel = TestPanel::new(1, None, &log);

        nav.show_panel(panel.clone());

        assert!(panel.visible.get());
        assert_eq!(nav.surface().attached, vec![1]);
        assert_eq!(*log.borrow(), vec![Event::Show(1), Event::Attach(1)]);
    }

    #[test]
    fn swap_detaches_and_hides_old_before_new_is_attached() {
        let log = Log::default();
        let mut nav = navigator(&log);
        let first = TestPanel::new(1, None, &log);
        let second = TestPanel::new(2, None, &log);

        nav.show_panel(first.clone());
        log.borrow_mut().clear();
        nav.show_panel(second.clone());

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Detach(1),
                Event::Hide(1),
                Event::Show(2),
                Event::Attach(2)
            ]
        );
        assert!(!first.visible.get());
        assert_eq!(nav.surface().attached, vec![2]);
    }

    #[test]
    fn go_back_returns_to_the_same_parent_instance() {
        let log = Log::default();
        let mut nav = navigator(&log);
        let parent: PanelRef<u32> = TestPanel::new(1, None, &log);
        let child = TestPanel::new(2, Some(parent.clone()), &log);

        nav.show_panel(parent.clone());
        nav.show_panel(child);
        assert!(nav.can_go_back());
        nav.go_back().unwrap();

        let current = nav.current().unwrap();
        assert!(Rc::ptr_eq(current, &parent));
        assert_eq!(nav.surface().attached, vec![1]);
    }

    #[test]
    fn go_back_walks_a_multi_level_chain() {
        let log = Log::default();
        let mut nav = navigator(&log);
        let root: PanelRef<u32> = TestPanel::new(1, None, &log);
        let middle: PanelRef<u32> = TestPanel::new(2, Some(root.clone()), &log);
        let leaf = TestPanel::new(3, Some(middle.clone()), &log);

        nav.show_panel(leaf);
        nav.go_back().unwrap();
        assert!(Rc::ptr_eq(nav.current().unwrap(), &middle));
        nav.go_back().unwrap();
        assert!(Rc::ptr_eq(nav.current().unwrap(), &root));
        assert!(!nav.can_go_back());
    }

    #[test]
    fn go_back_without_parent_leaves_display_untouched() {
        let log = Log::default();
        let mut nav = navigator(&log);
        nav.show_panel(TestPanel::new(1, None, &log));
        log.borrow_mut().clear();

        let err = nav.go_back().unwrap_err();

        assert_eq!(
            err,
            NavigationError::NoParent {
                panel: "test".to_string()
            }
        );
        assert!(log.borrow().is_empty());
        assert_eq!(nav.surface().attached, vec![1]);
    }

    #[test]
    fn go_back_on_empty_navigator_is_an_error() {
        let log = Log::default();
        let mut nav = navigator(&log);
        assert_eq!(nav.go_back(), Err(NavigationError::Empty));
    }
}
