use std::rc::Rc;

pub type PanelRef<N> = Rc<dyn Panel<N>>;

/// A full-screen panel. `N` is the layout node type of the display surface.
pub trait Panel<N> {
    fn name(&self) -> &str;

    fn show(&self);

    fn hide(&self);

    /// Root layout node attached to the display surface while this panel is current.
    fn root(&self) -> N;

    /// Panel to return to on back navigation; `None` at the top of the stack.
    fn parent(&self) -> Option<PanelRef<N>>;
}

/// Single-slot container the navigator swaps panel nodes in and out of.
pub trait DisplaySurface {
    type Node;

    fn attach(&mut self, node: Self::Node);

    fn detach(&mut self, node: &Self::Node);
}
