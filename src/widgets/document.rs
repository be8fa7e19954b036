//! Minimal element tree with focus tracking.
//!
//! Elements keep document order (pre-order from the root), parent links and
//! the flags focus management cares about. The tree also carries the page
//! scroll lock, counted so nested modals release it correctly.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSpec {
    pub label: Option<String>,
    /// Takes part in Tab order.
    pub focusable: bool,
    pub disabled: bool,
    /// False for elements laid out with zero area.
    pub rendered: bool,
}

impl ElementSpec {
    pub fn container() -> Self {
        Self {
            rendered: true,
            ..Self::default()
        }
    }

    pub fn focusable() -> Self {
        Self {
            focusable: true,
            rendered: true,
            ..Self::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.rendered = false;
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    spec: ElementSpec,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attached: bool,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    focused: Option<ElementId>,
    scroll_locks: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                spec: ElementSpec::container().label("body"),
                parent: None,
                children: Vec::new(),
                attached: true,
            }],
            focused: None,
            scroll_locks: 0,
        }
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Append `spec` as the last child of `parent`. An unknown parent
    /// leaves the new element detached with no parent.
    pub fn append(&mut self, parent: ElementId, spec: ElementSpec) -> ElementId {
        let id = ElementId(self.nodes.len());
        let attached = self.is_attached(parent);
        let parent = match self.nodes.get_mut(parent.0) {
            Some(node) => {
                node.children.push(id);
                Some(parent)
            }
            None => None,
        };
        self.nodes.push(Node {
            spec,
            parent,
            children: Vec::new(),
            attached,
        });
        id
    }

    pub fn label(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(id.0).and_then(|n| n.spec.label.as_deref())
    }

    pub fn is_attached(&self, id: ElementId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.attached)
    }

    /// Remove `id` and its subtree from the document. Focus inside the
    /// subtree is lost, as a browser would drop it to the body.
    pub fn detach(&mut self, id: ElementId) {
        for node in self.subtree(id) {
            self.nodes[node.0].attached = false;
        }
        if let Some(parent) = self.nodes.get(id.0).and_then(|n| n.parent) {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
        if self.focused.is_some_and(|f| !self.is_attached(f)) {
            self.focused = None;
        }
    }

    pub fn set_disabled(&mut self, id: ElementId, disabled: bool) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.spec.disabled = disabled;
        }
    }

    pub fn set_rendered(&mut self, id: ElementId, rendered: bool) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.spec.rendered = rendered;
        }
    }

    /// `ancestor` itself counts as containing.
    pub fn contains(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes.get(node.0).and_then(|n| n.parent);
        }
        false
    }

    /// `id` and all of its descendants in document order.
    fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let Some(n) = self.nodes.get(node.0) else {
                continue;
            };
            out.push(node);
            stack.extend(n.children.iter().rev().copied());
        }
        out
    }

    /// Can receive focus at all, programmatically or by Tab.
    pub fn can_focus(&self, id: ElementId) -> bool {
        self.nodes
            .get(id.0)
            .is_some_and(|n| n.attached && n.spec.rendered && !n.spec.disabled)
    }

    /// Takes part in the Tab sequence.
    pub fn is_tabbable(&self, id: ElementId) -> bool {
        self.can_focus(id) && self.nodes[id.0].spec.focusable
    }

    /// Tabbable descendants of `container` (excluding it) in document order.
    pub fn tabbable_within(&self, container: ElementId) -> Vec<ElementId> {
        self.subtree(container)
            .into_iter()
            .skip(1)
            .filter(|id| self.is_tabbable(*id))
            .collect()
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    pub fn focus(&mut self, id: ElementId) -> bool {
        if !self.can_focus(id) {
            return false;
        }
        self.focused = Some(id);
        true
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn lock_scroll(&mut self) {
        self.scroll_locks += 1;
    }

    pub fn unlock_scroll(&mut self) {
        self.scroll_locks = self.scroll_locks.saturating_sub(1);
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locks > 0
    }
}
