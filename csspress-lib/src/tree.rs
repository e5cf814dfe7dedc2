use std::fmt;
use thiserror::Error;

pub mod css_tree {
    use super::*;

    /// Handle to a node stored in a [`Stylesheet`] arena.
    ///
    /// Ids stay valid after the node is removed; they then refer to a detached subtree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct NodeId(usize);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LeafKind {
        Comment,
        Import,
    }

    /// Coarse node classification, used to filter traversals.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum NodeKind {
        Leaf,
        Declaration,
        Group,
    }

    #[derive(Debug, Clone)]
    pub enum NodeData {
        Leaf(Leaf),
        Declaration(Declaration),
        Group(RuleGroup),
    }

    /// A comment or `@import` statement, rendered verbatim.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Leaf {
        kind: LeafKind,
        text: String,
    }

    /// A single `name:value` pair.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Declaration {
        pub name: String,
        pub value: String,
    }

    /// A selector (or at-rule header) with its block. `selector` is `None` for the
    /// document root and for blocks with an empty header.
    #[derive(Debug, Clone, Default)]
    pub struct RuleGroup {
        pub selector: Option<String>,
        children: Vec<NodeId>,
    }

    #[derive(Debug, Error, Clone, PartialEq, Eq)]
    pub enum TreeError {
        #[error("node {0:?} has no parent")]
        Detached(NodeId),
        #[error("node {0:?} already belongs to a group")]
        AlreadyAttached(NodeId),
        #[error("node {0:?} is not a rule group")]
        NotAGroup(NodeId),
    }

    #[derive(Debug, Clone)]
    struct Slot {
        data: NodeData,
        parent: Option<NodeId>,
    }

    /// Arena-backed stylesheet tree. Slot 0 is always the root group.
    #[derive(Debug, Clone)]
    pub struct Stylesheet {
        nodes: Vec<Slot>,
    }

    impl Leaf {
        pub fn new(kind: LeafKind, text: impl Into<String>) -> Self {
            Leaf {
                kind,
                text: text.into(),
            }
        }

        pub fn kind(&self) -> LeafKind {
            self.kind
        }

        pub fn text(&self) -> &str {
            &self.text
        }
    }

    impl Declaration {
        pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
            Declaration {
                name: name.into(),
                value: value.into(),
            }
        }

        /// Case-insensitive name comparison.
        pub fn is_named(&self, name: &str) -> bool {
            self.name.eq_ignore_ascii_case(name)
        }
    }

    impl RuleGroup {
        pub fn new(selector: Option<String>) -> Self {
            RuleGroup {
                selector,
                children: Vec::new(),
            }
        }

        pub fn children(&self) -> &[NodeId] {
            &self.children
        }
    }

    impl NodeData {
        pub fn kind(&self) -> NodeKind {
            match self {
                NodeData::Leaf(_) => NodeKind::Leaf,
                NodeData::Declaration(_) => NodeKind::Declaration,
                NodeData::Group(_) => NodeKind::Group,
            }
        }
    }

    impl Default for Stylesheet {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Stylesheet {
        pub fn new() -> Self {
            Stylesheet {
                nodes: vec![Slot {
                    data: NodeData::Group(RuleGroup::default()),
                    parent: None,
                }],
            }
        }

        pub fn root(&self) -> NodeId {
            NodeId(0)
        }

        pub fn get(&self, id: NodeId) -> &NodeData {
            &self.nodes[id.0].data
        }

        pub fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
            &mut self.nodes[id.0].data
        }

        pub fn declaration(&self, id: NodeId) -> Option<&Declaration> {
            match self.get(id) {
                NodeData::Declaration(decl) => Some(decl),
                _ => None,
            }
        }

        pub fn declaration_mut(&mut self, id: NodeId) -> Option<&mut Declaration> {
            match self.get_mut(id) {
                NodeData::Declaration(decl) => Some(decl),
                _ => None,
            }
        }

        pub fn group(&self, id: NodeId) -> Option<&RuleGroup> {
            match self.get(id) {
                NodeData::Group(group) => Some(group),
                _ => None,
            }
        }

        pub fn group_mut(&mut self, id: NodeId) -> Option<&mut RuleGroup> {
            match self.get_mut(id) {
                NodeData::Group(group) => Some(group),
                _ => None,
            }
        }

        /// Selector text of a group, `None` for leaves, declarations and unnamed groups.
        pub fn selector(&self, id: NodeId) -> Option<&str> {
            self.group(id).and_then(|group| group.selector.as_deref())
        }

        pub fn parent(&self, id: NodeId) -> Option<NodeId> {
            self.nodes[id.0].parent
        }

        /// Creates a detached node.
        pub fn create(&mut self, data: NodeData) -> NodeId {
            self.nodes.push(Slot { data, parent: None });
            NodeId(self.nodes.len() - 1)
        }

        pub fn create_declaration(
            &mut self,
            name: impl Into<String>,
            value: impl Into<String>,
        ) -> NodeId {
            self.create(NodeData::Declaration(Declaration::new(name, value)))
        }

        pub fn create_group(&mut self, selector: Option<String>) -> NodeId {
            self.create(NodeData::Group(RuleGroup::new(selector)))
        }

        pub fn create_leaf(&mut self, kind: LeafKind, text: impl Into<String>) -> NodeId {
            self.create(NodeData::Leaf(Leaf::new(kind, text)))
        }

        fn ensure_detached(&self, id: NodeId) -> Result<(), TreeError> {
            if self.parent(id).is_some() || id == self.root() {
                return Err(TreeError::AlreadyAttached(id));
            }
            Ok(())
        }

        fn children_mut(&mut self, group: NodeId) -> Result<&mut Vec<NodeId>, TreeError> {
            self.group_mut(group)
                .map(|g| &mut g.children)
                .ok_or(TreeError::NotAGroup(group))
        }

        /// Appends a detached node as the last child of `group`.
        pub fn append_child(&mut self, group: NodeId, child: NodeId) -> Result<(), TreeError> {
            self.ensure_detached(child)?;
            self.children_mut(group)?.push(child);
            self.nodes[child.0].parent = Some(group);
            Ok(())
        }

        /// Inserts a detached node right after `node` in its parent's children.
        pub fn insert_after(&mut self, node: NodeId, new_node: NodeId) -> Result<(), TreeError> {
            let parent = self.parent(node).ok_or(TreeError::Detached(node))?;
            self.ensure_detached(new_node)?;
            let children = self.children_mut(parent)?;
            let pos = children
                .iter()
                .position(|&c| c == node)
                .map_or(children.len(), |p| p + 1);
            children.insert(pos, new_node);
            self.nodes[new_node.0].parent = Some(parent);
            Ok(())
        }

        /// Convenience for inserting a new declaration after `node`.
        pub fn insert_declaration_after(
            &mut self,
            node: NodeId,
            name: impl Into<String>,
            value: impl Into<String>,
        ) -> Result<NodeId, TreeError> {
            let decl = self.create_declaration(name, value);
            self.insert_after(node, decl)?;
            Ok(decl)
        }

        /// Detaches `id` from its parent. Removing a detached node is a no-op.
        pub fn remove(&mut self, id: NodeId) {
            if let Some(parent) = self.nodes[id.0].parent.take() {
                if let Some(group) = self.group_mut(parent) {
                    group.children.retain(|&c| c != id);
                }
            }
        }

        /// Ancestors of `id`, nearest first. The node itself is not included.
        pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
            let mut found = Vec::new();
            let mut current = self.parent(id);
            while let Some(node) = current {
                found.push(node);
                current = self.parent(node);
            }
            found
        }

        /// True when `id` is `ancestor` or lies somewhere below it.
        pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
            let mut current = Some(id);
            while let Some(node) = current {
                if node == ancestor {
                    return true;
                }
                current = self.parent(node);
            }
            false
        }

        /// True when the node is still reachable from the root.
        pub fn is_attached(&self, id: NodeId) -> bool {
            self.is_within(id, self.root())
        }

        /// Pre-order, depth-first list of every node below `group`.
        pub fn find_all(&self, group: NodeId) -> Vec<NodeId> {
            let mut result = Vec::new();
            self.collect(group, &mut result);
            result
        }

        fn collect(&self, group: NodeId, result: &mut Vec<NodeId>) {
            let mut stack: Vec<NodeId> = self.child_ids(group).rev().collect();
            while let Some(id) = stack.pop() {
                result.push(id);
                stack.extend(self.child_ids(id).rev());
            }
        }

        fn child_ids(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
            self.group(id).map_or(&[][..], |g| &g.children[..]).iter().copied()
        }

        pub fn find_kind(&self, group: NodeId, kind: NodeKind) -> Vec<NodeId> {
            self.find_all(group)
                .into_iter()
                .filter(|&id| self.get(id).kind() == kind)
                .collect()
        }

        pub fn declarations(&self, group: NodeId) -> Vec<NodeId> {
            self.find_kind(group, NodeKind::Declaration)
        }

        pub fn groups(&self, group: NodeId) -> Vec<NodeId> {
            self.find_kind(group, NodeKind::Group)
        }

        pub fn leaves(&self, group: NodeId, kind: LeafKind) -> Vec<NodeId> {
            self.find_all(group)
                .into_iter()
                .filter(|&id| matches!(self.get(id), NodeData::Leaf(leaf) if leaf.kind == kind))
                .collect()
        }

        /// Other children of the node's parent, optionally filtered by kind.
        pub fn siblings(
            &self,
            id: NodeId,
            kind: Option<NodeKind>,
            include_self: bool,
        ) -> Vec<NodeId> {
            let Some(parent) = self.parent(id).and_then(|p| self.group(p)) else {
                return Vec::new();
            };
            parent
                .children
                .iter()
                .copied()
                .filter(|&s| include_self || s != id)
                .filter(|&s| kind.map_or(true, |k| self.get(s).kind() == k))
                .collect()
        }

        /// Deep copy of the subtree at `id`. The copy is detached; its ancestry is not copied.
        pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
            let copy = self.shallow_copy(id);
            let mut stack: Vec<(NodeId, NodeId)> =
                self.child_ids(id).rev().map(|child| (child, copy)).collect();
            while let Some((source, parent)) = stack.pop() {
                let child_copy = self.shallow_copy(source);
                if let Some(group) = self.group_mut(parent) {
                    group.children.push(child_copy);
                }
                self.nodes[child_copy.0].parent = Some(parent);
                stack.extend(self.child_ids(source).rev().map(|child| (child, child_copy)));
            }
            copy
        }

        fn shallow_copy(&mut self, id: NodeId) -> NodeId {
            let data = match self.get(id) {
                NodeData::Group(group) => NodeData::Group(RuleGroup::new(group.selector.clone())),
                other => other.clone(),
            };
            self.create(data)
        }

        /// Comma-separated parts of a group's selector, trimmed.
        ///
        /// Splitting is naive: a comma inside an attribute value such as
        /// `[data-x="a,b"]` splits the selector too.
        pub fn selectors(&self, group: NodeId) -> Vec<String> {
            match self.selector(group) {
                Some(selector) if !selector.is_empty() => {
                    selector.split(',').map(|p| p.trim().to_string()).collect()
                }
                _ => Vec::new(),
            }
        }

        pub fn set_selectors(&mut self, group: NodeId, parts: &[String]) {
            if let Some(g) = self.group_mut(group) {
                g.selector = Some(parts.join(", "));
            }
        }

        fn is_last_child(&self, id: NodeId) -> bool {
            self.parent(id)
                .and_then(|p| self.group(p))
                .and_then(|g| g.children.last())
                .is_some_and(|&last| last == id)
        }

        /// Serializes the subtree at `id`.
        pub fn render(&self, id: NodeId, compressed: bool) -> String {
            let mut out = String::new();
            let mut stack = vec![Render::Node(id)];
            while let Some(task) = stack.pop() {
                let id = match task {
                    Render::Text(text) => {
                        out.push_str(text);
                        continue;
                    }
                    Render::Node(id) => id,
                };
                match self.get(id) {
                    NodeData::Leaf(leaf) => out.push_str(&leaf.text),
                    NodeData::Declaration(decl) => {
                        out.push_str(&decl.name);
                        out.push(':');
                        out.push_str(&decl.value);
                        if !compressed || !self.is_last_child(id) {
                            out.push(';');
                        }
                    }
                    NodeData::Group(group) => {
                        let (separator, close) = match group.selector.as_deref() {
                            Some(selector) if !selector.is_empty() => {
                                let parts = self.selectors(id);
                                if compressed {
                                    out.push_str(&parts.join(","));
                                    out.push('{');
                                    ("", "}")
                                } else {
                                    out.push_str(&parts.join(", "));
                                    out.push_str("{\n\t");
                                    ("\n\t", "\n}\n")
                                }
                            }
                            _ => (if compressed { "" } else { "\n" }, ""),
                        };
                        // Tasks pop in reverse.
                        stack.push(Render::Text(close));
                        for (i, &child) in group.children.iter().enumerate().rev() {
                            stack.push(Render::Node(child));
                            if i > 0 {
                                stack.push(Render::Text(separator));
                            }
                        }
                    }
                }
            }
            out
        }

        pub fn to_css(&self, compressed: bool) -> String {
            self.render(self.root(), compressed)
        }
    }

    enum Render {
        Text(&'static str),
        Node(NodeId),
    }

    impl fmt::Display for Stylesheet {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.to_css(false))
        }
    }
}
