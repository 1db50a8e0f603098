//! Rooted tree model for decomposition trees.
//!
//! Nodes live in an arena owned by a [`Forest`]; parent, child and
//! vertex-container links are plain indices, which sidesteps the ownership
//! cycles a pointer-based tree would create. Detaching a subtree only clears
//! its parent link; the nodes stay live in the arena and remain reachable
//! through the container links of their leaves. The finished decomposition is
//! handed out as an [`MdTree`], a read-only view rooted at one arena node.

use std::fmt;
use std::fmt::Write as _;
use std::hash::Hash;

use crate::graph::{Graph, VertexId};

/// Index of a node in the tree arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of strong module an internal tree node stands for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ModuleKind {
    /// The complement of the module's induced subgraph is disconnected.
    Series,
    /// The module's induced subgraph is disconnected.
    Parallel,
    /// Neither series nor parallel.
    Prime,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleKind::Series => write!(f, "series"),
            ModuleKind::Parallel => write!(f, "parallel"),
            ModuleKind::Prime => write!(f, "prime"),
        }
    }
}

/// What a tree node holds: an internal module or a graph vertex.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Payload {
    Module(ModuleKind),
    Vertex(VertexId),
}

/// Transient label assigned during refinement and factorization.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Label {
    Dead,
    Zombie,
}

/// Whether a leaf was grouped by component or co-component of its slice.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Connectivity {
    Component,
    CoComponent,
}

#[derive(Debug)]
pub(crate) struct TreeNode {
    pub(crate) payload: Payload,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    // Scratch fields; each pass that uses one resets it before it finishes.
    pub(crate) label: Option<Label>,
    pub(crate) marked: bool,
    pub(crate) mark_count: usize,
    pub(crate) tree_index: usize,
    pub(crate) connectivity: Option<(usize, Connectivity)>,
    pub(crate) mu: usize,
    pub(crate) rho: usize,
}

impl TreeNode {
    fn new(payload: Payload) -> Self {
        TreeNode {
            payload,
            parent: None,
            children: Vec::new(),
            label: None,
            marked: false,
            mark_count: 0,
            tree_index: 0,
            connectivity: None,
            mu: 0,
            rho: 0,
        }
    }

    /// A node is degenerate when every union of its children is again a
    /// module.
    pub(crate) fn is_degenerate(&self) -> bool {
        matches!(
            self.payload,
            Payload::Module(ModuleKind::Series) | Payload::Module(ModuleKind::Parallel)
        )
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.payload, Payload::Vertex(_))
    }

    pub(crate) fn kind(&self) -> Option<ModuleKind> {
        match self.payload {
            Payload::Module(kind) => Some(kind),
            Payload::Vertex(_) => None,
        }
    }

    pub(crate) fn vertex(&self) -> Option<VertexId> {
        match self.payload {
            Payload::Vertex(v) => Some(v),
            Payload::Module(_) => None,
        }
    }
}

/// Arena of tree nodes.
#[derive(Debug, Default)]
pub(crate) struct Forest {
    nodes: Vec<TreeNode>,
}

impl std::ops::Index<NodeId> for Forest {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }
}

impl std::ops::IndexMut<NodeId> for Forest {
    fn index_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }
}

impl Forest {
    pub(crate) fn new() -> Self {
        Forest::default()
    }

    fn push(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn new_module(&mut self, kind: ModuleKind) -> NodeId {
        self.push(TreeNode::new(Payload::Module(kind)))
    }

    pub(crate) fn new_leaf(&mut self, vertex: VertexId) -> NodeId {
        self.push(TreeNode::new(Payload::Vertex(vertex)))
    }

    /// Appends `child` to `parent`'s children and links it back.
    pub(crate) fn insert(&mut self, parent: NodeId, child: NodeId) {
        self[parent].children.push(child);
        self[child].parent = Some(parent);
    }

    /// Walks up to the root of the tree `id` currently belongs to.
    pub(crate) fn get_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self[current].parent {
            current = parent;
        }
        current
    }

    /// Depth-first preorder snapshot of the subtree under `root`, children
    /// left to right. Taking a snapshot keeps later structural edits away
    /// from the traversal.
    pub(crate) fn preorder(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self[id].children.iter().rev());
        }
        order
    }

    /// The leaves under `root`, left to right.
    pub(crate) fn leaves(&self, root: NodeId) -> Vec<NodeId> {
        self.preorder(root)
            .into_iter()
            .filter(|&id| self[id].is_leaf())
            .collect()
    }

    /// Splits the children of `u` by a predicate, preserving relative order.
    pub(crate) fn group_children<F>(&self, u: NodeId, hit: F) -> (Vec<NodeId>, Vec<NodeId>)
    where
        F: Fn(&TreeNode) -> bool,
    {
        let mut hits = Vec::new();
        let mut misses = Vec::new();
        for &child in &self[u].children {
            if hit(&self[child]) {
                hits.push(child);
            } else {
                misses.push(child);
            }
        }
        (hits, misses)
    }

    /// Replaces the given children of `u` with a fresh node of `u`'s own kind
    /// whose children they become, and returns that node. The new node takes
    /// over the tree index of the moved children.
    pub(crate) fn replace_children(&mut self, u: NodeId, moved: &[NodeId]) -> NodeId {
        let kind = self[u]
            .kind()
            .expect("only module nodes have children to replace");
        let fresh = self.new_module(kind);
        self[fresh].tree_index = self[moved[0]].tree_index;
        for &child in moved {
            self.insert(fresh, child);
        }
        self[u].children.retain(|c| !moved.contains(c));
        self.insert(u, fresh);
        fresh
    }

    /// Reorders the children of `u`. The sequence must be a permutation of the
    /// current children.
    pub(crate) fn set_children_order(&mut self, u: NodeId, order: Vec<NodeId>) {
        debug_assert_eq!(order.len(), self[u].children.len());
        self[u].children = order;
    }
}

/// The modular decomposition tree of a graph.
///
/// Leaves reference the vertices of the decomposed graph; internal nodes are
/// its strong modules, labeled with a [`ModuleKind`]. Child order is only
/// meaningful for prime nodes, and there only up to the algorithm's own
/// ordering. Reading the leaves left to right yields a factorizing
/// permutation of the graph.
#[derive(Debug)]
pub struct MdTree {
    forest: Forest,
    root: NodeId,
}

impl MdTree {
    pub(crate) fn new(forest: Forest, root: NodeId) -> Self {
        MdTree { forest, root }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The module kind of `id`, or `None` for a leaf.
    pub fn module_kind(&self, id: NodeId) -> Option<ModuleKind> {
        self.forest[id].kind()
    }

    /// The vertex a leaf references, or `None` for an internal node.
    pub fn vertex(&self, id: NodeId) -> Option<VertexId> {
        self.forest[id].vertex()
    }

    /// Whether `id` is a leaf.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.forest[id].is_leaf()
    }

    /// The children of `id`, in tree order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.forest[id].children
    }

    /// The parent of `id`, unless it is the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.forest[id].parent
    }

    /// All nodes of the tree in depth-first preorder.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.forest.preorder(self.root)
    }

    /// The leaves left to right; a factorizing permutation of the graph.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.forest.leaves(self.root)
    }

    /// The vertices referenced by [`Self::leaves`], in the same order.
    pub fn leaf_vertices(&self) -> Vec<VertexId> {
        self.leaves()
            .into_iter()
            .map(|id| self.forest[id].vertex().expect("leaves hold vertices"))
            .collect()
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Length of the longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.forest[id].children.iter().map(|&c| (c, depth + 1)));
        }
        deepest
    }

    /// Renders the tree as a compact nested expression, e.g.
    /// `parallel(series(1 2 3) 4)`.
    pub fn to_text<V>(&self, graph: &Graph<V>) -> String
    where
        V: Eq + Hash + Clone + fmt::Debug + fmt::Display,
    {
        let mut out = String::new();
        self.write_node(&mut out, self.root, graph);
        out
    }

    fn write_node<V>(&self, out: &mut String, id: NodeId, graph: &Graph<V>)
    where
        V: Eq + Hash + Clone + fmt::Debug + fmt::Display,
    {
        match self.forest[id].payload {
            Payload::Vertex(v) => {
                let _ = write!(out, "{}", graph.label(v));
            }
            Payload::Module(kind) => {
                let _ = write!(out, "{kind}(");
                for (i, &child) in self.forest[id].children.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    self.write_node(out, child, graph);
                }
                out.push(')');
            }
        }
    }
}
