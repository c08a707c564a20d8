/// Scene graph arena
///
/// All nodes of a model live in one flat `Vec` owned by [`NodeTree`]. Parents
/// list their children as [`NodeId`] indices; skins and animation samplers
/// refer to nodes the same way. Traversals use an explicit stack so their
/// depth does not depend on the call stack.

use glam::{Mat4, Quat, Vec3};

/// Index of a node inside its [`NodeTree`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Scene graph node
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Explicit local matrix applied after TRS
    pub matrix: Mat4,
    /// World matrix, refreshed by [`NodeTree::update_transforms`]
    pub world_matrix: Mat4,
    /// Index into the model's meshes
    pub mesh: Option<usize>,
    /// Index into the model's skins
    pub skin: Option<usize>,
    pub children: Vec<NodeId>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: None,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
            mesh: None,
            skin: None,
            children: Vec::new(),
        }
    }
}

impl Node {
    /// `T * S * R * matrix`
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_scale(self.scale)
            * Mat4::from_quat(self.rotation)
            * self.matrix
    }
}

/// Flat node storage with an ordered list of roots
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `parent` (or as a new root)
    ///
    /// # Panics
    ///
    /// If `parent` does not belong to this tree.
    pub fn add_node(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// World matrix of `id`, identity for unknown ids
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        self.get(id).map_or(Mat4::IDENTITY, |node| node.world_matrix)
    }

    /// Pre-order depth-first walk, children in declaration order
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Recompute every world matrix top-down: `world = parent_world * local`
    pub fn update_transforms(&mut self) {
        let mut stack: Vec<(NodeId, Mat4)> =
            self.roots.iter().rev().map(|&id| (id, Mat4::IDENTITY)).collect();

        while let Some((id, parent_world)) = stack.pop() {
            let node = &mut self.nodes[id.0];
            node.world_matrix = parent_world * node.local_matrix();
            let world = node.world_matrix;
            stack.extend(node.children.iter().rev().map(|&child| (child, world)));
        }
    }
}

/// Iterator returned by [`NodeTree::depth_first`]
pub struct DepthFirst<'a> {
    tree: &'a NodeTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id.0];
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
