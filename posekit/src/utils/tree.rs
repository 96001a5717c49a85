//! Bone hierarchy rendering

use std::collections::BTreeMap;

use console::Style;
use pose_scene::Skeleton;

use super::format_number;

/// Levels of indentation drawn before the prefix stops growing
const MAX_INDENT: usize = 32;

/// A node in a rendered tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub detail: Option<String>,
    pub dangling: bool,
    children: Vec<usize>,
}

impl TreeNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
            dangling: false,
            children: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Flat tree storage; nodes refer to their children by index
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    pub const ROOT: usize = 0;

    pub fn new(root: TreeNode) -> Self {
        Self { nodes: vec![root] }
    }

    /// Append `node` as the last child of `parent` and return its index
    pub fn add_child(&mut self, parent: usize, node: TreeNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(index);
        index
    }

    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    pub fn children(&self, index: usize) -> &[usize] {
        &self.nodes[index].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Options for tree rendering
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
}

/// Build the bone tree of a skeleton under a node named after the scene
///
/// Bones whose parent does not resolve are listed as roots and flagged.
pub fn skeleton_tree(skeleton: &Skeleton) -> Tree {
    let mut tree = Tree::new(TreeNode::new(skeleton.name()).with_detail(format!(
        "{} bones, {} frames",
        skeleton.bone_count(),
        skeleton.frame_count()
    )));

    let bones = skeleton.bones();
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for bone in bones.values() {
        if let Some(parent) = bone.parent_id()
            && bones.contains_key(parent)
        {
            children.entry(parent).or_default().push(&bone.id);
        }
    }

    let mut stack: Vec<(usize, &str)> = skeleton
        .roots()
        .into_iter()
        .rev()
        .map(|id| (Tree::ROOT, id))
        .collect();
    while let Some((parent, id)) = stack.pop() {
        let mut node = bone_node(skeleton, id);
        node.dangling = parent == Tree::ROOT
            && skeleton.bone(id).and_then(|b| b.parent_id()).is_some();
        let index = tree.add_child(parent, node);
        if let Some(kids) = children.get(id) {
            stack.extend(kids.iter().rev().map(|kid| (index, *kid)));
        }
    }
    tree
}

fn bone_node(skeleton: &Skeleton, id: &str) -> TreeNode {
    let mut node = TreeNode::new(id);
    if let Some(bone) = skeleton.bone(id) {
        node.detail = Some(format!(
            "at ({}, {}) angle {} length {}",
            format_number(bone.x),
            format_number(bone.y),
            format_number(bone.angle),
            format_number(bone.length)
        ));
    }
    node
}

/// Render a tree structure to string
///
/// Past [`MAX_INDENT`] levels the indentation stays fixed and each line
/// carries its depth instead.
pub fn render_tree(tree: &Tree, options: &TreeOptions) -> String {
    let mut output = String::new();
    let mut stack: Vec<(usize, String, bool, usize)> =
        vec![(Tree::ROOT, String::new(), true, 0)];

    while let Some((index, prefix, is_last, depth)) = stack.pop() {
        if let Some(max_depth) = options.max_depth
            && depth > max_depth
        {
            continue;
        }
        let node = tree.node(index);

        let (name_style, detail_style, warn_style) = if options.no_color {
            (Style::new(), Style::new(), Style::new())
        } else if depth == 0 {
            (Style::new().bold().cyan(), Style::new().dim(), Style::new().yellow())
        } else {
            (Style::new().green(), Style::new().dim(), Style::new().yellow())
        };
        let connector = if depth == 0 {
            ""
        } else if is_last {
            "└── "
        } else {
            "├── "
        };

        output.push_str(&prefix);
        output.push_str(connector);
        output.push_str(&name_style.apply_to(&node.name).to_string());
        if depth > MAX_INDENT {
            output.push_str(&format!(" {}", detail_style.apply_to(format!("(depth {depth})"))));
        }
        if let Some(detail) = &node.detail {
            output.push_str(&format!(" {}", detail_style.apply_to(format!("[{detail}]"))));
        }
        if node.dangling {
            output.push_str(&format!(" {}", warn_style.apply_to("(missing parent)")));
        }
        output.push('\n');

        let child_prefix = if depth == 0 || depth >= MAX_INDENT {
            prefix
        } else {
            format!("{}{}", prefix, if is_last { "    " } else { "│   " })
        };
        let children = tree.children(index);
        for (i, &child) in children.iter().enumerate().rev() {
            let is_last_child = i == children.len() - 1;
            stack.push((child, child_prefix.clone(), is_last_child, depth + 1));
        }
    }
    output
}
