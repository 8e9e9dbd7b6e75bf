use std::collections::{HashMap, HashSet};

use crate::api::types::Block;

/// A block with its ordered children, borrowed from the flat collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<'a> {
    pub block: &'a Block,
    pub children: Vec<TreeNode<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

impl From<i32> for Direction {
    fn from(dir: i32) -> Self {
        if dir < 0 {
            Self::Backward
        } else {
            Self::Forward
        }
    }
}

/// Builds the ordered forest under `root_id` from a flat, parent-referencing collection.
///
/// Children keep the relative order they have in `flat`. A block whose parent
/// is not in `flat` (or that has no parent) hangs off the root. Blocks caught
/// in a parent cycle are unreachable and left out.
pub fn build_tree<'a>(root_id: &str, flat: &'a [Block]) -> Vec<TreeNode<'a>> {
    let present: HashSet<&str> = flat.iter().map(|b| b.id.as_str()).collect();
    let mut by_parent: HashMap<&str, Vec<&'a Block>> = HashMap::new();

    for block in flat {
        if block.id == root_id {
            continue;
        }
        let parent = match block.parent_id.as_deref() {
            Some(p) if p != block.id && (p == root_id || present.contains(p)) => p,
            _ => root_id,
        };
        by_parent.entry(parent).or_default().push(block);
    }

    let mut visited = HashSet::new();
    attach(root_id, &by_parent, &mut visited)
}

fn attach<'a>(
    parent_id: &str,
    by_parent: &HashMap<&str, Vec<&'a Block>>,
    visited: &mut HashSet<&'a str>,
) -> Vec<TreeNode<'a>> {
    let Some(children) = by_parent.get(parent_id) else {
        return Vec::new();
    };
    let mut nodes = Vec::with_capacity(children.len());
    for &block in children {
        if !visited.insert(block.id.as_str()) {
            continue;
        }
        nodes.push(TreeNode {
            block,
            children: attach(&block.id, by_parent, visited),
        });
    }
    nodes
}

/// Depth-first document order of a forest.
pub fn flatten<'a>(tree: &[TreeNode<'a>]) -> Vec<&'a Block> {
    let mut out = Vec::new();
    push_flat(tree, &mut out);
    out
}

fn push_flat<'a>(tree: &[TreeNode<'a>], out: &mut Vec<&'a Block>) {
    for node in tree {
        out.push(node.block);
        push_flat(&node.children, out);
    }
}

/// Walks document order from `from_id` in `direction` and returns the first
/// block matching `predicate`. Never returns `from_id` itself; `None` when the
/// walk runs off either end or `from_id` is not in the document.
pub fn get_next_block<'a, P>(
    root_id: &str,
    flat: &'a [Block],
    from_id: &str,
    direction: Direction,
    predicate: P,
) -> Option<&'a Block>
where
    P: Fn(&Block) -> bool,
{
    let tree = build_tree(root_id, flat);
    let order = flatten(&tree);
    let start = order.iter().position(|b| b.id == from_id)?;

    match direction {
        Direction::Forward => order[start + 1..]
            .iter()
            .copied()
            .find(|b| predicate(b)),
        Direction::Backward => order[..start]
            .iter()
            .rev()
            .copied()
            .find(|b| predicate(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{BlockContent, TextStyle};

    fn text(id: &str, parent: &str) -> Block {
        Block::new(id, parent, BlockContent::text(TextStyle::Paragraph, id))
    }

    fn ids(blocks: &[&Block]) -> Vec<String> {
        blocks.iter().map(|b| b.id.clone()).collect()
    }

    fn shape(nodes: &[TreeNode]) -> String {
        nodes
            .iter()
            .map(|n| {
                if n.children.is_empty() {
                    n.block.id.clone()
                } else {
                    format!("{}({})", n.block.id, shape(&n.children))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn sample() -> Vec<Block> {
        vec![
            Block {
                id: "root".into(),
                parent_id: None,
                content: BlockContent::Div,
            },
            text("a", "root"),
            text("a1", "a"),
            text("b", "root"),
            text("a2", "a"),
            text("b1", "b"),
        ]
    }

    #[test]
    fn builds_nested_tree_in_flat_order() {
        let flat = sample();
        let tree = build_tree("root", &flat);
        assert_eq!(shape(&tree), "a(a1 a2) b(b1)");
    }

    #[test]
    fn build_is_idempotent() {
        let flat = sample();
        assert_eq!(build_tree("root", &flat), build_tree("root", &flat));
    }

    #[test]
    fn orphan_attaches_to_root() {
        let mut flat = sample();
        flat.push(text("lost", "never-loaded"));
        flat.push(Block {
            id: "floating".into(),
            parent_id: None,
            content: BlockContent::Div,
        });
        let tree = build_tree("root", &flat);
        assert_eq!(shape(&tree), "a(a1 a2) b(b1) lost floating");
    }

    #[test]
    fn cycles_are_left_out() {
        let flat = vec![text("a", "root"), text("x", "y"), text("y", "x")];
        let tree = build_tree("root", &flat);
        assert_eq!(shape(&tree), "a");
    }

    #[test]
    fn self_parent_counts_as_orphan() {
        let flat = vec![text("a", "a")];
        assert_eq!(shape(&build_tree("root", &flat)), "a");
    }

    #[test]
    fn flatten_is_depth_first() {
        let flat = sample();
        let order = flatten(&build_tree("root", &flat));
        assert_eq!(ids(&order), vec!["a", "a1", "a2", "b", "b1"]);
    }

    #[test]
    fn next_block_walks_both_directions() {
        let flat = sample();
        let any = |_: &Block| true;
        assert_eq!(
            get_next_block("root", &flat, "a2", Direction::Forward, any).map(|b| b.id.as_str()),
            Some("b")
        );
        assert_eq!(
            get_next_block("root", &flat, "b", Direction::Backward, any).map(|b| b.id.as_str()),
            Some("a2")
        );
    }

    #[test]
    fn next_block_applies_predicate_and_skips_start() {
        let flat = sample();
        let not_a = |b: &Block| !b.id.starts_with('a');
        assert_eq!(
            get_next_block("root", &flat, "a", Direction::Forward, not_a).map(|b| b.id.as_str()),
            Some("b")
        );
        let found = get_next_block("root", &flat, "b1", Direction::Backward, |_| true).unwrap();
        assert_ne!(found.id, "b1");
    }

    #[test]
    fn next_block_exhausted_is_none() {
        let flat = sample();
        assert!(get_next_block("root", &flat, "a", Direction::Backward, |_| true).is_none());
        assert!(get_next_block("root", &flat, "b1", Direction::Forward, |_| true).is_none());
        assert!(get_next_block("root", &flat, "missing", Direction::Forward, |_| true).is_none());
    }

    #[test]
    fn direction_from_sign() {
        assert_eq!(Direction::from(-1), Direction::Backward);
        assert_eq!(Direction::from(1), Direction::Forward);
    }
}
