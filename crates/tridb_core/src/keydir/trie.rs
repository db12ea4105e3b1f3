//! 256-way trie keydir.

use crate::error::Result;
use crate::keydir::{Keydir, Position, WalkOptions};

/// The default keydir: a 256-way digital trie keyed on byte values.
///
/// Positions live at terminal nodes, giving O(|key|) lookups and walks
/// that are naturally ordered byte-wise lexicographically.
#[derive(Debug, Default)]
pub struct TrieKeydir {
    root: Node,
    count: usize,
}

#[derive(Debug)]
struct Node {
    children: [Option<Box<Node>>; 256],
    position: Option<Position>,
}

impl Node {
    const NO_CHILD: Option<Box<Node>> = None;

    fn new() -> Self {
        Self {
            children: [Self::NO_CHILD; 256],
            position: None,
        }
    }

    /// Follows `key` downward, returning the terminal node if the full
    /// path exists.
    fn descend(&self, key: &[u8]) -> Option<&Node> {
        let mut node = self;
        for &byte in key {
            node = node.children[byte as usize].as_deref()?;
        }
        Some(node)
    }

    fn walk(
        &self,
        key: &mut Vec<u8>,
        reverse: bool,
        visitor: &mut dyn FnMut(&[u8], Position) -> Result<()>,
    ) -> Result<()> {
        if !reverse {
            if let Some(position) = self.position {
                visitor(key, position)?;
            }
            for byte in 0..=255u8 {
                if let Some(child) = self.children[byte as usize].as_deref() {
                    key.push(byte);
                    let walked = child.walk(key, reverse, visitor);
                    key.pop();
                    walked?;
                }
            }
        } else {
            for byte in (0..=255u8).rev() {
                if let Some(child) = self.children[byte as usize].as_deref() {
                    key.push(byte);
                    let walked = child.walk(key, reverse, visitor);
                    key.pop();
                    walked?;
                }
            }
            // Mirror of the forward order: the exact match comes after its
            // descendants.
            if let Some(position) = self.position {
                visitor(key, position)?;
            }
        }
        Ok(())
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieKeydir {
    /// Creates an empty keydir.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Keydir for TrieKeydir {
    fn set(&mut self, key: &[u8], position: Position) {
        let mut node = &mut self.root;
        for &byte in key {
            node = node.children[byte as usize].get_or_insert_with(|| Box::new(Node::new()));
        }
        if node.position.is_none() {
            self.count += 1;
        }
        node.position = Some(position);
    }

    fn delete(&mut self, key: &[u8]) {
        let mut node = &mut self.root;
        for &byte in key {
            match node.children[byte as usize].as_deref_mut() {
                Some(child) => node = child,
                None => return,
            }
        }
        if node.position.take().is_some() {
            self.count -= 1;
        }
    }

    fn get(&self, key: &[u8]) -> Option<Position> {
        self.root.descend(key)?.position
    }

    fn len(&self) -> usize {
        self.count
    }

    fn walk(
        &self,
        opts: &WalkOptions,
        visitor: &mut dyn FnMut(&[u8], Position) -> Result<()>,
    ) -> Result<()> {
        let Some(subtree) = self.root.descend(&opts.prefix) else {
            return Ok(());
        };
        let mut key = opts.prefix.clone();
        subtree.walk(&mut key, opts.reverse, visitor)
    }
}
