use std::collections::HashSet;

use crate::ast::AstNode;

/// Traversal-local state handed to every visitor callback.
///
/// `stack` mirrors the active traversal path: the node's ancestors, outermost
/// first. It is pushed when a node's children are entered and popped when
/// they are done, so `enter`/`exit` both observe only ancestors.
pub struct VisitorContext<'a> {
    pub stack: Vec<&'a AstNode>,
}

impl<'a> VisitorContext<'a> {
    fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// True when some ancestor was produced by `symbol`.
    pub fn has_ancestor(&self, symbol: &str) -> bool {
        self.stack.iter().any(|node| node.symbol() == symbol)
    }
}

/// Visitor over an [`AstNode`] tree; drive it with [`walk`].
pub trait AstVisitor {
    fn enter(&mut self, node: &AstNode, ctx: &VisitorContext<'_>);

    fn exit(&mut self, _node: &AstNode, _ctx: &VisitorContext<'_>) {}
}

/// Walks the tree depth-first, maintaining the ancestor stack and a guard
/// that enters each node at most once per walk.
pub fn walk<V>(root: &AstNode, visitor: &mut V)
where
    V: AstVisitor + ?Sized,
{
    let mut ctx = VisitorContext::new();
    let mut seen: HashSet<*const AstNode> = HashSet::new();
    walk_inner(root, visitor, &mut ctx, &mut seen);
}

fn walk_inner<'a, V>(
    node: &'a AstNode,
    visitor: &mut V,
    ctx: &mut VisitorContext<'a>,
    seen: &mut HashSet<*const AstNode>,
) where
    V: AstVisitor + ?Sized,
{
    if !seen.insert(node as *const AstNode) {
        return;
    }
    visitor.enter(node, ctx);
    ctx.stack.push(node);
    for child in node.children() {
        walk_inner(child, visitor, ctx, seen);
    }
    ctx.stack.pop();
    visitor.exit(node, ctx);
}
