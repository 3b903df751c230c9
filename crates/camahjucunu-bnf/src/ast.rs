use crate::grammar::ProductionAlternative;
use crate::lexer::ProductionUnit;

/// Owned parse tree produced by the instruction parser.
///
/// Each node owns its children exclusively; decoders consume the tree through
/// [`walk`](crate::walk).
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Root {
        lhs: String,
        children: Vec<AstNode>,
    },
    Intermediary {
        alt: ProductionAlternative,
        children: Vec<AstNode>,
    },
    /// A matched terminal. `unit` is the grammar atom that matched; the
    /// zero-width unit marks an absent optional group.
    Terminal {
        lhs: String,
        unit: ProductionUnit,
    },
}

impl AstNode {
    /// The grammar symbol this node was produced by.
    pub fn symbol(&self) -> &str {
        match self {
            AstNode::Root { lhs, .. } => lhs,
            AstNode::Intermediary { alt, .. } => &alt.lhs,
            AstNode::Terminal { lhs, .. } => lhs,
        }
    }

    pub fn children(&self) -> &[AstNode] {
        match self {
            AstNode::Root { children, .. } | AstNode::Intermediary { children, .. } => children,
            AstNode::Terminal { .. } => &[],
        }
    }

    /// The input text a terminal consumed; empty for absent optionals.
    pub fn matched_text(&self) -> String {
        match self {
            AstNode::Terminal { unit, .. } => unit.dequoted_text(),
            _ => String::new(),
        }
    }

    pub fn as_terminal(&self) -> Option<(&str, &ProductionUnit)> {
        match self {
            AstNode::Terminal { lhs, unit } => Some((lhs, unit)),
            _ => None,
        }
    }

    /// Reassembles the input this subtree consumed.
    pub fn flatten(&self) -> String {
        match self {
            AstNode::Terminal { unit, .. } => unit.dequoted_text(),
            AstNode::Root { children, .. } | AstNode::Intermediary { children, .. } => {
                children.iter().map(AstNode::flatten).collect()
            }
        }
    }

    /// Tree rendering with box-drawing connectors, for debugging output.
    pub fn tree(&self) -> String {
        let mut out = String::new();
        tree_into(self, &mut out, "", true);
        out
    }
}

fn tree_into(node: &AstNode, out: &mut String, prefix: &str, is_last: bool) {
    out.push_str(prefix);
    out.push_str(if is_last { "└── " } else { "├── " });
    match node {
        AstNode::Root { lhs, .. } => {
            out.push_str("Root: ");
            out.push_str(lhs);
        }
        AstNode::Intermediary { alt, .. } => {
            out.push_str("Intermediary: ");
            out.push_str(&alt.lhs);
        }
        AstNode::Terminal { unit, .. } => {
            out.push_str("Terminal: ");
            out.push_str(&unit.lexeme);
        }
    }
    out.push('\n');

    let children = node.children();
    let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
    for (i, child) in children.iter().enumerate() {
        tree_into(child, out, &child_prefix, i + 1 == children.len());
    }
}
