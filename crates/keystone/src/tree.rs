//! Trees of tagged constructs and their traversal.
//!
//! A construct tree mirrors the declarative configuration that is handed to
//! the provisioning engine: deployable units (stacks) containing individual
//! resources, possibly nested. Only units are audited, resources inherit
//! their tags from the enclosing unit.
use crate::{diagnostics::Diagnostics, tags::Taggable, Tags};

/// The capabilities a tree node exposes to visitors.
pub trait Node {
    /// Identifying name, used to attribute diagnostics.
    fn name(&self) -> &str;

    /// Whether this node is an independently deployable unit.
    fn is_unit(&self) -> bool;

    /// The node's current tags.
    fn tags(&self) -> &Tags;

    /// Direct children, in declaration order.
    fn children(&self) -> Vec<&dyn Node>;
}

/// Acts on nodes during a [`walk`].
pub trait Visitor {
    fn visit(&mut self, node: &dyn Node, diagnostics: &mut Diagnostics);
}

/// Visits every node reachable from `root` exactly once, depth-first and
/// parents before children.
pub fn walk<V: Visitor + ?Sized>(
    root: &dyn Node,
    visitor: &mut V,
    diagnostics: &mut Diagnostics,
) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        log::trace!("visiting '{}'", node.name());
        visitor.visit(node, diagnostics);
        let mut children = node.children();
        children.reverse();
        stack.extend(children);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstructKind {
    /// A deployable unit.
    Stack,
    /// An individual provider resource, eg `AWS::DynamoDB::Table`.
    Resource { resource_type: String },
}

/// A node in a construct tree.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Construct {
    pub id: String,
    #[serde(flatten)]
    pub kind: ConstructKind,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Construct>,
}

impl Construct {
    pub fn stack(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ConstructKind::Stack,
            tags: Tags::default(),
            children: vec![],
        }
    }

    pub fn resource(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ConstructKind::Resource {
                resource_type: resource_type.into(),
            },
            tags: Tags::default(),
            children: vec![],
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key, value);
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        crate::apply_tags(&mut self, &tags);
        self
    }

    pub fn with_child(mut self, child: Construct) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: Construct) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn is_stack(&self) -> bool {
        self.kind == ConstructKind::Stack
    }

    /// Calls `f` on every stack in this tree, parents before children.
    pub fn for_each_stack_mut(&mut self, f: &mut impl FnMut(&mut Construct)) {
        if self.is_stack() {
            f(self);
        }
        for child in self.children.iter_mut() {
            child.for_each_stack_mut(f);
        }
    }
}

impl Node for Construct {
    fn name(&self) -> &str {
        &self.id
    }

    fn is_unit(&self) -> bool {
        self.is_stack()
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    fn children(&self) -> Vec<&dyn Node> {
        self.children.iter().map(|c| c as &dyn Node).collect()
    }
}

impl Taggable for Construct {
    fn set_tag(&mut self, key: &str, value: &str) {
        self.tags.insert(key, value);
    }
}
