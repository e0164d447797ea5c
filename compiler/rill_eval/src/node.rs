//! Executable nodes.
//!
//! The transformer turns the parser's [`Expr`](rill_ir::Expr) tree into a
//! tree of `Rc<Node>`. Nodes are immutable once built; the adaptive state
//! they carry (inline caches, caller-frame flags) lives in the per-site
//! [`CallSite`] and [`ReadSite`] records behind `Cell`s, so a node can be
//! shared between a quoted language object and the code that runs it.

use std::cell::{Cell, OnceCell};
use std::rc::Rc;

use rill_ir::{BinaryOp, Name, Span, UnaryOp};

use crate::frame::CallerFrameAccess;
use crate::inline_cache::{ExpressionCache, InsertionListener, PromiseCache};
use crate::value::Value;

/// An executable node.
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Where `<-` and `<<-` bind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssignScope {
    /// `<-`: the current environment.
    Local,
    /// `<<-`: the nearest enclosing binding, else the global environment.
    Enclosing,
}

pub enum NodeKind {
    Constant(Value),
    ReadVar {
        name: Name,
        site: ReadSite,
    },
    Assign {
        name: Name,
        value: Rc<Node>,
        scope: AssignScope,
    },
    Function {
        params: Rc<[ParamNode]>,
        body: Rc<Node>,
    },
    /// Call whose function is found by evaluating `callee`.
    Call {
        callee: Rc<Node>,
        args: Vec<CallArg>,
        site: Rc<CallSite>,
    },
    /// Call of a function value fixed when the node was built.
    StaticCall {
        function: Value,
        args: Vec<CallArg>,
        site: Rc<CallSite>,
    },
    Block(Vec<Rc<Node>>),
    /// Parenthesized expression; forces its result visible.
    Paren(Rc<Node>),
    If {
        cond: Rc<Node>,
        then_branch: Rc<Node>,
        else_branch: Option<Rc<Node>>,
    },
    While {
        cond: Rc<Node>,
        body: Rc<Node>,
    },
    Repeat(Rc<Node>),
    Break,
    Next,
    Binary {
        op: BinaryOp,
        lhs: Rc<Node>,
        rhs: Rc<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Rc<Node>,
    },
}

/// A formal parameter.
pub struct ParamNode {
    pub name: Name,
    pub default: Option<Rc<Node>>,
}

/// An actual argument at a call site.
pub struct CallArg {
    pub name: Option<Name>,
    pub value: Rc<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Node { kind, span }
    }

    pub fn constant(value: Value, span: Span) -> Self {
        Node::new(NodeKind::Constant(value), span)
    }

    pub fn read_var(name: Name, span: Span) -> Self {
        Node::new(
            NodeKind::ReadVar {
                name,
                site: ReadSite::new(),
            },
            span,
        )
    }

    pub fn call(callee: Rc<Node>, args: Vec<CallArg>, span: Span) -> Self {
        Node::new(
            NodeKind::Call {
                callee,
                args,
                site: Rc::new(CallSite::new()),
            },
            span,
        )
    }

    pub fn static_call(function: Value, args: Vec<CallArg>, span: Span) -> Self {
        Node::new(
            NodeKind::StaticCall {
                function,
                args,
                site: Rc::new(CallSite::new()),
            },
            span,
        )
    }

    /// Call-site record of a call node.
    pub fn call_site(&self) -> Option<&Rc<CallSite>> {
        match &self.kind {
            NodeKind::Call { site, .. } | NodeKind::StaticCall { site, .. } => Some(site),
            _ => None,
        }
    }
}

/// Adaptive state of one call site.
pub struct CallSite {
    /// Once set, calls made here hand the callee a materialized link to the
    /// calling frame. Never cleared.
    needs_caller_frame: Cell<bool>,
    /// State of caller-frame reads made by builtins called here.
    caller_access: CallerFrameAccess,
    /// Expression cache used when this site calls `eval`.
    expression_cache: OnceCell<ExpressionCache>,
    inserted_nodes: Cell<usize>,
}

impl CallSite {
    pub fn new() -> Self {
        CallSite {
            needs_caller_frame: Cell::new(false),
            caller_access: CallerFrameAccess::new(),
            expression_cache: OnceCell::new(),
            inserted_nodes: Cell::new(0),
        }
    }

    #[inline]
    pub fn needs_caller_frame(&self) -> bool {
        self.needs_caller_frame.get()
    }

    /// Ask future calls from this site to pass the caller frame along.
    /// Returns `true` the first time.
    pub fn set_needs_caller_frame(&self) -> bool {
        !self.needs_caller_frame.replace(true)
    }

    pub fn caller_access(&self) -> &CallerFrameAccess {
        &self.caller_access
    }

    pub fn expression_cache(&self, max_depth: usize) -> &ExpressionCache {
        self.expression_cache
            .get_or_init(|| ExpressionCache::new(max_depth))
    }

    /// Cache already created for this site, if any.
    pub fn existing_expression_cache(&self) -> Option<&ExpressionCache> {
        self.expression_cache.get()
    }
}

impl Default for CallSite {
    fn default() -> Self {
        Self::new()
    }
}

impl InsertionListener for CallSite {
    fn node_inserted(&self) {
        self.inserted_nodes.set(self.inserted_nodes.get() + 1);
    }

    fn inserted_nodes(&self) -> usize {
        self.inserted_nodes.get()
    }
}

/// Adaptive state of one variable read.
pub struct ReadSite {
    /// Cache used when the variable holds a promise.
    promise_cache: OnceCell<PromiseCache>,
    inserted_nodes: Cell<usize>,
}

impl ReadSite {
    pub fn new() -> Self {
        ReadSite {
            promise_cache: OnceCell::new(),
            inserted_nodes: Cell::new(0),
        }
    }

    pub fn promise_cache(&self, max_depth: usize) -> &PromiseCache {
        self.promise_cache
            .get_or_init(|| PromiseCache::new(max_depth))
    }

    pub fn existing_promise_cache(&self) -> Option<&PromiseCache> {
        self.promise_cache.get()
    }
}

impl Default for ReadSite {
    fn default() -> Self {
        Self::new()
    }
}

impl InsertionListener for ReadSite {
    fn node_inserted(&self) {
        self.inserted_nodes.set(self.inserted_nodes.get() + 1);
    }

    fn inserted_nodes(&self) -> usize {
        self.inserted_nodes.get()
    }
}
