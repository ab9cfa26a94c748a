//! Composite relational filter node
//!
//! An [`ObjectFilter`] combines a [`ReferentCache`] (memoized referent
//! lookups) with two composable predicate levels:
//!
//! * the **subject-level** predicate — the externally visible match test,
//!   seeded with the cache evaluation and extendable with ad-hoc subject
//!   expressions or whole child filters;
//! * the **referent-level** predicate ("criteria") — the value extractor run
//!   when a cache miss resolves a referent.
//!
//! Child filters target possibly different referent types and are deduped by
//! (referent type, key selector identity): re-adding an equivalent child
//! merges the new criteria into the existing node instead of growing the
//! tree.
//!
//! The node freezes on the first evaluation; afterwards every structural
//! mutation entry point fails with `FrozenState`.

use crate::cache::{short_type_name, ReferentCache};
use crate::error::{FilterError, Result};
use crate::event::MapChange;
use crate::expr::{BoolOp, Expr, PredicateFn};
use crate::predicate::Predicate;
use crate::store::Resolve;
use crate::types::Handle;
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A key extractor paired with an explicit structural identity
///
/// Closures cannot be compared structurally, so the identity string is the
/// contract: two selectors with equal ids must derive equal keys from equal
/// subjects. Child dedup compares (referent type, selector id).
pub struct KeySelector<S> {
    id: String,
    extract: Rc<dyn Fn(&S) -> Handle>,
}

impl<S> KeySelector<S> {
    /// Create a selector with the given identity
    pub fn new(id: impl Into<String>, extract: impl Fn(&S) -> Handle + 'static) -> Self {
        KeySelector {
            id: id.into(),
            extract: Rc::new(extract),
        }
    }

    /// The structural identity of this selector
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Derive the referent key for a subject
    pub fn extract(&self, subject: &S) -> Handle {
        (self.extract)(subject)
    }
}

impl<S> Clone for KeySelector<S> {
    fn clone(&self) -> Self {
        KeySelector {
            id: self.id.clone(),
            extract: Rc::clone(&self.extract),
        }
    }
}

impl<S> fmt::Debug for KeySelector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeySelector({})", self.id)
    }
}

/// Type-erased view of a child filter held by its parent
pub(crate) trait FilterNode<S> {
    fn referent_type(&self) -> TypeId;
    fn selector_id(&self) -> &str;
    fn freeze(&self);
    fn dump(&self, label: &str, indent: usize) -> String;
    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Filter node over subjects of type `S`, keyed to referents of type `R`,
/// resolved through a store of type `St`
pub struct ObjectFilter<S, R, St> {
    store: Rc<St>,
    cache: Rc<ReferentCache<S, Handle, R, bool>>,
    criteria: Rc<RefCell<Predicate<R>>>,
    subject: RefCell<Predicate<S>>,
    children: RefCell<Vec<Rc<dyn FilterNode<S>>>>,
    selector_id: String,
    frozen: Cell<bool>,
}

impl<S, R, St> ObjectFilter<S, R, St>
where
    S: 'static,
    R: 'static,
    St: Resolve<Handle, R> + 'static,
{
    /// Create a filter node from a store, a key selector, and referent
    /// criteria
    pub fn new(store: Rc<St>, selector: KeySelector<S>, criteria: Expr<R>) -> Result<Self> {
        if selector.id.is_empty() {
            return Err(FilterError::InvalidArgument("key selector id is empty"));
        }

        let criteria = Rc::new(RefCell::new(Predicate::new(criteria)));
        let value_criteria = Rc::clone(&criteria);
        let extract = Rc::clone(&selector.extract);
        let store_dyn: Rc<dyn Resolve<Handle, R>> = store.clone();

        let cache = Rc::new(ReferentCache::from_parts(
            extract,
            Box::new(move |referent: &R| value_criteria.borrow().eval(referent)),
            store_dyn,
        ));

        let cache_leaf = Rc::clone(&cache);
        let subject = Predicate::new(Expr::fallible(
            format!("cache<{}>", short_type_name::<R>()),
            move |subject: &S| cache_leaf.evaluate(subject),
        ));

        Ok(ObjectFilter {
            store,
            cache,
            criteria,
            subject: RefCell::new(subject),
            children: RefCell::new(Vec::new()),
            selector_id: selector.id,
            frozen: Cell::new(false),
        })
    }

    /// Test a subject; freezes the node tree on first call
    pub fn is_match(&self, subject: &S) -> Result<bool> {
        let predicate = self.compiled();
        predicate(subject)
    }

    /// The compiled subject-level predicate; freezes the node tree
    pub fn compiled(&self) -> PredicateFn<S> {
        if !self.frozen.get() {
            self.freeze_tree();
        }
        self.subject.borrow().compiled()
    }

    /// Locate-or-create a child filter targeting referent type `R2`
    ///
    /// When a child with the same (referent type, selector id) already
    /// exists, `criteria` is merged into that child's referent-level
    /// expression via `op` and the existing child is returned. Otherwise a
    /// new child is built, its match test is combined into this node's
    /// subject-level expression via `op`, and the new child is returned.
    pub fn add<R2>(
        &self,
        op: BoolOp,
        selector: KeySelector<S>,
        criteria: Expr<R2>,
    ) -> Result<Rc<ObjectFilter<S, R2, St>>>
    where
        R2: 'static,
        St: Resolve<Handle, R2>,
    {
        self.ensure_unfrozen("add")?;

        if let Some(existing) = self.find_child::<R2>(&selector.id) {
            existing.criteria_combine(op, criteria)?;
            return Ok(existing);
        }

        let child = Rc::new(ObjectFilter::<S, R2, St>::new(
            Rc::clone(&self.store),
            selector,
            criteria,
        )?);
        self.absorb_child(op, &child)?;
        Ok(child)
    }

    /// Directly attach an already-built child node
    ///
    /// Unlike [`ObjectFilter::add`], a structurally equivalent existing child
    /// is an error here, not a merge target.
    pub fn attach<R2>(
        &self,
        op: BoolOp,
        child: ObjectFilter<S, R2, St>,
    ) -> Result<Rc<ObjectFilter<S, R2, St>>>
    where
        R2: 'static,
        St: Resolve<Handle, R2>,
    {
        self.ensure_unfrozen("attach")?;

        if self.find_child::<R2>(&child.selector_id).is_some() {
            return Err(FilterError::DuplicateChild(format!(
                "{} keyed by '{}'",
                short_type_name::<R2>(),
                child.selector_id
            )));
        }

        let child = Rc::new(child);
        self.absorb_child(op, &child)?;
        Ok(child)
    }

    /// Combine an ad-hoc subject-level expression into this node
    pub fn combine(&self, op: BoolOp, expr: Expr<S>) -> Result<()> {
        self.ensure_unfrozen("combine")?;
        self.subject.borrow_mut().combine(op, expr)
    }

    /// AND an ad-hoc subject-level expression into this node
    pub fn and(&self, expr: Expr<S>) -> Result<()> {
        self.combine(BoolOp::And, expr)
    }

    /// OR an ad-hoc subject-level expression into this node
    pub fn or(&self, expr: Expr<S>) -> Result<()> {
        self.combine(BoolOp::Or, expr)
    }

    /// Combine a fragment into the referent-level criteria
    pub fn criteria_combine(&self, op: BoolOp, expr: Expr<R>) -> Result<()> {
        self.ensure_unfrozen("criteria")?;
        self.criteria.borrow_mut().combine(op, expr)
    }

    /// AND a fragment into the referent-level criteria
    pub fn criteria_and(&self, expr: Expr<R>) -> Result<()> {
        self.criteria_combine(BoolOp::And, expr)
    }

    /// OR a fragment into the referent-level criteria
    pub fn criteria_or(&self, expr: Expr<R>) -> Result<()> {
        self.criteria_combine(BoolOp::Or, expr)
    }

    /// Snapshot this node as a subject-level expression leaf
    ///
    /// Evaluating the leaf freezes the node, exactly as [`is_match`] would.
    ///
    /// [`is_match`]: ObjectFilter::is_match
    pub fn to_expr(self: Rc<Self>) -> Expr<S> {
        let node = self;
        Expr::fallible(
            format!("filter<{}>", short_type_name::<R>()),
            move |subject| node.is_match(subject),
        )
    }

    /// Drop the cache entry for one referent key
    pub fn invalidate(&self, key: Handle) -> bool {
        self.cache.invalidate(&key)
    }

    /// Drop every cache entry of this node (children keep theirs)
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// The referent cache backing this node
    pub fn cache(&self) -> &ReferentCache<S, Handle, R, bool> {
        &self.cache
    }

    /// Attach a cache change observer
    pub fn subscribe(&self, observer: impl Fn(&MapChange<Handle>) + 'static) {
        self.cache.subscribe(observer);
    }

    /// Whether the node (and therefore its subtree) is frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Recursive diagnostic text: generic arguments, held expressions,
    /// cache population, and children
    pub fn dump(&self, label: &str, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        let mut out = format!(
            "{pad}{label}: ObjectFilter<S={}, R={}> keyed by '{}'{}\n",
            short_type_name::<S>(),
            short_type_name::<R>(),
            self.selector_id,
            if self.frozen.get() { " [frozen]" } else { "" },
        );
        out.push_str(&format!(
            "{pad}  subject: {}\n",
            self.subject.borrow().describe()
        ));
        out.push_str(&format!(
            "{pad}  criteria: {}\n",
            self.criteria.borrow().describe()
        ));
        out.push_str(&format!("{pad}  cached: {} entries\n", self.cache.len()));
        for (i, child) in self.children.borrow().iter().enumerate() {
            out.push_str(&FilterNode::dump(
                child.as_ref(),
                &format!("child[{}]", i),
                indent + 1,
            ));
        }
        out
    }

    /// Freeze this node and every descendant
    fn freeze_tree(&self) {
        self.frozen.set(true);
        self.subject.borrow().freeze();
        self.criteria.borrow().freeze();
        for child in self.children.borrow().iter() {
            child.freeze();
        }
    }

    fn ensure_unfrozen(&self, context: &'static str) -> Result<()> {
        if self.frozen.get() {
            return Err(FilterError::FrozenState(context));
        }
        Ok(())
    }

    /// Find a child with a structurally equivalent (referent type, selector)
    fn find_child<R2>(&self, selector_id: &str) -> Option<Rc<ObjectFilter<S, R2, St>>>
    where
        R2: 'static,
        St: Resolve<Handle, R2>,
    {
        let children = self.children.borrow();
        let node = children.iter().find(|c| {
            c.referent_type() == TypeId::of::<R2>() && c.selector_id() == selector_id
        })?;
        Rc::clone(node).as_any_rc().downcast().ok()
    }

    /// Parent a new child and fold its match test into the subject predicate
    fn absorb_child<R2>(&self, op: BoolOp, child: &Rc<ObjectFilter<S, R2, St>>) -> Result<()>
    where
        R2: 'static,
        St: Resolve<Handle, R2>,
    {
        self.subject.borrow_mut().combine(op, Rc::clone(child).to_expr())?;
        self.children
            .borrow_mut()
            .push(Rc::clone(child) as Rc<dyn FilterNode<S>>);
        Ok(())
    }
}

impl<S, R, St> FilterNode<S> for ObjectFilter<S, R, St>
where
    S: 'static,
    R: 'static,
    St: Resolve<Handle, R> + 'static,
{
    fn referent_type(&self) -> TypeId {
        TypeId::of::<R>()
    }

    fn selector_id(&self) -> &str {
        &self.selector_id
    }

    fn freeze(&self) {
        self.freeze_tree();
    }

    fn dump(&self, label: &str, indent: usize) -> String {
        ObjectFilter::dump(self, label, indent)
    }

    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

impl<S, R, St> fmt::Debug for ObjectFilter<S, R, St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObjectFilter<S={}, R={}> keyed by '{}'",
            short_type_name::<S>(),
            short_type_name::<R>(),
            self.selector_id
        )
    }
}
