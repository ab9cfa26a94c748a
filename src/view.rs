//! Lazily-filtered views over subject sequences
//!
//! A [`FilteredView`] binds an [`ObjectFilter`] to a source slice and yields
//! only the matching subjects. Traversal is lazy and restartable: every call
//! to [`FilteredView::iter`] re-walks the source against the filter's current
//! state, and once the filter is frozen repeated traversals are inexpensive
//! cache hits.

use crate::error::Result;
use crate::expr::{BoolOp, Expr};
use crate::filter::{KeySelector, ObjectFilter};
use crate::store::Resolve;
use crate::types::Handle;
use std::rc::Rc;

/// A filter bound to a source slice of subjects
pub struct FilteredView<'a, S, R, St> {
    source: &'a [S],
    filter: ObjectFilter<S, R, St>,
}

impl<'a, S, R, St> FilteredView<'a, S, R, St>
where
    S: 'static,
    R: 'static,
    St: Resolve<Handle, R> + 'static,
{
    /// Bind a filter to a source slice
    pub fn new(source: &'a [S], filter: ObjectFilter<S, R, St>) -> Self {
        FilteredView { source, filter }
    }

    /// Walk the source, yielding subjects that satisfy the filter
    ///
    /// Store failures surface as `Err` items in the stream.
    pub fn iter(&self) -> FilteredIter<'a, '_, S, R, St> {
        FilteredIter {
            inner: self.source.iter(),
            filter: &self.filter,
        }
    }

    /// Collect every matching subject, stopping at the first failure
    pub fn collect_matches(&self) -> Result<Vec<&'a S>> {
        self.iter().collect()
    }

    /// Test one subject against the bound filter
    pub fn is_match(&self, subject: &S) -> Result<bool> {
        self.filter.is_match(subject)
    }

    /// Locate-or-create a child filter (proxied to the bound filter)
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
        self.filter.add(op, selector, criteria)
    }

    /// AND an ad-hoc subject-level expression into the bound filter
    pub fn and(&self, expr: Expr<S>) -> Result<()> {
        self.filter.and(expr)
    }

    /// OR an ad-hoc subject-level expression into the bound filter
    pub fn or(&self, expr: Expr<S>) -> Result<()> {
        self.filter.or(expr)
    }

    /// AND a fragment into the bound filter's referent-level criteria
    pub fn criteria_and(&self, expr: Expr<R>) -> Result<()> {
        self.filter.criteria_and(expr)
    }

    /// OR a fragment into the bound filter's referent-level criteria
    pub fn criteria_or(&self, expr: Expr<R>) -> Result<()> {
        self.filter.criteria_or(expr)
    }

    /// Drop the cache entry for one referent key
    pub fn invalidate(&self, key: Handle) -> bool {
        self.filter.invalidate(key)
    }

    /// Drop every cache entry of the bound filter
    pub fn invalidate_all(&self) {
        self.filter.invalidate_all()
    }

    /// The bound filter
    pub fn filter(&self) -> &ObjectFilter<S, R, St> {
        &self.filter
    }

    /// The unfiltered source slice
    pub fn source(&self) -> &'a [S] {
        self.source
    }

    /// Recursive diagnostic text for the bound filter
    pub fn dump(&self, label: &str) -> String {
        self.filter.dump(label, 0)
    }
}

impl<'a, 'f, S, R, St> IntoIterator for &'f FilteredView<'a, S, R, St>
where
    S: 'static,
    R: 'static,
    St: Resolve<Handle, R> + 'static,
{
    type Item = Result<&'a S>;
    type IntoIter = FilteredIter<'a, 'f, S, R, St>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One lazy traversal of a [`FilteredView`]
pub struct FilteredIter<'a, 'f, S, R, St> {
    inner: std::slice::Iter<'a, S>,
    filter: &'f ObjectFilter<S, R, St>,
}

impl<'a, 'f, S, R, St> Iterator for FilteredIter<'a, 'f, S, R, St>
where
    S: 'static,
    R: 'static,
    St: Resolve<Handle, R> + 'static,
{
    type Item = Result<&'a S>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let subject = self.inner.next()?;
            match self.filter.is_match(subject) {
                Ok(true) => return Some(Ok(subject)),
                Ok(false) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Builds a [`FilteredView`] straight from a subject sequence
pub trait WhereBy<S> {
    /// Filter this sequence by a relational predicate over referents of
    /// type `R` resolved through `store`
    fn where_by<R, St>(
        &self,
        store: Rc<St>,
        selector: KeySelector<S>,
        criteria: Expr<R>,
    ) -> Result<FilteredView<'_, S, R, St>>
    where
        R: 'static,
        St: Resolve<Handle, R> + 'static;
}

impl<S: 'static> WhereBy<S> for [S] {
    fn where_by<R, St>(
        &self,
        store: Rc<St>,
        selector: KeySelector<S>,
        criteria: Expr<R>,
    ) -> Result<FilteredView<'_, S, R, St>>
    where
        R: 'static,
        St: Resolve<Handle, R> + 'static,
    {
        let filter = ObjectFilter::new(store, selector, criteria)?;
        Ok(FilteredView::new(self, filter))
    }
}

impl<S: 'static> WhereBy<S> for Vec<S> {
    fn where_by<R, St>(
        &self,
        store: Rc<St>,
        selector: KeySelector<S>,
        criteria: Expr<R>,
    ) -> Result<FilteredView<'_, S, R, St>>
    where
        R: 'static,
        St: Resolve<Handle, R> + 'static,
    {
        self.as_slice().where_by(store, selector, criteria)
    }
}
