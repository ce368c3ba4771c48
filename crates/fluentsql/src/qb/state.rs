//! Grammar positions of the type-state builders.
//!
//! Each marker names the last clause applied. The `Before*` traits list the
//! positions from which a later clause may still be added; a position that
//! does not implement one simply has no such method.

mod sealed {
    pub trait Sealed {}
}

/// After `from` and any number of joins.
#[derive(Debug)]
pub struct Joining;

/// After `filter` (WHERE).
#[derive(Debug)]
pub struct Filtered;

/// After `group_by`.
#[derive(Debug)]
pub struct Grouped;

/// After `having`.
#[derive(Debug)]
pub struct Having;

/// After `order_by`.
#[derive(Debug)]
pub struct Ordered;

/// After `limit`.
#[derive(Debug)]
pub struct Limited;

/// Before any SET/WHERE has been applied (DELETE).
#[derive(Debug)]
pub struct Unfiltered;

/// After `set` (UPDATE).
#[derive(Debug)]
pub struct Assigned;

impl sealed::Sealed for Joining {}
impl sealed::Sealed for Filtered {}
impl sealed::Sealed for Grouped {}
impl sealed::Sealed for Having {}
impl sealed::Sealed for Ordered {}
impl sealed::Sealed for Limited {}
impl sealed::Sealed for Unfiltered {}
impl sealed::Sealed for Assigned {}

/// Positions where GROUP BY may follow.
pub trait BeforeGroup: sealed::Sealed {}
impl BeforeGroup for Joining {}
impl BeforeGroup for Filtered {}

/// Positions where ORDER BY may follow.
pub trait BeforeOrder: sealed::Sealed {}
impl BeforeOrder for Joining {}
impl BeforeOrder for Filtered {}
impl BeforeOrder for Grouped {}
impl BeforeOrder for Having {}

/// Positions where LIMIT may follow.
pub trait BeforeLimit: sealed::Sealed {}
impl BeforeLimit for Joining {}
impl BeforeLimit for Filtered {}
impl BeforeLimit for Grouped {}
impl BeforeLimit for Having {}
impl BeforeLimit for Ordered {}
