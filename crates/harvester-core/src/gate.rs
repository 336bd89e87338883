//! Host-supplied predicates that pause an extraction cycle without
//! cancelling it.

/// Gating policy consulted by the extraction engine every tick.
///
/// `can_extract` gates arriving at the resource and continued extraction.
/// `can_carry` gates leaving for the drop-off once a load is complete.
pub trait ExtractionGate {
    fn can_extract(&self) -> bool {
        true
    }

    fn can_carry(&self) -> bool {
        true
    }
}

/// The default policy: both predicates always hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysPermit;

impl ExtractionGate for AlwaysPermit {}

/// Gate built from two closures.
pub struct FnGate<E, C> {
    extract: E,
    carry: C,
}

impl<E, C> FnGate<E, C>
where
    E: Fn() -> bool,
    C: Fn() -> bool,
{
    pub fn new(extract: E, carry: C) -> Self {
        Self { extract, carry }
    }
}

impl<E, C> ExtractionGate for FnGate<E, C>
where
    E: Fn() -> bool,
    C: Fn() -> bool,
{
    fn can_extract(&self) -> bool {
        (self.extract)()
    }

    fn can_carry(&self) -> bool {
        (self.carry)()
    }
}

impl<E, C> std::fmt::Debug for FnGate<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnGate(<fn>, <fn>)")
    }
}
