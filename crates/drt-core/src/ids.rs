//! Strongly typed, zero-cost identifier wrappers.
//!
//! Vehicles and requests live in arenas (`Vec`s) and are addressed by these
//! ids everywhere outside the arena owner.  All ids are `Copy + Ord + Hash`,
//! so they double as map keys and as deterministic tie-breakers (the
//! optimizer prefers the lowest `VehicleId` among equal-cost candidates).

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as an arena index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a vehicle in the fleet arena.
    pub struct VehicleId(u32);
}

typed_id! {
    /// Index of a trip request in the registry arena.  Assigned in submission
    /// order, so it also serves as the secondary key of the `(t0, id)` queue.
    pub struct RequestId(u32);
}

typed_id! {
    /// Index of a road-network node.  Stops, origins and destinations are nodes.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed road-network link.
    pub struct LinkId(u32);
}
