//! Integer types usable for the children offset column.

use std::fmt::Debug;

/// Unsigned integer used to store running child counts.
///
/// Picking a narrower type than `u64` trades the maximum node count for
/// memory. Conversions are checked; nothing is truncated silently.
pub trait ChildrenOffsetEnd: Copy + Ord + Debug + Default {
    /// Convert from `u64`, `None` if the value does not fit.
    fn from_u64(value: u64) -> Option<Self>;

    /// Widen to `u64`.
    fn to_u64(self) -> u64;
}

macro_rules! impl_children_offset_end {
    ($($ty:ty),*) => {
        $(
            impl ChildrenOffsetEnd for $ty {
                #[inline]
                fn from_u64(value: u64) -> Option<Self> {
                    <$ty>::try_from(value).ok()
                }

                #[inline]
                fn to_u64(self) -> u64 {
                    u64::from(self)
                }
            }
        )*
    };
}

impl_children_offset_end!(u8, u16, u32, u64);
