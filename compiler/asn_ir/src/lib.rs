//! ASN IR - identifiers shared by every layer of the schema engine.
//!
//! This crate contains the small, copyable building blocks that the grammar
//! collaborator hands to the engine and that the engine hands to codecs:
//! - Names for interned identifiers (`Name`, `StringInterner`)
//! - Arena handles (`TypeId`, `ModuleId`)
//! - Plain reference names (`RefName`, `FieldPath`, `ModuleRef`)
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers → `Name(u32)`, types → `TypeId(u32)`
//! - **Handles, not pointers**: recursive schemas refer to themselves by index
//! - Every type here is `Copy` or cheap to clone and implements `Eq + Hash`

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-copied types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod handle;
mod interner;
mod name;
mod refs;

pub use handle::{ModuleId, TypeId};
pub use interner::{InternError, StringInterner, StringLookup};
pub use name::Name;
pub use refs::{FieldPath, ModuleRef, RefName};

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{ModuleId, Name, TypeId};
    static_assert_size!(Name, 4);
    static_assert_size!(TypeId, 4);
    static_assert_size!(ModuleId, 4);
}
