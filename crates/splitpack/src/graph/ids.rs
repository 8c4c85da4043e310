use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

arena_id!(
    /// Numeric module identity, assigned in discovery order starting at 0.
    ModuleId
);

arena_id!(
    /// Numeric chunk identity. Chunk 0 is always the entry chunk.
    ChunkId
);

arena_id!(
    /// Index of an async-boundary require context inside the graph arena.
    BoundaryId
);

impl ChunkId {
    /// The entry chunk.
    pub const ENTRY: ChunkId = ChunkId(0);
}
