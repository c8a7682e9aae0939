pub mod distinct_until_changed;
pub mod filter;
pub mod finalize;
pub mod map;
pub mod partition;

pub use distinct_until_changed::{
  DistinctUntilChangedOp, DistinctUntilKeyChangedOp, TryDistinctUntilChangedOp,
};
pub use filter::{FilterOp, TryFilterOp};
pub use finalize::FinalizeOp;
pub use map::{MapOp, TryMapOp};
pub use partition::PartitionOp;
