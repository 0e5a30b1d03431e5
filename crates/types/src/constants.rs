//! Wire-format, fixed-point and policy constants.

/// Width in bytes of one encoded slot (integer, field element or hash).
pub const SLOT_SIZE: usize = 32;

/// Number of model parameters sampled into each record.
pub const NUM_PARAMS: usize = 4;

/// Fixed-point scale of [`Field`](crate::Field): one unit is `10^-9`.
pub const FIELD_SCALE: i128 = 1_000_000_000;

/// Slots in an encoded training record.
pub const TRAINING_SLOTS: usize = 1 + 2 * NUM_PARAMS + 4;

/// Slots in an encoded dataset descriptor.
pub const DATA_INTEGRITY_SLOTS: usize = 6;

/// Slots in an encoded model-diff record.
pub const MODEL_DIFF_SLOTS: usize = 1 + 2 * NUM_PARAMS + 1 + 3;

/// The dataset format version accepted by the default policy.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Default inclusive batch size bounds.
pub const DEFAULT_BATCH_SIZE: (u32, u32) = (1, 1024);

/// Default inclusive epoch count bounds.
pub const DEFAULT_EPOCHS: (u32, u32) = (1, 100);

/// Default inclusive sample count bounds.
pub const DEFAULT_NUM_SAMPLES: (u32, u32) = (1, 10_000_000);

/// Default inclusive dataset size bounds, in bytes.
pub const DEFAULT_SIZE_BYTES: (u32, u32) = (1, 4_000_000_000);

/// Default inclusive feature dimension bounds.
pub const DEFAULT_FEATURE_DIM: (u32, u32) = (1, 1 << 16);

/// Default inclusive class count bounds.
pub const DEFAULT_NUM_CLASSES: (u32, u32) = (1, 100_000);

/// Default upper loss bound, in whole units.
///
/// The default loss range is `(0, DEFAULT_MAX_LOSS]`: its lower bound is the
/// smallest positive field unit, so besides zero it also rejects negative
/// losses and anything above this bound. Widen it through the policy when a
/// loss function can go negative.
pub const DEFAULT_MAX_LOSS: i128 = 1_000;
