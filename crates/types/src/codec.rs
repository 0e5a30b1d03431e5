//! Fixed-width payload codec.
//!
//! Every field of a record occupies one 32-byte big-endian slot regardless of
//! its logical width. Integers are zero-padded, [`Field`]s are sign-extended
//! and hashes are copied verbatim. Decoding is strict: the payload must be
//! exactly `SLOTS * 32` bytes and every padded slot must be canonical, so a
//! decoded record always re-encodes to the bytes it came from.

use crate::{
    DatasetCommitment, DatasetDescriptor, DiffCommitment, Field, ModelDiffRecord, ProofHash,
    ProofKind, ProofRecord, TrainingRecord,
    constants::{DATA_INTEGRITY_SLOTS, MODEL_DIFF_SLOTS, NUM_PARAMS, SLOT_SIZE, TRAINING_SLOTS},
    errors::PayloadError,
    record::Params,
};

/// One encoded slot.
pub type Word = [u8; SLOT_SIZE];

/// Encodes a `u32` into a zero-padded slot.
pub fn u32_word(value: u32) -> Word {
    let mut word = [0; SLOT_SIZE];
    word[SLOT_SIZE - 4..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encodes a `bool` as the integer slot 0 or 1.
pub fn bool_word(value: bool) -> Word {
    u32_word(value as u32)
}

/// Accumulates slots in order.
#[derive(Debug, Default)]
pub struct SlotWriter {
    words: Vec<Word>,
}

impl SlotWriter {
    /// Creates a writer with room for `slots` words.
    pub fn with_capacity(slots: usize) -> Self {
        Self {
            words: Vec::with_capacity(slots),
        }
    }

    /// Appends a raw word.
    pub fn word(&mut self, word: Word) -> &mut Self {
        self.words.push(word);
        self
    }

    /// Appends a zero-padded integer.
    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.word(u32_word(value))
    }

    /// Appends a sign-extended field element.
    pub fn field(&mut self, value: Field) -> &mut Self {
        self.word(value.to_word())
    }

    /// Appends each parameter in order.
    pub fn params(&mut self, params: &Params) -> &mut Self {
        for p in params {
            self.field(*p);
        }
        self
    }

    /// Returns the accumulated words.
    pub fn into_words(self) -> Vec<Word> {
        self.words
    }
}

/// Reads slots in order from a payload of known length.
#[derive(Debug)]
pub struct SlotReader<'a> {
    buf: &'a [u8],
    slot: usize,
}

impl<'a> SlotReader<'a> {
    /// Checks the payload length and positions the reader at slot 0.
    pub fn new(buf: &'a [u8], slots: usize) -> Result<Self, PayloadError> {
        let expected = slots * SLOT_SIZE;
        if buf.len() < expected {
            return Err(PayloadError::Truncated {
                expected,
                actual: buf.len(),
            });
        }
        if buf.len() > expected {
            return Err(PayloadError::TrailingBytes {
                extra: buf.len() - expected,
            });
        }
        Ok(Self { buf, slot: 0 })
    }

    fn next_word(&mut self) -> Word {
        let start = self.slot * SLOT_SIZE;
        let mut word = [0; SLOT_SIZE];
        word.copy_from_slice(&self.buf[start..start + SLOT_SIZE]);
        self.slot += 1;
        word
    }

    /// Reads a raw word.
    pub fn word(&mut self) -> Word {
        self.next_word()
    }

    /// Reads a zero-padded integer.
    pub fn u32(&mut self) -> Result<u32, PayloadError> {
        let slot = self.slot;
        let word = self.next_word();
        if word[..SLOT_SIZE - 4].iter().any(|b| *b != 0) {
            return Err(PayloadError::NonCanonicalInteger { slot });
        }
        let mut tail = [0; 4];
        tail.copy_from_slice(&word[SLOT_SIZE - 4..]);
        Ok(u32::from_be_bytes(tail))
    }

    /// Reads a sign-extended field element.
    pub fn field(&mut self) -> Result<Field, PayloadError> {
        let slot = self.slot;
        Field::from_word(&self.next_word()).ok_or(PayloadError::NonCanonicalField { slot })
    }

    /// Reads [`NUM_PARAMS`] field elements.
    pub fn params(&mut self) -> Result<Params, PayloadError> {
        let mut params = [Field::ZERO; NUM_PARAMS];
        for p in &mut params {
            *p = self.field()?;
        }
        Ok(params)
    }
}

/// A record with a fixed-width slot layout.
pub trait FixedWidth: Sized {
    /// Number of slots in the encoding.
    const SLOTS: usize;

    /// Writes every field in layout order.
    fn write_slots(&self, w: &mut SlotWriter);

    /// Reads every field in layout order.
    fn read_slots(r: &mut SlotReader<'_>) -> Result<Self, PayloadError>;

    /// Returns the encoded slots, the input of record fingerprints.
    fn to_words(&self) -> Vec<Word> {
        let mut w = SlotWriter::with_capacity(Self::SLOTS);
        self.write_slots(&mut w);
        w.into_words()
    }

    /// Encodes into a flat payload.
    fn encode(&self) -> Vec<u8> {
        self.to_words().concat()
    }

    /// Decodes a flat payload.
    fn decode(buf: &[u8]) -> Result<Self, PayloadError> {
        let mut r = SlotReader::new(buf, Self::SLOTS)?;
        Self::read_slots(&mut r)
    }
}

impl FixedWidth for TrainingRecord {
    const SLOTS: usize = TRAINING_SLOTS;

    fn write_slots(&self, w: &mut SlotWriter) {
        w.word(self.dataset_commitment.into_inner())
            .params(&self.params_before)
            .params(&self.params_after)
            .u32(self.batch_size)
            .u32(self.num_epochs)
            .field(self.final_loss)
            .field(self.seed);
    }

    fn read_slots(r: &mut SlotReader<'_>) -> Result<Self, PayloadError> {
        Ok(Self {
            dataset_commitment: DatasetCommitment::new(r.word()),
            params_before: r.params()?,
            params_after: r.params()?,
            batch_size: r.u32()?,
            num_epochs: r.u32()?,
            final_loss: r.field()?,
            seed: r.field()?,
        })
    }
}

impl FixedWidth for DatasetDescriptor {
    const SLOTS: usize = DATA_INTEGRITY_SLOTS;

    fn write_slots(&self, w: &mut SlotWriter) {
        w.word(self.dataset_commitment.into_inner())
            .u32(self.num_samples)
            .u32(self.size_bytes)
            .u32(self.feature_dim)
            .u32(self.num_classes)
            .u32(self.format_version);
    }

    fn read_slots(r: &mut SlotReader<'_>) -> Result<Self, PayloadError> {
        Ok(Self {
            dataset_commitment: DatasetCommitment::new(r.word()),
            num_samples: r.u32()?,
            size_bytes: r.u32()?,
            feature_dim: r.u32()?,
            num_classes: r.u32()?,
            format_version: r.u32()?,
        })
    }
}

impl FixedWidth for ModelDiffRecord {
    const SLOTS: usize = MODEL_DIFF_SLOTS;

    fn write_slots(&self, w: &mut SlotWriter) {
        w.word(self.training_proof_hash.into_inner())
            .params(&self.params_before)
            .params(&self.params_after)
            .word(self.diff_commitment.into_inner())
            .u32(self.batch_size)
            .u32(self.num_epochs)
            .field(self.final_loss);
    }

    fn read_slots(r: &mut SlotReader<'_>) -> Result<Self, PayloadError> {
        Ok(Self {
            training_proof_hash: ProofHash::new(r.word()),
            params_before: r.params()?,
            params_after: r.params()?,
            diff_commitment: DiffCommitment::new(r.word()),
            batch_size: r.u32()?,
            num_epochs: r.u32()?,
            final_loss: r.field()?,
        })
    }
}

impl ProofRecord {
    /// Encoded slots of the inner record.
    pub fn to_words(&self) -> Vec<Word> {
        match self {
            Self::Training(r) => r.to_words(),
            Self::DataIntegrity(r) => r.to_words(),
            Self::ModelDiff(r) => r.to_words(),
        }
    }

    /// Encodes the inner record into a flat payload.
    pub fn encode(&self) -> Vec<u8> {
        self.to_words().concat()
    }

    /// Decodes a payload under the layout of `kind`.
    pub fn decode(kind: ProofKind, buf: &[u8]) -> Result<Self, PayloadError> {
        Ok(match kind {
            ProofKind::Training => TrainingRecord::decode(buf)?.into(),
            ProofKind::DataIntegrity => DatasetDescriptor::decode(buf)?.into(),
            ProofKind::ModelDiff => ModelDiffRecord::decode(buf)?.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn params_strategy() -> impl Strategy<Value = Params> {
        any::<[i64; NUM_PARAMS]>().prop_map(|raw| raw.map(|v| Field::from_raw(v as i128)))
    }

    fn training_strategy() -> impl Strategy<Value = TrainingRecord> {
        (
            any::<[u8; 32]>(),
            params_strategy(),
            params_strategy(),
            any::<(u32, u32)>(),
            any::<(i64, i64)>(),
        )
            .prop_map(|(commitment, before, after, (batch, epochs), (loss, seed))| {
                TrainingRecord {
                    dataset_commitment: DatasetCommitment::new(commitment),
                    params_before: before,
                    params_after: after,
                    batch_size: batch,
                    num_epochs: epochs,
                    final_loss: Field::from_raw(loss as i128),
                    seed: Field::from_raw(seed as i128),
                }
            })
    }

    fn descriptor() -> DatasetDescriptor {
        DatasetDescriptor {
            dataset_commitment: DatasetCommitment::from_u64(123_456_789),
            num_samples: 1000,
            size_bytes: 100_000,
            feature_dim: 768,
            num_classes: 2,
            format_version: 1,
        }
    }

    #[test]
    fn test_descriptor_layout() {
        let bytes = descriptor().encode();
        assert_eq!(bytes.len(), DATA_INTEGRITY_SLOTS * SLOT_SIZE);
        // num_samples sits in the low bytes of slot 1
        assert_eq!(&bytes[60..64], &1000u32.to_be_bytes());
        assert!(bytes[32..60].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = descriptor().encode();
        let err = DatasetDescriptor::decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(
            err,
            PayloadError::Truncated {
                expected: 192,
                actual: 191
            }
        );
        assert!(matches!(
            TrainingRecord::decode(&[]),
            Err(PayloadError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_dispatches_on_kind() {
        let bytes = descriptor().encode();
        assert_eq!(
            ProofRecord::decode(ProofKind::DataIntegrity, &bytes).unwrap(),
            ProofRecord::DataIntegrity(descriptor())
        );
        assert_eq!(
            ProofRecord::decode(ProofKind::Training, &bytes),
            Err(PayloadError::Truncated {
                expected: TRAINING_SLOTS * SLOT_SIZE,
                actual: bytes.len()
            })
        );
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = descriptor().encode();
        bytes.push(0);
        assert_eq!(
            DatasetDescriptor::decode(&bytes),
            Err(PayloadError::TrailingBytes { extra: 1 })
        );
    }

    #[test]
    fn test_non_canonical_integer() {
        let mut bytes = descriptor().encode();
        // high byte of slot 5 (format_version)
        bytes[5 * SLOT_SIZE] = 1;
        assert_eq!(
            DatasetDescriptor::decode(&bytes),
            Err(PayloadError::NonCanonicalInteger { slot: 5 })
        );
    }

    #[test]
    fn test_non_canonical_field() {
        let record = TrainingRecord {
            dataset_commitment: DatasetCommitment::from_u64(1),
            params_before: [Field::ZERO; NUM_PARAMS],
            params_after: [Field::from_int(1); NUM_PARAMS],
            batch_size: 32,
            num_epochs: 1,
            final_loss: Field::from_decimal(0.5),
            seed: Field::from_raw(42),
        };
        let mut bytes = record.encode();
        // first byte of params_before[2], slot 3
        bytes[3 * SLOT_SIZE] = 0x80;
        assert_eq!(
            TrainingRecord::decode(&bytes),
            Err(PayloadError::NonCanonicalField { slot: 3 })
        );
    }

    proptest! {
        #[test]
        fn training_decode_reencodes_exactly(record in training_strategy()) {
            let bytes = record.encode();
            let decoded = TrainingRecord::decode(&bytes).unwrap();
            prop_assert_eq!(&decoded, &record);
            prop_assert_eq!(decoded.encode(), bytes);
        }

        #[test]
        fn canonical_model_diff_payload_survives_decode(
            hashes in any::<([u8; 32], [u8; 32])>(),
            before in params_strategy(),
            after in params_strategy(),
            counts in any::<(u32, u32)>(),
            loss in any::<i64>(),
        ) {
            let mut w = SlotWriter::with_capacity(MODEL_DIFF_SLOTS);
            w.word(hashes.0)
                .params(&before)
                .params(&after)
                .word(hashes.1)
                .u32(counts.0)
                .u32(counts.1)
                .field(Field::from_raw(loss as i128));
            let bytes = w.into_words().concat();
            let decoded = ModelDiffRecord::decode(&bytes).unwrap();
            prop_assert_eq!(decoded.encode(), bytes);
        }
    }
}
