//! Predicates shared by the training and model-diff circuits.

use tip_types::{Check, Field, Policy, Verdict};

/// Records the batch size, epoch count and loss checks.
pub(crate) fn check_hyperparameters(
    verdict: &mut Verdict,
    policy: &Policy,
    batch_size: u32,
    num_epochs: u32,
    final_loss: Field,
) {
    verdict
        .record(Check::BatchSize, policy.batch_size().contains(batch_size))
        .record(Check::Epochs, policy.num_epochs().contains(num_epochs))
        .record(Check::LossNonZero, !final_loss.is_zero())
        .record(Check::LossInRange, policy.loss().contains(final_loss));
}
