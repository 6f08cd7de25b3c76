use borsh::{BorshDeserialize, BorshSerialize};
use primitives::Bytes32;
use serde::{Deserialize, Serialize};

use crate::{error::InvalidPct, prover::Prover, Pczt, Result};

/// Accumulated trapdoor (`bsk`) and value commitment sum (`cv_sum`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Accumulator {
    /// Sum of value commitment trapdoors, signed for outputs
    pub bsk: Bytes32,
    /// Sum of value commitments, signed for outputs
    pub cv_sum: Bytes32,
}

/// Owns a proving engine context for the duration of one call
///
/// The context is released when the guard is dropped, on success and on every error path.
pub struct ProvingContextGuard<'p, P: Prover> {
    prover: &'p P,
    context: Option<P::Context>,
}

impl<'p, P: Prover> ProvingContextGuard<'p, P> {
    /// A new context with nothing accumulated
    pub fn fresh(prover: &'p P) -> Self {
        Self {
            prover,
            context: Some(prover.init_context()),
        }
    }

    /// Restore a context from `accumulator`
    pub fn resume(prover: &'p P, accumulator: &Accumulator) -> Result<Self, InvalidPct> {
        let context = prover
            .init_context_from_accumulator(accumulator)
            .ok_or(InvalidPct::AccumulatorRejected)?;

        Ok(Self {
            prover,
            context: Some(context),
        })
    }

    /// The engine that owns the context
    pub fn prover(&self) -> &'p P {
        self.prover
    }

    /// The engine context, for proof and signature calls
    pub fn context_mut(&mut self) -> &mut P::Context {
        #[allow(clippy::expect_used)]
        self.context
            .as_mut()
            .expect("the context is only taken on drop")
    }

    /// The current accumulator state
    pub fn accumulator(&self) -> Accumulator {
        #[allow(clippy::expect_used)]
        let context = self
            .context
            .as_ref()
            .expect("the context is only taken on drop");

        self.prover.accumulator(context)
    }
}

impl<P: Prover> Drop for ProvingContextGuard<'_, P> {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            self.prover.release(context);
        }
    }
}

impl Pczt {
    /// Acquire a proving context matching this instance's accumulator
    ///
    /// Resumes from `bsk`/`cv_sum` when both are set, and starts fresh when there are no records
    /// yet. Records without an accumulator are [`InvalidPct::AccumulatorMissing`].
    pub fn proving_context<'p, P: Prover>(
        &self,
        prover: &'p P,
    ) -> Result<ProvingContextGuard<'p, P>> {
        match self.global.accumulator() {
            Some(accumulator) => Ok(ProvingContextGuard::resume(prover, &accumulator)?),
            None if self.spends.is_empty() && self.outputs.is_empty() => {
                Ok(ProvingContextGuard::fresh(prover))
            }
            None => Err(InvalidPct::AccumulatorMissing.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{Error, InvalidPct},
        sapling::Spend,
        test_api::{MockProver, INVALID_BSK},
        Pczt,
    };

    use super::*;

    #[test]
    fn fresh_when_empty() {
        let prover = MockProver::default();
        let pczt = Pczt::default();

        let guard = pczt.proving_context(&prover).unwrap();
        assert_eq!(
            guard.accumulator(),
            Accumulator {
                bsk: Bytes32::ZERO,
                cv_sum: Bytes32::ZERO,
            }
        );
        drop(guard);

        assert_eq!(prover.contexts_acquired(), 1);
        assert_eq!(prover.contexts_released(), 1);
    }

    #[test]
    fn records_without_accumulator_are_invalid() {
        let prover = MockProver::default();
        let mut pczt = Pczt::default();
        pczt.spends.push(Spend::default());

        let result = pczt.proving_context(&prover);
        assert!(matches!(
            result,
            Err(Error::InvalidPct(InvalidPct::AccumulatorMissing))
        ));

        pczt.global.bsk = Some(Bytes32::from_u64(1));
        let result = pczt.proving_context(&prover);
        assert!(matches!(
            result,
            Err(Error::InvalidPct(InvalidPct::AccumulatorMissing))
        ));

        assert_eq!(prover.contexts_acquired(), 0);
    }

    #[test]
    fn resumes_stored_accumulator() {
        let prover = MockProver::default();
        let mut pczt = Pczt::default();
        let stored = Accumulator {
            bsk: Bytes32::from_u64(3),
            cv_sum: Bytes32::from_u64(4),
        };
        pczt.global.set_accumulator(stored);
        pczt.spends.push(Spend::default());

        let guard = pczt.proving_context(&prover).unwrap();
        assert_eq!(guard.accumulator(), stored);
        drop(guard);

        assert_eq!(prover.contexts_released(), 1);
    }

    #[test]
    fn rejected_accumulator() {
        let prover = MockProver::default();
        let mut pczt = Pczt::default();
        pczt.global.set_accumulator(Accumulator {
            bsk: INVALID_BSK,
            cv_sum: Bytes32::ZERO,
        });

        let result = pczt.proving_context(&prover);
        assert!(matches!(
            result,
            Err(Error::InvalidPct(InvalidPct::AccumulatorRejected))
        ));
        assert_eq!(prover.contexts_acquired(), 0);
        assert_eq!(prover.contexts_released(), 0);
    }
}
