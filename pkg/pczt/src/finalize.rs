use primitives::BlockHeight;
use tracing::debug;

use crate::{
    accumulator::ProvingContextGuard, consensus::ConsensusParams, error::InvalidPct,
    prover::Prover, Error, Pczt, Result, Transaction,
};

impl Pczt {
    /// Produce the binding signature and the finished transaction
    ///
    /// Checked in order: the fee is not negative, every spend is signed, and the accumulator is
    /// present. The digest uses the consensus branch active at `height`.
    #[tracing::instrument(err, skip(self, prover, params))]
    pub fn finalize<P: Prover>(
        &self,
        prover: &P,
        height: BlockHeight,
        params: &ConsensusParams,
    ) -> Result<Transaction> {
        let value_balance = self.global.value_balance;
        if value_balance < 0 {
            return Err(Error::NegativeFee { value_balance });
        }

        if let Some(index) = self
            .spends
            .iter()
            .position(|spend| spend.signature().is_none())
        {
            return Err(Error::MissingSignature { index });
        }

        let accumulator = self
            .global
            .accumulator()
            .ok_or(InvalidPct::AccumulatorMissing)?;

        let mut tx = self.project()?;
        let branch_id = params.branch_id(height);
        let sighash = tx.sighash(branch_id);

        let mut guard = ProvingContextGuard::resume(prover, &accumulator)?;
        tx.binding_sig = prover
            .binding_signature(guard.context_mut(), value_balance, &sighash)
            .map_err(Error::BindingSignature)?;

        debug!(?branch_id, %sighash, "finalized PCZT");

        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use primitives::Bytes32;

    use crate::{
        sapling::Memo,
        test_api::{self, MockProver},
    };

    use super::*;

    fn height() -> BlockHeight {
        BlockHeight::at(100)
    }

    fn params() -> ConsensusParams {
        ConsensusParams::regtest()
    }

    fn funded(prover: &MockProver, spends: &[u64], outputs: &[u64]) -> Pczt {
        let mut pczt = Pczt::new(&params(), height());
        pczt.set_sapling_anchor(test_api::ANCHOR).unwrap();

        for (position, value) in spends.iter().enumerate() {
            pczt.add_sapling_spend(
                prover,
                test_api::key(),
                &test_api::proof_generation_key(),
                &test_api::note(*value),
                &test_api::witness(test_api::ANCHOR, position as u64),
            )
            .unwrap();
        }

        for value in outputs {
            pczt.add_sapling_output(
                prover,
                test_api::key(),
                &test_api::ovk(),
                test_api::address(),
                *value,
                &Memo::default(),
            )
            .unwrap();
        }

        pczt
    }

    fn sign_all(pczt: &mut Pczt) {
        for index in 0..pczt.spends().len() {
            pczt.set_spend_auth_sig(index, vec![1; 64]).unwrap();
        }
    }

    #[test]
    fn negative_fee() {
        let prover = MockProver::default();
        let pczt = funded(&prover, &[], &[100_000]);
        assert_eq!(pczt.fee(), -100_000);

        let result = pczt.finalize(&prover, height(), &params());
        assert!(matches!(
            result,
            Err(Error::NegativeFee {
                value_balance: -100_000
            })
        ));
    }

    #[test]
    fn missing_signature_reports_first_unsigned() {
        let prover = MockProver::default();
        let mut pczt = funded(&prover, &[10, 20, 30], &[]);
        sign_all(&mut pczt);
        pczt.spends[1].spend_auth_sig = None;

        let result = pczt.finalize(&prover, height(), &params());
        assert!(matches!(result, Err(Error::MissingSignature { index: 1 })));
    }

    #[test]
    fn empty_signature_is_missing() {
        let prover = MockProver::default();
        let mut pczt = funded(&prover, &[10, 20], &[]);
        sign_all(&mut pczt);

        let mut json = serde_json::to_value(&pczt).unwrap();
        json["spends"][0]["spend_auth_sig"] = serde_json::Value::String(String::new());
        let pczt: Pczt = serde_json::from_value(json).unwrap();
        assert_eq!(pczt.spends[0].spend_auth_sig, Some(vec![]));

        let result = pczt.finalize(&prover, height(), &params());
        assert!(matches!(result, Err(Error::MissingSignature { index: 0 })));
    }

    #[test]
    fn fee_is_checked_before_signatures() {
        let prover = MockProver::default();
        let pczt = funded(&prover, &[10], &[20]);

        let result = pczt.finalize(&prover, height(), &params());
        assert!(matches!(result, Err(Error::NegativeFee { .. })));
    }

    #[test]
    fn missing_accumulator() {
        let prover = MockProver::default();
        let mut pczt = funded(&prover, &[10], &[]);
        sign_all(&mut pczt);
        pczt.global.bsk = None;

        let result = pczt.finalize(&prover, height(), &params());
        assert!(matches!(
            result,
            Err(Error::InvalidPct(InvalidPct::AccumulatorMissing))
        ));
    }

    #[test]
    fn binding_signature_verifies() {
        let prover = MockProver::default();
        let mut pczt = funded(&prover, &[50_000, 5_000], &[40_000]);
        sign_all(&mut pczt);

        let tx = pczt.finalize(&prover, height(), &params()).unwrap();

        assert_eq!(tx.value_balance, 15_000);
        assert_eq!(tx.shielded_spends.len(), 2);
        assert_eq!(tx.shielded_outputs.len(), 1);

        let sighash = pczt.sighash(height(), &params()).unwrap();
        let bsk = pczt.global.bsk.unwrap();
        assert_eq!(tx.binding_sig, test_api::binding_signature_for(&bsk, &sighash));
        assert_eq!(prover.contexts_acquired(), prover.contexts_released());
    }

    #[test]
    fn tampered_balance_fails_binding_signature() {
        let prover = MockProver::default();
        let mut pczt = funded(&prover, &[50_000], &[]);
        sign_all(&mut pczt);
        pczt.global.value_balance = 60_000;

        let result = pczt.finalize(&prover, height(), &params());
        assert!(matches!(result, Err(Error::BindingSignature(_))));
        assert_eq!(prover.contexts_acquired(), prover.contexts_released());
    }

    #[test]
    fn rejected_accumulator() {
        let prover = MockProver::default();
        let mut pczt = funded(&prover, &[50_000], &[]);
        sign_all(&mut pczt);
        pczt.global.bsk = Some(test_api::INVALID_BSK);

        let result = pczt.finalize(&prover, height(), &params());
        assert!(matches!(
            result,
            Err(Error::InvalidPct(InvalidPct::AccumulatorRejected))
        ));
    }

    #[test]
    fn malformed_proof() {
        let prover = MockProver::default();
        let mut pczt = funded(&prover, &[50_000], &[]);
        sign_all(&mut pczt);
        pczt.spends[0].zkproof.truncate(10);

        let result = pczt.finalize(&prover, height(), &params());
        assert!(matches!(
            result,
            Err(Error::MalformedField {
                field: "zkproof",
                actual: 10,
                ..
            })
        ));
        assert_eq!(prover.contexts_acquired(), prover.contexts_released());
    }

    #[test]
    fn empty_transaction_finalizes() {
        let prover = MockProver::default();
        let mut pczt = funded(&prover, &[], &[]);
        pczt.global.bsk = Some(Bytes32::ZERO);
        pczt.global.cv_sum = Some(Bytes32::ZERO);

        let tx = pczt.finalize(&prover, height(), &params()).unwrap();
        assert!(tx.shielded_spends.is_empty());
    }
}
