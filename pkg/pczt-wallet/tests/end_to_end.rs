use std::convert::Infallible;

use pczt::{
    combine,
    consensus::ConsensusParams,
    sapling::{Memo, PaymentAddress},
    test_api::{self, MockProver},
    Error as PcztError, Pczt,
};
use pczt_wallet::{
    fund_pczt, FundingConfig, KeyMetadata, OutPoint, SpendableNote, SpendingKeys, Wallet,
    Witnesses,
};
use primitives::{BlockHeight, Bytes32};

/// A wallet holding a fixed set of confirmed notes for the fixture address
struct Ledger {
    notes: Vec<SpendableNote>,
}

impl Ledger {
    fn new(values: &[u64]) -> Self {
        let notes = values
            .iter()
            .zip(1u64..)
            .map(|(value, n)| SpendableNote {
                outpoint: OutPoint {
                    txid: Bytes32::from_u64(n),
                    index: 0,
                },
                note: pczt::sapling::Note::new(test_api::address(), *value, Bytes32::from_u64(n)),
            })
            .collect();

        Self { notes }
    }
}

impl Wallet for Ledger {
    type Error = Infallible;

    fn spending_key(&self, address: &PaymentAddress) -> Result<Option<SpendingKeys>, Infallible> {
        Ok((*address == test_api::address()).then(|| SpendingKeys {
            proof_generation_key: test_api::proof_generation_key(),
            ovk: test_api::ovk(),
        }))
    }

    fn key_metadata(&self, _keys: &SpendingKeys) -> Result<KeyMetadata, Infallible> {
        Ok(KeyMetadata {
            seed_fingerprint: Bytes32([6; 32]),
            hd_keypath: "m/32'/133'/0'".to_owned(),
        })
    }

    fn spendable_notes(
        &self,
        _address: &PaymentAddress,
        _min_confirmations: u32,
    ) -> Result<Vec<SpendableNote>, Infallible> {
        Ok(self.notes.clone())
    }

    fn witnesses(&self, outpoints: &[OutPoint]) -> Result<Witnesses, Infallible> {
        Ok(Witnesses {
            anchor: test_api::ANCHOR,
            witnesses: outpoints
                .iter()
                .enumerate()
                .map(|(position, _)| Some(test_api::witness(test_api::ANCHOR, position as u64)))
                .collect(),
        })
    }
}

fn height() -> BlockHeight {
    BlockHeight::at(1_000)
}

fn recipient() -> PaymentAddress {
    PaymentAddress {
        diversifier: [7; 11],
        pk_d: Bytes32([8; 32]),
    }
}

#[test]
fn fund_sign_combine_finalize() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let params = ConsensusParams::regtest();
    let prover = MockProver::new(7);
    let wallet = Ledger::new(&[50_000, 30_000, 5_000]);

    // funder
    let mut pczt = Pczt::new(&params, height());
    pczt.add_sapling_output(
        &prover,
        test_api::key(),
        &test_api::ovk(),
        recipient(),
        25_000,
        &Memo::from_bytes(b"thanks").unwrap(),
    )
    .unwrap();
    fund_pczt(&wallet, &prover, &mut pczt, &test_api::address(), &FundingConfig::default())
        .unwrap();

    assert_eq!(pczt.spends().len(), 1);
    assert_eq!(pczt.spends()[0].value, 50_000);
    assert_eq!(pczt.outputs().len(), 2);
    assert_eq!(pczt.outputs()[1].value, 15_000);
    assert_eq!(pczt.fee(), 10_000);

    let unsigned = pczt.serialize();

    // signer, working from the text form only
    let mut signed = Pczt::parse(&unsigned).unwrap();
    let sighash = signed.sighash(height(), &params).unwrap();
    assert_eq!(sighash, pczt.sighash(height(), &params).unwrap());
    signed.set_spend_auth_sig(0, sighash.to_vec().repeat(2)).unwrap();

    let unsigned = Pczt::parse(&unsigned).unwrap();
    assert!(matches!(
        unsigned.finalize(&prover, height(), &params),
        Err(PcztError::MissingSignature { index: 0 })
    ));

    // finalizer
    let combined = combine([unsigned, Pczt::parse(&signed.serialize()).unwrap()]).unwrap();
    assert_eq!(combined, signed);

    let tx = combined.finalize(&prover, height(), &params).unwrap();

    assert_eq!(tx.value_balance, 10_000);
    assert_eq!(tx.shielded_spends[0].anchor, test_api::ANCHOR);
    assert_eq!(tx.shielded_spends[0].spend_auth_sig.to_vec(), sighash.to_vec().repeat(2));
    assert_eq!(
        tx.binding_sig,
        test_api::binding_signature_for(&combined.global().bsk.unwrap(), &sighash)
    );
    assert!(!tx.to_hex().is_empty());

    assert_eq!(prover.contexts_acquired(), prover.contexts_released());
}

#[test]
fn output_only_is_negative_fee() {
    let params = ConsensusParams::regtest();
    let prover = MockProver::default();

    let mut pczt = Pczt::new(&params, height());
    pczt.add_sapling_output(
        &prover,
        test_api::key(),
        &test_api::ovk(),
        recipient(),
        100_000,
        &Memo::default(),
    )
    .unwrap();

    assert_eq!(pczt.fee(), -100_000);
    assert!(matches!(
        pczt.finalize(&prover, height(), &params),
        Err(PcztError::NegativeFee {
            value_balance: -100_000
        })
    ));
}

#[test]
fn json_inspection() {
    let prover = MockProver::default();
    let wallet = Ledger::new(&[20_000]);

    let mut pczt = Pczt::new(&ConsensusParams::regtest(), height());
    fund_pczt(&wallet, &prover, &mut pczt, &test_api::address(), &FundingConfig::default())
        .unwrap();

    let json = serde_json::to_value(&pczt).unwrap();
    assert_eq!(json["global"]["value_balance"], 10_000);
    assert_eq!(json["spends"][0]["spend_auth_sig"], serde_json::Value::Null);
    assert_eq!(
        json["spends"][0]["zkproof"].as_str().map(str::len),
        Some(2 * pczt::constants::GROTH_PROOF_SIZE)
    );

    let again: Pczt = serde_json::from_value(json).unwrap();
    assert_eq!(again, pczt);
}
