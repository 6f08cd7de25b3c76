use pczt::{
    sapling::{Memo, PaymentAddress},
    Pczt, Prover, Zip32Derivation,
};
use tracing::{debug, warn};

use crate::{
    wallet::{SpendingKeys, Wallet, Witnesses},
    Error, FundingConfig, Result,
};

/// The provenance record for `keys`, as stored in the wallet's key metadata
pub fn key_provenance<W: Wallet>(wallet: &W, keys: &SpendingKeys) -> Result<Zip32Derivation> {
    let metadata = wallet.key_metadata(keys).map_err(Error::backend)?;
    Ok(Zip32Derivation::from_keypath(
        metadata.seed_fingerprint,
        &metadata.hd_keypath,
    )?)
}

fn spending_key<W: Wallet>(wallet: &W, address: &PaymentAddress) -> Result<SpendingKeys> {
    wallet
        .spending_key(address)
        .map_err(Error::backend)?
        .ok_or(Error::MissingSpendingKey)
}

/// Add spends from `address` until `config.fee` is covered, plus a change output for any surplus
///
/// Notes are used largest first. Each note's witness is only required once the note is reached,
/// so a missing witness for a note that ends up unused is not an error. Running out of notes
/// before the fee is covered is not an error either: the instance is left short and
/// [`Pczt::finalize`] decides whether that is acceptable.
#[tracing::instrument(err, skip(wallet, prover, pczt))]
pub fn fund_pczt<W: Wallet, P: Prover>(
    wallet: &W,
    prover: &P,
    pczt: &mut Pczt,
    address: &PaymentAddress,
    config: &FundingConfig,
) -> Result<()> {
    let keys = spending_key(wallet, address)?;
    let key = key_provenance(wallet, &keys)?;

    let mut notes = wallet
        .spendable_notes(address, config.min_confirmations)
        .map_err(Error::backend)?;
    // stable, so equal values keep the wallet's order
    notes.sort_by(|a, b| b.note.value.cmp(&a.note.value));

    let outpoints: Vec<_> = notes.iter().map(|note| note.outpoint).collect();
    let Witnesses { anchor, witnesses } = wallet.witnesses(&outpoints).map_err(Error::backend)?;

    if witnesses.len() != notes.len() {
        return Err(Error::WitnessCountMismatch {
            expected: notes.len(),
            actual: witnesses.len(),
        });
    }

    pczt.set_sapling_anchor(anchor)?;

    for (index, (candidate, witness)) in notes.iter().zip(witnesses).enumerate() {
        let witness = witness.ok_or(Error::MissingWitness { index })?;

        pczt.add_sapling_spend(
            prover,
            key.clone(),
            &keys.proof_generation_key,
            &candidate.note,
            &witness,
        )?;

        if pczt.fee() >= config.fee {
            break;
        }
    }

    let change = pczt.fee().saturating_sub(config.fee);
    if change > 0 {
        debug!(change, "adding change output");
        pczt.add_sapling_output(
            prover,
            key,
            &keys.ovk,
            *address,
            change.unsigned_abs(),
            &Memo::default(),
        )?;
    }

    if pczt.fee() < config.fee {
        warn!(
            fee = pczt.fee(),
            target = config.fee,
            "not enough spendable value to cover the fee"
        );
    }

    Ok(())
}

/// Add an output paying `value` to `to`, using the wallet's keys for `to`
#[tracing::instrument(err, skip(wallet, prover, pczt, memo))]
pub fn add_output_pczt<W: Wallet, P: Prover>(
    wallet: &W,
    prover: &P,
    pczt: &mut Pczt,
    to: &PaymentAddress,
    value: u64,
    memo: &Memo,
) -> Result<()> {
    let keys = spending_key(wallet, to)?;
    let key = key_provenance(wallet, &keys)?;

    pczt.add_sapling_output(prover, key, &keys.ovk, *to, value, memo)?;

    Ok(())
}
