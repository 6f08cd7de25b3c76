use primitives::Bytes32;
use ::proptest::{collection::vec, option, prelude::*};

use crate::{common::Zip32Derivation, Global, Output, Pczt, Spend};

fn bytes() -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..200)
}

impl Arbitrary for Zip32Derivation {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        (any::<Bytes32>(), vec(any::<u32>(), 0..6))
            .prop_map(|(seed_fingerprint, derivation_path)| Self {
                seed_fingerprint,
                derivation_path,
            })
            .boxed()
    }
}

impl Arbitrary for Global {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        (
            any::<u32>(),
            any::<u32>(),
            any::<u32>(),
            any::<u32>(),
            option::of(any::<Bytes32>()),
            any::<i64>(),
            option::of((any::<Bytes32>(), any::<Bytes32>())),
        )
            .prop_map(
                |(
                    tx_version,
                    version_group_id,
                    lock_time,
                    expiry_height,
                    sapling_anchor,
                    value_balance,
                    accumulator,
                )| Self {
                    tx_version,
                    version_group_id,
                    lock_time,
                    expiry_height,
                    sapling_anchor,
                    value_balance,
                    bsk: accumulator.map(|(bsk, _)| bsk),
                    cv_sum: accumulator.map(|(_, cv_sum)| cv_sum),
                },
            )
            .boxed()
    }
}

impl Arbitrary for Spend {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        (
            any::<[Bytes32; 3]>(),
            bytes(),
            option::of(bytes()),
            any::<Bytes32>(),
            any::<u64>(),
            any::<Bytes32>(),
            any::<Zip32Derivation>(),
        )
            .prop_map(
                |([cv, nullifier, rk], zkproof, spend_auth_sig, alpha, value, rcv, key)| Self {
                    cv,
                    nullifier,
                    rk,
                    zkproof,
                    spend_auth_sig,
                    alpha,
                    value,
                    rcv,
                    key,
                },
            )
            .boxed()
    }
}

impl Arbitrary for Output {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        (
            any::<[Bytes32; 3]>(),
            [bytes(), bytes(), bytes()],
            any::<u64>(),
            any::<Bytes32>(),
            any::<Zip32Derivation>(),
        )
            .prop_map(
                |(
                    [cv, cmu, ephemeral_key],
                    [enc_ciphertext, out_ciphertext, zkproof],
                    value,
                    rcv,
                    key,
                )| Self {
                    cv,
                    cmu,
                    ephemeral_key,
                    enc_ciphertext,
                    out_ciphertext,
                    zkproof,
                    value,
                    rcv,
                    key,
                },
            )
            .boxed()
    }
}

impl Arbitrary for Pczt {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        (
            any::<Global>(),
            vec(any::<Spend>(), 0..3),
            vec(any::<Output>(), 0..3),
        )
            .prop_map(|(global, spends, outputs)| Self {
                global,
                spends,
                outputs,
            })
            .boxed()
    }
}
