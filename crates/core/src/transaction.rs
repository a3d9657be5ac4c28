//! Transaction types and signing.
//!
//! A transaction spends prior outputs (referenced by transaction hash and
//! output index) and creates new outputs. Signing covers the inputs'
//! references and the outputs, never the signatures themselves, so the
//! signable bytes can be rebuilt by anyone holding the transaction.

use crate::codec::{Encode, Encoder};
use crate::crypto::{CryptoError, KeyIdentity, PublicKey, Signature};
use crate::hash::{hash, Hash};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default amount credited by a reward transaction.
pub const COINBASE_REWARD: u64 = 25;

/// A reference to an output of an earlier transaction, plus the spender's
/// signature once signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    /// Hash of the transaction that created the output.
    pub source_hash: Hash,
    /// Position of the output in that transaction's output list.
    pub source_index: u64,
    /// Absent until the transaction is signed.
    pub signature: Option<Signature>,
}

impl TransactionInput {
    /// An unsigned input.
    pub fn new(source_hash: Hash, source_index: u64) -> Self {
        Self {
            source_hash,
            source_index,
            signature: None,
        }
    }

    /// The part of the input covered by signatures.
    fn encode_signable(&self, enc: &mut Encoder) {
        enc.put_hash(&self.source_hash).put_u64(self.source_index);
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

impl Encode for TransactionInput {
    fn encode_to(&self, enc: &mut Encoder) {
        self.encode_signable(enc);
        enc.put_option(self.signature.as_ref());
    }
}

/// Value credited to a public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    pub amount: u64,
    /// Recipient public key (PEM), used directly rather than hashed.
    pub address: PublicKey,
}

impl TransactionOutput {
    pub fn new(amount: u64, address: PublicKey) -> Self {
        Self { amount, address }
    }
}

impl Encode for TransactionOutput {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put_u64(self.amount);
        self.address.encode_to(enc);
    }
}

/// A transaction: ordered inputs and ordered outputs.
///
/// The input and output lists are fixed at construction; only the inputs'
/// signatures are filled in afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    /// Create a transaction. Input references are not resolved here.
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        Self { inputs, outputs }
    }

    /// A reward transaction: no inputs, one output.
    pub fn coinbase(recipient: PublicKey, amount: u64) -> Self {
        Self::new(Vec::new(), vec![TransactionOutput::new(amount, recipient)])
    }

    /// A reward transaction for [`COINBASE_REWARD`].
    pub fn reward(recipient: PublicKey) -> Self {
        Self::coinbase(recipient, COINBASE_REWARD)
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    /// No inputs: new value entering the ledger.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty() && !self.outputs.is_empty()
    }

    /// Sum of output amounts, `None` on overflow.
    pub fn total_output(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.amount))
    }

    /// The bytes every input's signature covers: the inputs' source
    /// references and the outputs, with no signatures.
    pub fn signable_encoding(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.put_seq_with(&self.inputs, |enc, input| input.encode_signable(enc))
            .put_seq(&self.outputs);
        enc.finish()
    }

    /// The full canonical encoding, including whatever signatures are present.
    pub fn encoding(&self) -> Vec<u8> {
        self.to_canonical_bytes()
    }

    /// SHA-256 of the full encoding. Changes when signatures are added, so only
    /// hash a transaction in its final signed state.
    pub fn hash(&self) -> Hash {
        hash(&self.encoding())
    }

    /// Sign every input with `identity`.
    ///
    /// All inputs receive a signature over the same transaction-wide signable
    /// encoding.
    pub fn sign(&mut self, identity: &KeyIdentity) -> Result<(), CryptoError> {
        let message = self.signable_encoding();
        for input in &mut self.inputs {
            input.signature = Some(identity.sign(&message)?);
        }
        Ok(())
    }

    /// Create a signed transaction.
    pub fn signed(mut self, identity: &KeyIdentity) -> Result<Self, CryptoError> {
        self.sign(identity)?;
        Ok(self)
    }

    pub fn is_fully_signed(&self) -> bool {
        self.inputs.iter().all(TransactionInput::is_signed)
    }

    /// Check the signature on one input against `public_key`.
    pub fn verify_input(&self, index: usize, public_key: &PublicKey) -> bool {
        match self.inputs.get(index).and_then(|i| i.signature.as_ref()) {
            Some(signature) => public_key.verify(&self.signable_encoding(), signature),
            None => false,
        }
    }

    /// Check that every input is signed by `public_key`.
    pub fn verify_signatures(&self, public_key: &PublicKey) -> bool {
        let message = self.signable_encoding();
        self.inputs.iter().all(|input| {
            input
                .signature
                .as_ref()
                .is_some_and(|sig| public_key.verify(&message, sig))
        })
    }
}

impl Encode for Transaction {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put_seq(&self.inputs).put_seq(&self.outputs);
    }
}

// JSON boundary forms are positional arrays:
//   input       [source_hash, source_index, signature|null]
//   output      [amount, address]
//   transaction [inputs, outputs]

impl Serialize for TransactionInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.source_hash, self.source_index, &self.signature).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TransactionInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (source_hash, source_index, signature) =
            <(Hash, u64, Option<Signature>)>::deserialize(deserializer)?;
        Ok(Self {
            source_hash,
            source_index,
            signature,
        })
    }
}

impl Serialize for TransactionOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.amount, &self.address).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TransactionOutput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (amount, address) = <(u64, PublicKey)>::deserialize(deserializer)?;
        Ok(Self { amount, address })
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.inputs, &self.outputs).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (inputs, outputs) =
            <(Vec<TransactionInput>, Vec<TransactionOutput>)>::deserialize(deserializer)?;
        Ok(Self { inputs, outputs })
    }
}
