//! Base64 transport encoding for Solana transactions

use crate::error::CodecError;
use base64::Engine;
use solana_sdk::{
    hash::Hash, instruction::Instruction, message::Message, pubkey::Pubkey,
    transaction::Transaction,
};

/// Build an unsigned legacy transaction with `fee_payer` and `blockhash` set
pub fn unsigned_transaction(
    instructions: &[Instruction],
    fee_payer: &Pubkey,
    blockhash: Hash,
) -> Transaction {
    let message = Message::new_with_blockhash(instructions, Some(fee_payer), &blockhash);
    Transaction::new_unsigned(message)
}

pub fn encode_transaction(transaction: &Transaction) -> Result<String, CodecError> {
    let bytes = bincode::serialize(transaction)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

pub fn decode_transaction(encoded: &str) -> Result<Transaction, CodecError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
    Ok(bincode::deserialize(&bytes)?)
}
