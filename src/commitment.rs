// src/commitment.rs
//! Commitment/reveal arithmetic. A commitment is a hash published by an
//! earlier operation; a later operation is authorized by disclosing a reveal
//! value whose hash equals that commitment.

use crate::error::Result;
use crate::hashing;

/// Calculate the commitment a reveal value satisfies: the multihash of the
/// reveal value itself, computed with the algorithm embedded in it.
pub fn get_commitment_from_reveal_value(reveal_value: &str) -> Result<String> {
    let code = hashing::get_multihash_code(reveal_value)?;

    hashing::calculate_model_multihash(&reveal_value, code)
}
