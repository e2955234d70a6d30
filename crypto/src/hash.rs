//! Blake2b hashing for proposal content.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use quorum_types::{Address, ProposalId, TokenAmount};

type Blake2b256 = Blake2b<U32>;

/// Domain tag mixed into every proposal id.
const PROPOSAL_DOMAIN: &[u8] = b"quorum/proposal/v1";

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    finish(hasher)
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    finish(hasher)
}

/// Hash of a proposal's free-text description.
pub fn hash_description(description: &str) -> [u8; 32] {
    blake2b_256(description.as_bytes())
}

/// Derive the id of a proposal from its parallel call sequences and description hash.
///
/// Every variable-length field is length-prefixed so that no two distinct
/// batches share an encoding. Callers are expected to pass sequences of equal
/// length; the lengths are hashed individually regardless.
pub fn hash_proposal<C: AsRef<[u8]>>(
    targets: &[Address],
    values: &[TokenAmount],
    calldatas: &[C],
    description_hash: &[u8; 32],
) -> ProposalId {
    let mut hasher = Blake2b256::new();
    hasher.update(PROPOSAL_DOMAIN);

    hasher.update((targets.len() as u64).to_be_bytes());
    for target in targets {
        hasher.update(target.as_bytes());
    }

    hasher.update((values.len() as u64).to_be_bytes());
    for value in values {
        hasher.update(value.raw().to_be_bytes());
    }

    hasher.update((calldatas.len() as u64).to_be_bytes());
    for data in calldatas {
        let data = data.as_ref();
        hasher.update((data.len() as u64).to_be_bytes());
        hasher.update(data);
    }

    hasher.update(description_hash);
    ProposalId::new(finish(hasher))
}

fn finish(hasher: Blake2b256) -> [u8; 32] {
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> (Vec<Address>, Vec<TokenAmount>, Vec<Vec<u8>>) {
        (
            vec![Address::from_low_u64(1), Address::from_low_u64(2)],
            vec![TokenAmount::new(0), TokenAmount::new(5)],
            vec![b"set(1)".to_vec(), Vec::new()],
        )
    }

    #[test]
    fn blake2b_deterministic() {
        assert_eq!(blake2b_256(b"hello quorum"), blake2b_256(b"hello quorum"));
        assert_ne!(blake2b_256(b"hello"), blake2b_256(b"world"));
    }

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn proposal_id_is_content_derived() {
        let (t, v, c) = batch();
        let d = hash_description("raise the cap");
        assert_eq!(hash_proposal(&t, &v, &c, &d), hash_proposal(&t, &v, &c, &d));
    }

    #[test]
    fn proposal_id_depends_on_description() {
        let (t, v, c) = batch();
        let a = hash_proposal(&t, &v, &c, &hash_description("a"));
        let b = hash_proposal(&t, &v, &c, &hash_description("b"));
        assert_ne!(a, b);
    }

    #[test]
    fn proposal_id_depends_on_every_call_field() {
        let (t, v, c) = batch();
        let d = hash_description("x");
        let base = hash_proposal(&t, &v, &c, &d);

        let mut t2 = t.clone();
        t2[1] = Address::from_low_u64(3);
        assert_ne!(base, hash_proposal(&t2, &v, &c, &d));

        let mut v2 = v.clone();
        v2[0] = TokenAmount::new(1);
        assert_ne!(base, hash_proposal(&t, &v2, &c, &d));

        let mut c2 = c.clone();
        c2[1] = b"x".to_vec();
        assert_ne!(base, hash_proposal(&t, &v, &c2, &d));
    }

    #[test]
    fn calldata_boundaries_are_unambiguous() {
        let t = vec![Address::from_low_u64(1), Address::from_low_u64(1)];
        let v = vec![TokenAmount::ZERO, TokenAmount::ZERO];
        let d = hash_description("");
        let split_a = vec![b"ab".to_vec(), b"c".to_vec()];
        let split_b = vec![b"a".to_vec(), b"bc".to_vec()];
        assert_ne!(
            hash_proposal(&t, &v, &split_a, &d),
            hash_proposal(&t, &v, &split_b, &d)
        );
    }
}
