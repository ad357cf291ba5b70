// This code is part of Qiskit.
//
// (C) Copyright IBM 2022
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

//! Mixed-radix (factorial-base) indexing for permutations of `0..n`.
//!
//! The exact DP allocator needs to address all `n!` permutations as DP
//! states. Serializing each permutation to a string key, as the reference
//! implementation does, turns every state lookup into a string hash and
//! keeps a process-wide map alive across calls; a factorial-base rank is
//! a plain `u64` computed from the permutation itself, usable as a dense
//! array index.

pub fn factorial(n: usize) -> u64 {
    (1..=n as u64).product()
}

/// Computes the Lehmer-code rank of `perm`, a permutation of `0..perm.len()`.
pub fn rank(perm: &[u32]) -> u64 {
    let n = perm.len();
    let mut rank = 0u64;
    for i in 0..n {
        let smaller_after = perm[i + 1..].iter().filter(|&&x| x < perm[i]).count() as u64;
        rank += smaller_after * factorial(n - i - 1);
    }
    rank
}

/// Inverse of [`rank`]: recovers the permutation of `0..n` with the given
/// factorial-base rank.
pub fn unrank(mut rank: u64, n: usize) -> Vec<u32> {
    let mut available: Vec<u32> = (0..n as u32).collect();
    let mut perm = Vec::with_capacity(n);
    for i in 0..n {
        let f = factorial(n - i - 1);
        let idx = (rank / f) as usize;
        rank %= f;
        perm.push(available.remove(idx));
    }
    perm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_unrank_round_trip_all_of_n4() {
        let n = 4;
        for r in 0..factorial(n) {
            let perm = unrank(r, n as usize);
            assert_eq!(rank(&perm), r);
        }
    }

    #[test]
    fn identity_has_rank_zero() {
        assert_eq!(rank(&[0, 1, 2, 3]), 0);
    }

    #[test]
    fn last_permutation_has_max_rank() {
        let n = 4;
        assert_eq!(rank(&[3, 2, 1, 0]), factorial(n) - 1);
    }
}
