//! Number-theory primitives over arbitrary-precision integers.
//!
//! Every function is pure apart from the randomness it draws from the
//! caller-supplied RNG.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

use crate::error::CryptoError;

/// Miller-Rabin rounds used by [`random_prime`]. A composite survives with
/// probability at most `4^-40`.
pub const MILLER_RABIN_ROUNDS: usize = 40;

/// Candidates [`random_prime`] tries before reporting
/// [`CryptoError::RandomnessExhausted`]. Roughly one 1024-bit odd candidate
/// in 355 is prime, so honest randomness never gets near this.
pub const MAX_PRIME_CANDIDATES: usize = 100_000;

/// Small primes used to reject most candidates before Miller-Rabin.
const SMALL_PRIMES: [u32; 24] =
    [3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97];

/// Computes `base^exponent mod modulus` by repeated squaring.
///
/// Every intermediate product is reduced, so operands never exceed
/// `modulus^2`. Takes `O(log exponent)` multiplications.
pub fn mod_exp(
    base: &BigUint,
    exponent: &BigUint,
    modulus: &BigUint,
) -> Result<BigUint, CryptoError> {
    if modulus.is_zero() {
        return Err(CryptoError::ZeroModulus);
    }
    if modulus.is_one() {
        return Ok(BigUint::zero());
    }

    let mut result = BigUint::one();
    let mut square = base % modulus;
    let bits = exponent.bits();

    for i in 0..bits {
        if exponent.bit(i) {
            result = (&result * &square) % modulus;
        }
        if i + 1 < bits {
            square = (&square * &square) % modulus;
        }
    }

    Ok(result)
}

/// Finds `x` such that `a * x ≡ 1 (mod m)` with the extended Euclidean
/// algorithm.
///
/// Fails with [`CryptoError::NoInverse`] when `gcd(a, m) != 1`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint, CryptoError> {
    if m.is_zero() {
        return Err(CryptoError::ZeroModulus);
    }

    let a = a % m;
    if a.is_zero() || m.is_one() {
        return Err(CryptoError::NoInverse);
    }

    let modulus = BigInt::from(m.clone());
    let (mut old_r, mut r) = (BigInt::from(a), modulus.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    while !r.is_zero() {
        let quotient = &old_r / &r;

        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return Err(CryptoError::NoInverse);
    }

    old_s.mod_floor(&modulus).to_biguint().ok_or(CryptoError::NoInverse)
}

/// Uniformly random integer built from `byte_length` random bytes.
pub fn random_bigint<R: Rng + ?Sized>(rng: &mut R, byte_length: usize) -> BigUint {
    let mut buffer = vec![0u8; byte_length];
    rng.fill_bytes(&mut buffer);
    BigUint::from_bytes_be(&buffer)
}

/// Miller-Rabin probabilistic primality test.
///
/// Decomposes `n - 1 = 2^s * d` and tries `rounds` independent random
/// witnesses in `[2, n - 2]`. Returns `false` as soon as one witness proves
/// `n` composite. A composite passes with probability at most `4^-rounds`.
pub fn is_probably_prime<R: Rng + ?Sized>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    if n == &two {
        return true;
    }
    if n.is_even() {
        return false;
    }

    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - 1u32;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);

        let Ok(mut x) = mod_exp(&a, &d, n) else {
            return false;
        };
        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Samples random `byte_length`-byte integers until one passes
/// [`is_probably_prime`].
///
/// Candidates have their top bit set, so the result is exactly
/// `8 * byte_length` bits long, and their low bit set, so even numbers are
/// never tested. Gives up with [`CryptoError::RandomnessExhausted`] after
/// [`MAX_PRIME_CANDIDATES`] candidates.
pub fn random_prime<R: Rng + ?Sized>(
    rng: &mut R,
    byte_length: usize,
) -> Result<BigUint, CryptoError> {
    if byte_length == 0 {
        return Err(CryptoError::InvalidLength { reason: "prime must be at least 1 byte".into() });
    }

    let top_bit = (byte_length as u64) * 8 - 1;

    for _ in 0..MAX_PRIME_CANDIDATES {
        let mut candidate = random_bigint(rng, byte_length);
        candidate.set_bit(top_bit, true);
        candidate.set_bit(0, true);

        if is_probably_prime(&candidate, MILLER_RABIN_ROUNDS, rng) {
            return Ok(candidate);
        }
    }

    Err(CryptoError::RandomnessExhausted { draws: MAX_PRIME_CANDIDATES })
}
