use anyhow::{bail, Result};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac_array;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::Sha256;

const PBKDF2_ROUNDS: u32 = 10_000;

#[inline(always)]
pub fn base64_encode<T>(input: T) -> String
where
    T: AsRef<[u8]>,
{
    BASE64_STANDARD.encode(input)
}

#[inline(always)]
pub fn base64_decode<T>(input: T) -> Result<Vec<u8>>
where
    T: AsRef<[u8]>,
{
    match BASE64_STANDARD.decode(input) {
        Ok(data) => Ok(data),
        Err(_) => bail!("invalid base64 string"),
    }
}

/// Derives the stored password hash from the plain password and the user's salt.
pub fn hash_password(password: &str, salt: &str) -> String {
    let key = pbkdf2_hmac_array::<Sha256, 32>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS);
    base64_encode(key)
}

pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    let expect = match base64_decode(hash) {
        Ok(expect) => expect,
        Err(_) => return false,
    };
    let key = pbkdf2_hmac_array::<Sha256, 32>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS);

    // Constant time compare
    if expect.len() != key.len() {
        return false;
    }
    expect
        .iter()
        .zip(key.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

pub fn generate_salt(length: usize) -> String {
    let mut rng = thread_rng();

    (0..length)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect()
}
