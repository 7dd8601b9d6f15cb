use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;

/// P_hash (RFC 2246 section 5): expand `secret` over `seed` until
/// `out` is full.
fn p_hash<M>(out: &mut [u8], secret: &[u8], seed: &[u8])
where
    M: Mac + hmac::digest::KeyInit + Clone,
{
    let prototype = <M as hmac::digest::KeyInit>::new_from_slice(secret)
        .expect("hmac accepts any key length");

    // A(1) = HMAC_hash(secret, seed)
    let mut current_a = {
        let mut m = prototype.clone();
        m.update(seed);
        m.finalize().into_bytes()
    };

    let mut offs = 0;
    while offs < out.len() {
        // P_hash[i] = HMAC_hash(secret, A(i) ++ seed)
        let p_term = {
            let mut m = prototype.clone();
            m.update(&current_a);
            m.update(seed);
            m.finalize().into_bytes()
        };

        let take = std::cmp::min(p_term.len(), out.len() - offs);
        out[offs..offs + take].copy_from_slice(&p_term[..take]);
        offs += take;

        // A(i+1) = HMAC_hash(secret, A(i))
        current_a = {
            let mut m = prototype.clone();
            m.update(&current_a);
            m.finalize().into_bytes()
        };
    }
}

/// The TLS 1.0 PRF: the secret is split into two (overlapping, if its
/// length is odd) halves, the first expanded with P_MD5 and the second
/// with P_SHA1 over `label ++ seed`, and the two streams XORed.
pub fn prf(out: &mut [u8], secret: &[u8], label: &[u8], seed: &[u8]) {
    let mut joined_seed = Vec::with_capacity(label.len() + seed.len());
    joined_seed.extend_from_slice(label);
    joined_seed.extend_from_slice(seed);

    let half = (secret.len() + 1) / 2;
    let s1 = &secret[..half];
    let s2 = &secret[secret.len() - half..];

    p_hash::<Hmac<Md5>>(out, s1, &joined_seed);

    let mut sha_stream = vec![0u8; out.len()];
    p_hash::<Hmac<Sha1>>(&mut sha_stream, s2, &joined_seed);

    for (o, s) in out.iter_mut().zip(sha_stream.iter()) {
        *o ^= s;
    }
}
