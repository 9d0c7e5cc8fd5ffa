//! Reversible share codes for session seeds.
//! Code format: TP-<WORD><NN>, e.g. TP-TORQUE42, TP-SLED07

const CODE_PREFIX: &str = "TP";

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

// Word list for share codes
pub const WORD_LIST: [&str; 64] = [
    "TORQUE", "SLED", "HITCH", "DIESEL", "TURBO", "PISTON", "GEAR", "CLUTCH", "AXLE", "TREAD",
    "GROOVE", "CHASSIS", "FRAME", "HOOD", "GRILLE", "EXHAUST", "INTAKE", "BOOST", "NITRO",
    "HEADER", "CAM", "CRANK", "VALVE", "MUFFLER", "SPRING", "SHOCK", "WINCH", "TRACK", "CLAY",
    "DIRT", "MUD", "DUST", "SMOKE", "ROAR", "THUNDER", "HAULER", "TRACTOR", "RIG", "PULLER",
    "BEAST", "OUTLAW", "REAPER", "DEMON", "MAVERICK", "TYRANT", "BULLDOG", "MUSTANG", "BRONCO",
    "GRIZZLY", "BISON", "RAM", "HAMMER", "ANVIL", "IRON", "STEEL", "CHROME", "BOLT", "RIVET",
    "FLAG", "PODIUM", "TROPHY", "PURSE", "CHAMP", "FULLPUL",
];

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & 0x01FF | ((u16::from(nn) & 0x7F) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    (packed & 0x01FF, ((packed >> 9) & 0x7F) as u8)
}

fn compose_seed(word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    // Domain-separated FNV input
    let mut buf = [0u8; 9];
    buf[..6].copy_from_slice(b"TRKPL-");
    buf[6] = (packed & 0xFF) as u8;
    buf[7] = (packed >> 8) as u8;
    buf[8] = 0x5A;
    let h = fnv1a64(&buf);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render the share code for a seed.
///
/// Only the low 16 bits of `seed` are encoded, so arbitrary seeds map onto
/// one of 6400 codes. Seeds produced by [`decode_to_seed`] or
/// [`generate_code_from_entropy`] round-trip exactly.
#[must_use]
pub fn encode_friendly(seed: u64) -> String {
    let packed = (seed & 0xFFFF) as u16;
    let (wi, mut nn) = unpack(packed);
    let word = WORD_LIST
        .get(usize::from(wi) % WORD_LIST.len())
        .copied()
        .unwrap_or(WORD_LIST[0]);
    if nn > 99 {
        nn %= 100;
    }
    format!("{CODE_PREFIX}-{word}{nn:02}")
}

/// Parse a share code back into its session seed. Case-insensitive.
#[must_use]
pub fn decode_to_seed(code: &str) -> Option<u64> {
    let s = code.trim();
    let (prefix, rest) = s.split_once('-')?;
    if !prefix.eq_ignore_ascii_case(CODE_PREFIX) {
        return None;
    }
    if rest.len() < 3 || !rest.is_char_boundary(rest.len() - 2) {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| sanitize_word(w) == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some(compose_seed(wi, nn))
}

/// Fresh share code from arbitrary entropy (e.g. wall-clock nanos).
#[must_use]
pub fn generate_code_from_entropy(entropy: u64) -> String {
    let wi = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = ((entropy >> 17) % 100) as u8;
    encode_friendly(compose_seed(wi, nn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrips_code() {
        let seed = 0xDEAD_BEEF_CAFE_BABE;
        let code = encode_friendly(seed);
        let new_seed = decode_to_seed(&code).unwrap();
        assert_eq!(encode_friendly(new_seed), code);
    }

    #[test]
    fn tp_torque_42_stable() {
        let seed = decode_to_seed("TP-TORQUE42").unwrap();
        assert_eq!(encode_friendly(seed), "TP-TORQUE42");
        assert_eq!(decode_to_seed("tp-torque42"), Some(seed));
    }

    #[test]
    fn rejects_foreign_or_malformed_codes() {
        assert_eq!(decode_to_seed("CL-TORQUE42"), None);
        assert_eq!(decode_to_seed("TP-NOTAWORD42"), None);
        assert_eq!(decode_to_seed("TP-TORQUE4x"), None);
        assert_eq!(decode_to_seed("TP-7"), None);
        assert_eq!(decode_to_seed("torque"), None);
    }

    #[test]
    fn generated_codes_decode() {
        for entropy in [0_u64, 1, 99, 0x1234_5678, u64::MAX] {
            let code = generate_code_from_entropy(entropy);
            let seed = decode_to_seed(&code).unwrap();
            assert_eq!(encode_friendly(seed), code);
        }
    }
}
