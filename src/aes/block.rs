// AES-128 single-block cipher
// State is column-major: byte (row r, column c) lives at index 4*c + r

use super::key_schedule::RoundKeySchedule;
use super::sbox::{xtime, INV_SBOX, SBOX};
use super::{Block, ROUNDS};

fn add_round_key(state: &mut Block, round_key: &Block) {
    for (s, k) in state.iter_mut().zip(round_key.iter()) {
        *s ^= k;
    }
}

fn sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = SBOX[*byte as usize];
    }
}

fn inv_sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = INV_SBOX[*byte as usize];
    }
}

/// Row r rotates left by r positions
fn shift_rows(state: &mut Block) {
    let temp = *state;
    for c in 0..4 {
        for r in 1..4 {
            state[4 * c + r] = temp[4 * ((c + r) % 4) + r];
        }
    }
}

/// Row r rotates right by r positions
fn inv_shift_rows(state: &mut Block) {
    let temp = *state;
    for c in 0..4 {
        for r in 1..4 {
            state[4 * ((c + r) % 4) + r] = temp[4 * c + r];
        }
    }
}

/// Multiply each column by {03}x^3 + {01}x^2 + {01}x + {02}
fn mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(4) {
        let [s0, s1, s2, s3] = [column[0], column[1], column[2], column[3]];
        let all = s0 ^ s1 ^ s2 ^ s3;
        column[0] = s0 ^ all ^ xtime(s0 ^ s1);
        column[1] = s1 ^ all ^ xtime(s1 ^ s2);
        column[2] = s2 ^ all ^ xtime(s2 ^ s3);
        column[3] = s3 ^ all ^ xtime(s3 ^ s0);
    }
}

#[inline(always)]
fn mul9(b: u8) -> u8 {
    xtime(xtime(xtime(b))) ^ b
}

#[inline(always)]
fn mul11(b: u8) -> u8 {
    xtime(xtime(xtime(b))) ^ xtime(b) ^ b
}

#[inline(always)]
fn mul13(b: u8) -> u8 {
    xtime(xtime(xtime(b))) ^ xtime(xtime(b)) ^ b
}

#[inline(always)]
fn mul14(b: u8) -> u8 {
    xtime(xtime(xtime(b))) ^ xtime(xtime(b)) ^ xtime(b)
}

fn inv_mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(4) {
        let [s0, s1, s2, s3] = [column[0], column[1], column[2], column[3]];
        column[0] = mul14(s0) ^ mul11(s1) ^ mul13(s2) ^ mul9(s3);
        column[1] = mul9(s0) ^ mul14(s1) ^ mul11(s2) ^ mul13(s3);
        column[2] = mul13(s0) ^ mul9(s1) ^ mul14(s2) ^ mul11(s3);
        column[3] = mul11(s0) ^ mul13(s1) ^ mul9(s2) ^ mul14(s3);
    }
}

/// Encrypt one 16-byte block
pub fn encrypt_block(plaintext: &Block, schedule: &RoundKeySchedule) -> Block {
    let mut state = *plaintext;

    add_round_key(&mut state, schedule.round_key(0));

    for round in 1..ROUNDS {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, schedule.round_key(round));
    }

    // Final round has no MixColumns
    sub_bytes(&mut state);
    shift_rows(&mut state);
    add_round_key(&mut state, schedule.round_key(ROUNDS));

    state
}

/// Decrypt one 16-byte block, consuming round keys in reverse
pub fn decrypt_block(ciphertext: &Block, schedule: &RoundKeySchedule) -> Block {
    let mut state = *ciphertext;

    add_round_key(&mut state, schedule.round_key(ROUNDS));
    inv_shift_rows(&mut state);
    inv_sub_bytes(&mut state);

    for round in (1..ROUNDS).rev() {
        add_round_key(&mut state, schedule.round_key(round));
        inv_mix_columns(&mut state);
        inv_shift_rows(&mut state);
        inv_sub_bytes(&mut state);
    }

    add_round_key(&mut state, schedule.round_key(0));

    state
}
