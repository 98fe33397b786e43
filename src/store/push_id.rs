//! Chronologically ordered keys in the format used by the hosted database.
//!
//! A key is 20 characters: 8 encode the millisecond timestamp, 12 are
//! random. Keys generated within the same millisecond reuse the previous
//! random part incremented by one so that lexicographic order matches
//! generation order.

use std::sync::Mutex;

use rand::Rng;

/// Alphabet in ASCII order so that string comparison follows numeric order.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

#[derive(Default)]
struct State {
    /// `None` until the first key; the random part is only seeded then.
    last_time: Option<i64>,
    last_random: [u8; RANDOM_CHARS],
}

/// Generator of push keys. One instance per store keeps keys monotonic.
#[derive(Default)]
pub struct PushIdGenerator {
    state: Mutex<State>,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a key for the given wall-clock time in milliseconds.
    pub fn generate(&self, now_millis: i64) -> String {
        // The state is plain data, still usable after a poisoning panic.
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Never go backwards, even if the clock does.
        let now = state
            .last_time
            .map_or(now_millis, |last| now_millis.max(last));
        if state.last_time == Some(now) {
            increment(&mut state.last_random);
        } else {
            let mut rng = rand::thread_rng();
            for slot in state.last_random.iter_mut() {
                *slot = rng.gen_range(0..64);
            }
            state.last_time = Some(now);
        }

        let mut id = String::with_capacity(TIME_CHARS + RANDOM_CHARS);
        let mut time_chars = [0u8; TIME_CHARS];
        let mut remaining = now.max(0);
        for slot in time_chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(remaining % 64) as usize];
            remaining /= 64;
        }
        id.extend(time_chars.iter().map(|&c| c as char));
        id.extend(
            state
                .last_random
                .iter()
                .map(|&digit| PUSH_CHARS[digit as usize] as char),
        );
        id
    }
}

/// Add one to a base-64 digit array, carrying from the right.
fn increment(digits: &mut [u8; RANDOM_CHARS]) {
    for digit in digits.iter_mut().rev() {
        if *digit == 63 {
            *digit = 0;
        } else {
            *digit += 1;
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_have_fixed_length_and_alphabet() {
        let id = PushIdGenerator::new().generate(1_700_000_000_000);
        assert_eq!(id.len(), 20);
        assert!(id.bytes().all(|b| PUSH_CHARS.contains(&b)));
    }

    #[test]
    fn same_millisecond_ids_are_strictly_increasing() {
        let generator = PushIdGenerator::new();
        let ids: Vec<String> = (0..500).map(|_| generator.generate(42)).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn later_timestamps_sort_after_earlier_ones() {
        let generator = PushIdGenerator::new();
        let first = generator.generate(1_000);
        let second = generator.generate(1_001);
        assert!(first < second);
        assert_eq!(&first[..TIME_CHARS], "------Ec");
    }

    #[test]
    fn clock_going_backwards_keeps_order() {
        let generator = PushIdGenerator::new();
        let first = generator.generate(5_000);
        let second = generator.generate(4_000);
        assert!(first < second);
    }

    #[test]
    fn first_key_at_epoch_gets_a_random_suffix() {
        let first = PushIdGenerator::new().generate(0);
        let second = PushIdGenerator::new().generate(0);
        assert_eq!(&first[..TIME_CHARS], "--------");
        assert_ne!(&first[TIME_CHARS..], "-----------0");
        assert_ne!(first, second);
    }

    #[test]
    fn increment_carries() {
        let mut digits = [0u8; RANDOM_CHARS];
        digits[RANDOM_CHARS - 1] = 63;
        increment(&mut digits);
        assert_eq!(digits[RANDOM_CHARS - 1], 0);
        assert_eq!(digits[RANDOM_CHARS - 2], 1);
    }
}
