//! Transcript retention policy.
//!
//! A transcript keeps its leading system turn forever and at most
//! `window_size` turns after it. No I/O happens here.

use chatline_types::transcript::{MessageRole, Transcript, Turn};

/// A one-turn transcript holding only the system persona.
pub fn fresh(persona: &str) -> Transcript {
    Transcript::new(vec![Turn::system(persona)])
}

/// Keep turn 0 and the last `window_size` turns after it.
///
/// Turn 0 is kept whatever its role; transcripts built through the store
/// always open with the system turn.
pub fn truncate(transcript: Transcript, window_size: usize) -> Transcript {
    if transcript.len() <= window_size + 1 {
        return transcript;
    }

    let mut turns = transcript.into_turns();
    let excess = turns.len() - 1 - window_size;
    turns.drain(1..1 + excess);
    Transcript::new(turns)
}

/// Append `turn` to `transcript` (creating the system turn if the transcript
/// is empty), then apply the window.
pub fn append(mut transcript: Transcript, turn: Turn, window_size: usize, persona: &str) -> Transcript {
    if transcript.is_empty() {
        transcript = fresh(persona);
    }
    transcript.push(turn);
    truncate(transcript, window_size)
}

/// Whether a transcript satisfies the window invariant.
pub fn is_within_window(transcript: &Transcript, window_size: usize) -> bool {
    transcript.len() <= window_size + 1
        && transcript
            .turns()
            .first()
            .is_some_and(|t| t.role == MessageRole::System)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSONA: &str = "persona";

    #[test]
    fn test_fresh_is_single_system_turn() {
        let t = fresh(PERSONA);
        assert_eq!(t.turns(), &[Turn::system(PERSONA)]);
    }

    #[test]
    fn test_truncate_noop_within_window() {
        let t = Transcript::new(vec![Turn::system(PERSONA), Turn::user("a"), Turn::assistant("b")]);
        assert_eq!(truncate(t.clone(), 5), t);
    }

    #[test]
    fn test_truncate_drops_oldest_non_system() {
        let mut turns = vec![Turn::system(PERSONA)];
        for i in 0..8 {
            turns.push(Turn::user(format!("m{i}")));
        }
        let t = truncate(Transcript::new(turns), 3);
        let contents: Vec<&str> = t.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec![PERSONA, "m5", "m6", "m7"]);
    }

    #[test]
    fn test_truncate_window_zero_keeps_only_system() {
        let t = Transcript::new(vec![Turn::system(PERSONA), Turn::user("a")]);
        assert_eq!(truncate(t, 0).turns(), &[Turn::system(PERSONA)]);
    }

    #[test]
    fn test_append_creates_system_turn() {
        let t = append(Transcript::default(), Turn::user("hola"), 5, PERSONA);
        assert_eq!(t.turns(), &[Turn::system(PERSONA), Turn::user("hola")]);
    }

    #[test]
    fn test_window_invariant_holds_after_every_append() {
        for window in 0..6 {
            let mut t = fresh(PERSONA);
            for i in 0..20 {
                let turn = if i % 2 == 0 {
                    Turn::user(format!("u{i}"))
                } else {
                    Turn::assistant(format!("a{i}"))
                };
                t = append(t, turn, window, PERSONA);
                assert!(is_within_window(&t, window), "window {window}, step {i}");
                assert_eq!(t.turns()[0], Turn::system(PERSONA));
            }
        }
    }

    #[test]
    fn test_seven_pairs_with_window_five() {
        let mut t = fresh(PERSONA);
        for i in 1..=7 {
            t = append(t, Turn::user(format!("u{i}")), 5, PERSONA);
            t = append(t, Turn::assistant(format!("a{i}")), 5, PERSONA);
        }
        let contents: Vec<&str> = t.iter().map(|t| t.content.as_str()).collect();
        // 14 non-system turns appended; the oldest 9 fall out of the window.
        assert_eq!(contents, vec![PERSONA, "a5", "u6", "a6", "u7", "a7"]);
    }
}
