use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DeckError;

/// Host intent for leaving the presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeckDirective {
    #[default]
    None,
    ExitOnNext,
    ExitOnPrevious,
    ExitOnNextOrPrevious,
    Exit,
}

impl DeckDirective {
    /// Whether a step of `delta` should leave the deck instead of navigating.
    pub fn exits_on(&self, delta: isize) -> bool {
        match self {
            Self::None => false,
            Self::Exit => true,
            Self::ExitOnNext => delta > 0,
            Self::ExitOnPrevious => delta < 0,
            Self::ExitOnNextOrPrevious => delta != 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ExitOnNext => "exit-on-next",
            Self::ExitOnPrevious => "exit-on-previous",
            Self::ExitOnNextOrPrevious => "exit-on-next-or-previous",
            Self::Exit => "exit",
        }
    }
}

impl FromStr for DeckDirective {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(Self::None),
            "exit-on-next" => Ok(Self::ExitOnNext),
            "exit-on-previous" => Ok(Self::ExitOnPrevious),
            "exit-on-next-or-previous" => Ok(Self::ExitOnNextOrPrevious),
            "exit" => Ok(Self::Exit),
            other => Err(DeckError::UnknownDeckAction(other.to_string())),
        }
    }
}

impl std::fmt::Display for DeckDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Edge detector for [`DeckDirective::Exit`].
///
/// Fires once per transition into `Exit`; supplying `Exit` again without
/// leaving it first is ignored.
#[derive(Debug, Default)]
pub struct ExitRelay {
    last: DeckDirective,
}

impl ExitRelay {
    pub fn new(initial: DeckDirective) -> Self {
        Self { last: initial }
    }

    /// Record a directive value. Returns true when exit should be requested.
    pub fn observe(&mut self, directive: DeckDirective) -> bool {
        let previous = std::mem::replace(&mut self.last, directive);
        directive == DeckDirective::Exit && previous != DeckDirective::Exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_matrix() {
        use DeckDirective::*;
        let cases = [
            (None, false, false),
            (ExitOnNext, true, false),
            (ExitOnPrevious, false, true),
            (ExitOnNextOrPrevious, true, true),
            (Exit, true, true),
        ];
        for (directive, on_next, on_previous) in cases {
            assert_eq!(directive.exits_on(1), on_next, "{directive} on +1");
            assert_eq!(directive.exits_on(-1), on_previous, "{directive} on -1");
            assert_eq!(directive.exits_on(5), on_next, "{directive} on +5");
            assert_eq!(directive.exits_on(-5), on_previous, "{directive} on -5");
        }
    }

    #[test]
    fn test_relay_is_edge_triggered() {
        let mut relay = ExitRelay::default();
        assert!(!relay.observe(DeckDirective::None));
        assert!(relay.observe(DeckDirective::Exit));
        assert!(!relay.observe(DeckDirective::Exit));
        assert!(!relay.observe(DeckDirective::Exit));
        assert!(!relay.observe(DeckDirective::ExitOnNext));
        assert!(relay.observe(DeckDirective::Exit));
    }

    #[test]
    fn test_relay_initial_exit_does_not_fire() {
        let mut relay = ExitRelay::new(DeckDirective::Exit);
        assert!(!relay.observe(DeckDirective::Exit));
    }

    #[test]
    fn test_parse_round_trips_names() {
        for directive in [
            DeckDirective::None,
            DeckDirective::ExitOnNext,
            DeckDirective::ExitOnPrevious,
            DeckDirective::ExitOnNextOrPrevious,
            DeckDirective::Exit,
        ] {
            assert_eq!(directive.name().parse::<DeckDirective>(), Ok(directive));
        }
        assert!("quit".parse::<DeckDirective>().is_err());
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let directive: DeckDirective = serde_yaml::from_str("exit-on-next-or-previous").unwrap();
        assert_eq!(directive, DeckDirective::ExitOnNextOrPrevious);
    }
}
