/// Which half of the page is live for this view. Decided once on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMode {
    /// No results rendered: collect preferences through the step cards.
    Wizard,
    /// Results rendered: page through the movie cards.
    Movies,
}

impl FlowMode {
    pub fn detect(result_cards: usize) -> Self {
        if result_cards > 0 {
            FlowMode::Movies
        } else {
            FlowMode::Wizard
        }
    }

    /// Inline `display` values for the (input flow, movie flow) containers.
    /// The wizard is the markup default, so it needs no override.
    pub fn display_overrides(self) -> Option<(&'static str, &'static str)> {
        match self {
            FlowMode::Wizard => None,
            FlowMode::Movies => Some(("none", "block")),
        }
    }
}
