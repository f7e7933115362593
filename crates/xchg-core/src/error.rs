use xchg_types::Recommendation;

/// Why no recommendation could be produced this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("ratio not ready")]
    RatioNotReady,

    #[error("input not ready")]
    InputNotReady,
}

impl Unavailable {
    pub fn into_recommendation(self) -> Recommendation {
        match self {
            Unavailable::RatioNotReady => Recommendation::RatioNotReady,
            Unavailable::InputNotReady => Recommendation::InputNotReady,
        }
    }
}
