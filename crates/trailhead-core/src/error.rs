pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("curriculum has no concepts")]
    EmptyCurriculum,

    #[error("duplicate concept id: {id}")]
    DuplicateId { id: u32 },

    #[error("concept {concept} lists an unknown prerequisite id: {prereq}")]
    UnknownPrereq { concept: u32, prereq: u32 },

    #[error("concept {concept} lists itself as a prerequisite")]
    SelfPrereq { concept: u32 },

    #[error("prerequisite cycle involving concept id {id}")]
    PrereqCycle { id: u32 },

    #[error("initiallyKnown lists an unknown concept id: {id}")]
    UnknownInitiallyKnown { id: u32 },

    #[error("invalid curriculum JSON: {0}")]
    Json(#[from] serde_json::Error),
}
