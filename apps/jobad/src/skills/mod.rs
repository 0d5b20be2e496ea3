// Skill vocabulary: normalization against the synonym map, and the
// human-reviewed curation loop that grows it.

pub mod blacklist;
pub mod collector;
pub mod curation;
pub mod mapper;
pub mod merge;
pub mod prompts;
pub mod proposal;
pub mod remap;
pub mod synonyms;
