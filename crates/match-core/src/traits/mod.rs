//! Repository traits (ports)

mod repositories;

pub use repositories::{
    ConversationRepository, Page, PageRequest, PairRepository, RelationshipFilter, RepoResult,
    UserDirectory,
};
