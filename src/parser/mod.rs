pub mod identity;
pub mod rules;
pub mod tags;

pub use identity::IdentityParser;
pub use rules::ParserConfig;
