// Content extraction: formatted script markup → ordered content blocks.

pub mod blocks;
pub mod extractor;

pub use blocks::ContentBlock;
pub use extractor::ContentExtractor;
