pub mod canonicalizer;
pub mod filter;
pub mod record;
