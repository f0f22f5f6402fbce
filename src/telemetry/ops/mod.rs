pub mod scrape;
pub mod normalize;
