mod fetcher;

pub use fetcher::ResultFetcher;
