mod extract;
mod http;
mod progress;

pub use extract::ShellExtractor;
pub use http::HttpFetcher;
pub use progress::ProgressGuard;

#[cfg(test)]
mod tests;
