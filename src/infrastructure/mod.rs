pub mod leetcode_http;

pub use leetcode_http::LeetCodeHttp;
