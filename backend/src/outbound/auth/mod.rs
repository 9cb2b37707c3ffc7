//! Bearer credential adapters.

mod jwt;

pub use jwt::{Claims, JwtAccessTokens, TokenIssueError};
