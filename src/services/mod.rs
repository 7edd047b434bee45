//! Services module
//!
//! 検索パイプラインの外側にある協調コンポーネント:
//! 認証情報の解決、リポジトリ一覧の取得、shallow clone。
//! いずれもトレイトの背後にあり、テストではモックに差し替えられる。

pub mod clone_engine;
pub mod credentials;
pub mod github;

// Re-exports for convenience
pub use clone_engine::{Cloner, GitCloner};
pub use credentials::{Credential, CredentialResolver, HubConfigResolver};
pub use github::{GitHubLister, RepositoryLister};
