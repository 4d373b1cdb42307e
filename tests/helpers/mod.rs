//! Shared harness for integration tests: a temporary data directory with a
//! fresh database, content repository and search index.

use sea_orm::Set;
use tempfile::TempDir;
use unicore_cms::commands::CommandContext;
use unicore_cms::config::AppConfig;
use unicore_cms::infrastructure::database::entities::post;

pub struct TestEnv {
    // Held so the directory outlives the context
    pub _tmp: TempDir,
    pub ctx: CommandContext,
}

pub async fn setup() -> TestEnv {
    let tmp = TempDir::new().expect("create temp dir");
    let config = AppConfig::default_with_dir(tmp.path().to_path_buf());
    let ctx = CommandContext::init(config).await.expect("init context");
    TestEnv { _tmp: tmp, ctx }
}

/// A minimal post draft; tests set further fields as needed
pub fn post_draft(title: &str) -> post::ActiveModel {
    post::ActiveModel {
        title: Set(title.to_string()),
        ..Default::default()
    }
}
