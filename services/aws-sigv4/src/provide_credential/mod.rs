mod r#static;
pub use r#static::StaticCredentialProvider;

mod env;
pub use env::EnvCredentialProvider;
