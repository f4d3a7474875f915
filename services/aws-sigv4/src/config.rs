use crate::constants::*;
use crate::Credentials;
use awsauth_core::utils::Redact;
use awsauth_core::{Context, Result};
use std::fmt::{Debug, Formatter};

/// Config for signing aws requests.
#[derive(Clone, Default)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    /// - env value: [`AWS_DEFAULT_REGION`]
    pub region: Option<String>,
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SECRET_ACCESS_KEY`]
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SESSION_TOKEN`]
    pub session_token: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Fields that are already set are kept. Empty env values are treated as
    /// unset.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();
        let get = |key: &str| envs.get(key).filter(|v| !v.is_empty()).cloned();

        if self.region.is_none() {
            self.region = get(AWS_REGION).or_else(|| get(AWS_DEFAULT_REGION));
        }
        if self.access_key_id.is_none() {
            self.access_key_id = get(AWS_ACCESS_KEY_ID);
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = get(AWS_SECRET_ACCESS_KEY);
        }
        if self.session_token.is_none() {
            self.session_token = get(AWS_SESSION_TOKEN);
        }
        self
    }

    /// Build static credentials out of this config.
    ///
    /// Returns `Ok(None)` if access key id or secret access key is missing
    /// or empty, the same way [`crate::EnvCredentialProvider`] does.
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        let non_empty = |v: &Option<String>| v.clone().filter(|v| !v.is_empty());
        let (Some(ak), Some(sk)) = (
            non_empty(&self.access_key_id),
            non_empty(&self.secret_access_key),
        ) else {
            return Ok(None);
        };

        Credentials::new(&ak, &sk, self.session_token.as_deref(), None).map(Some)
    }
}
