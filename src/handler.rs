use std::convert::Infallible;

use crate::error::Result;

pub mod shell;

/// Makes a written profile the active one for the user.
///
/// Success never returns: the current process is replaced.
pub trait ActivateProfile {
    fn activate(&self, profile_name: &str) -> Result<Infallible>;
}

struct Variable<'a> {
    name: &'a str,
    value: Option<&'a str>,
}

fn into_variables(profile_name: &str) -> Vec<Variable<'_>> {
    fn v<'a>(name: &'a str, value: Option<&'a str>) -> Variable<'a> {
        Variable { name, value }
    }

    vec![
        // for AWS SDK, aws-cli; static keys would shadow the profile
        v("AWS_PROFILE", Some(profile_name)),
        v("AWS_ACCESS_KEY_ID", None),
        v("AWS_SECRET_ACCESS_KEY", None),
        v("AWS_SESSION_TOKEN", None),
        // for prompts
        v("ASSUME_ROLE_PROFILE", Some(profile_name)),
    ]
}
