use std::io::{self, BufRead, Write};

use async_trait::async_trait;

use crate::error::{Error, Result};

#[async_trait]
pub trait ReadMfaToken {
    async fn read_mfa_token(&self, mfa_serial: &str) -> Result<String>;
}

/// Prompts on stderr and reads one line from stdin.
pub struct StdinMfaTokenReader;

#[async_trait]
impl ReadMfaToken for StdinMfaTokenReader {
    async fn read_mfa_token(&self, mfa_serial: &str) -> Result<String> {
        let prompt = |serial: &str| -> io::Result<String> {
            let mut stderr = io::stderr();
            write!(stderr, "MFA code for {}: ", serial)?;
            stderr.flush()?;

            let mut code = String::new();
            io::stdin().lock().read_line(&mut code)?;
            Ok(code)
        };

        let code = prompt(mfa_serial).map_err(|e| Error::MfaToken(e.to_string()))?;
        non_empty(code)
    }
}

pub struct StaticMfaTokenReader {
    token: String,
}

impl<S: Into<String>> From<S> for StaticMfaTokenReader {
    fn from(s: S) -> Self {
        StaticMfaTokenReader { token: s.into() }
    }
}

#[async_trait]
impl ReadMfaToken for StaticMfaTokenReader {
    async fn read_mfa_token(&self, _mfa_serial: &str) -> Result<String> {
        non_empty(self.token.clone())
    }
}

fn non_empty(code: String) -> Result<String> {
    let code = code.trim();
    if code.is_empty() {
        Err(Error::MfaToken("no code entered".to_string()))
    } else {
        Ok(code.to_string())
    }
}
