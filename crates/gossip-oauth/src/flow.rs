//! Protocol phases of one in-flight authorization flow.
//!
//! A flow starts when the client is redirected away ([`FlowPhase::AwaitingLogin`]), moves to
//! [`FlowPhase::CodeIssued`] when the callback carrying the code is matched to it, and ends in
//! [`FlowPhase::TokenIssued`] once the code has been exchanged. Phases only move forward.

use crate::error::FlowError;

/// Where a flow stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    /// The browser was sent to the authorization server; no code yet.
    AwaitingLogin,
    /// The callback delivered a code that has not been exchanged yet.
    CodeIssued,
    /// The code was exchanged for an access token.
    TokenIssued,
}

impl FlowPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingLogin => "awaiting_login",
            Self::CodeIssued => "code_issued",
            Self::TokenIssued => "token_issued",
        }
    }
}

impl std::fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flow correlated by its `state` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    pub state: String,
    pub username: String,
    phase: FlowPhase,
}

impl Flow {
    /// A new flow waiting for the user to log in.
    #[must_use]
    pub fn awaiting_login(state: impl Into<String>, username: impl Into<String>) -> Self {
        Self { state: state.into(), username: username.into(), phase: FlowPhase::AwaitingLogin }
    }

    #[must_use]
    pub const fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// The callback arrived with a code.
    pub fn code_issued(&mut self) -> Result<(), FlowError> {
        self.advance(FlowPhase::AwaitingLogin, FlowPhase::CodeIssued)
    }

    /// The code was exchanged for a token.
    pub fn token_issued(&mut self) -> Result<(), FlowError> {
        self.advance(FlowPhase::CodeIssued, FlowPhase::TokenIssued)
    }

    fn advance(&mut self, expected: FlowPhase, next: FlowPhase) -> Result<(), FlowError> {
        if self.phase != expected {
            return Err(FlowError { from: self.phase.as_str(), to: next.as_str() });
        }
        self.phase = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut flow = Flow::awaiting_login("state1", "alice");
        assert_eq!(flow.phase(), FlowPhase::AwaitingLogin);
        flow.code_issued().unwrap();
        assert_eq!(flow.phase(), FlowPhase::CodeIssued);
        flow.token_issued().unwrap();
        assert_eq!(flow.phase(), FlowPhase::TokenIssued);
    }

    #[test]
    fn test_cannot_skip_code() {
        let mut flow = Flow::awaiting_login("state1", "alice");
        let err = flow.token_issued().unwrap_err();
        assert_eq!(err.from, "awaiting_login");
        assert_eq!(err.to, "token_issued");
        assert_eq!(flow.phase(), FlowPhase::AwaitingLogin);
    }

    #[test]
    fn test_code_delivered_once() {
        let mut flow = Flow::awaiting_login("state1", "alice");
        flow.code_issued().unwrap();
        assert!(flow.code_issued().is_err());
    }

    #[test]
    fn test_terminal_phase() {
        let mut flow = Flow::awaiting_login("state1", "alice");
        flow.code_issued().unwrap();
        flow.token_issued().unwrap();
        assert!(flow.code_issued().is_err());
        assert!(flow.token_issued().is_err());
    }
}
