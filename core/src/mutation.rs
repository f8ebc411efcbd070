//! Write actions and their pending/success/error state.
//!
//! Each action (reset history, full reset, create group, generate words,
//! import words) is one POST issued through `Api`; `Mutation` tracks its
//! outcome for the view.
//! Successful resets invalidate the query cache so every view refetches.

use tracing::info;

use crate::api::Api;
use crate::cache::QueryCache;
use crate::error::ApiError;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState<T> {
    Idle,
    Pending,
    Success(T),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Mutation<T> {
    state: MutationState<T>,
}

impl<T> Default for Mutation<T> {
    fn default() -> Self {
        Self {
            state: MutationState::Idle,
        }
    }
}

impl<T> Mutation<T> {
    pub fn state(&self) -> &MutationState<T> {
        &self.state
    }

    pub fn start(&mut self) {
        self.state = MutationState::Pending;
    }

    pub fn finish(&mut self, result: Result<T, ApiError>) {
        self.state = match result {
            Ok(value) => MutationState::Success(value),
            Err(err) => MutationState::Error(err.user_message()),
        };
    }

    /// Runs `action` between `start` and `finish` and returns the stored outcome.
    pub fn run(&mut self, action: impl FnOnce() -> Result<T, ApiError>) -> &MutationState<T> {
        self.start();
        let result = action();
        self.finish(result);
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = MutationState::Idle;
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, MutationState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.state, MutationState::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match &self.state {
            MutationState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            MutationState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// The settings page: two destructive resets, each behind a confirmation.
#[derive(Debug, Default)]
pub struct SettingsActions {
    pub reset_history: Mutation<()>,
    pub full_reset: Mutation<()>,
    confirm_reset_history: bool,
    confirm_full_reset: bool,
}

impl SettingsActions {
    pub fn ask_reset_history(&mut self) {
        self.confirm_reset_history = true;
    }

    pub fn ask_full_reset(&mut self) {
        self.confirm_full_reset = true;
    }

    pub fn cancel(&mut self) {
        self.confirm_reset_history = false;
        self.confirm_full_reset = false;
    }

    pub fn is_confirming_reset_history(&self) -> bool {
        self.confirm_reset_history
    }

    pub fn is_confirming_full_reset(&self) -> bool {
        self.confirm_full_reset
    }

    /// Sends the reset. The confirmation closes only on success.
    pub fn confirm_reset_history<T: Transport>(&mut self, api: &Api<T>, cache: &mut QueryCache) {
        self.reset_history.run(|| api.reset_history());
        if self.reset_history.is_success() {
            info!("study history reset");
            self.confirm_reset_history = false;
            cache.invalidate_all();
        }
    }

    pub fn confirm_full_reset<T: Transport>(&mut self, api: &Api<T>, cache: &mut QueryCache) {
        self.full_reset.run(|| api.full_reset());
        if self.full_reset.is_success() {
            info!("full reset completed");
            self.confirm_full_reset = false;
            cache.invalidate_all();
        }
    }
}
