//! Interactive prompts for wizard mode.

use anyhow::{Result, anyhow};
use inquire::validator::Validation;
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Select, Text};

use crate::types::ProcessorMode;

/// Prompts for an encryption password, entered twice.
pub fn encryption_password() -> Result<String> {
    Password::new("Enter encryption password")
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_custom_confirmation_message("Confirm password")
        .with_custom_confirmation_error_message("passwords do not match")
        .with_validator(not_blank)
        .prompt()
        .map_err(|e| anyhow!("password input failed: {e}"))
}

/// Prompts for a decryption password. A wrong one fails authentication per file.
pub fn decryption_password() -> Result<String> {
    Password::new("Enter decryption password")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(not_blank)
        .prompt()
        .map_err(|e| anyhow!("password input failed: {e}"))
}

pub fn select_processing_mode() -> Result<ProcessorMode> {
    Select::new("Select operation", ProcessorMode::ALL.to_vec()).prompt().map_err(|e| anyhow!("mode selection failed: {e}"))
}

pub fn input_path() -> Result<String> {
    Text::new("File or directory to process")
        .with_default(".")
        .with_validator(not_blank)
        .prompt()
        .map_err(|e| anyhow!("path input failed: {e}"))
}

pub fn worker_count(default: usize) -> Result<usize> {
    CustomType::<usize>::new("Worker threads")
        .with_default(default)
        .with_error_message("Please enter a whole number")
        .prompt()
        .map_err(|e| anyhow!("worker input failed: {e}"))
}

pub fn confirm(message: &str) -> Result<bool> {
    Confirm::new(message).with_default(false).prompt().map_err(|e| anyhow!("confirmation failed: {e}"))
}

#[allow(clippy::unnecessary_wraps)]
fn not_blank(input: &str) -> Result<Validation, inquire::CustomUserError> {
    if input.trim().is_empty() { Ok(Validation::Invalid("value cannot be empty".into())) } else { Ok(Validation::Valid) }
}
