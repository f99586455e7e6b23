use std::str::FromStr;

use lettre::Address;

use crate::error::NotificationError;

pub fn validate_recipient(recipient: &str) -> Result<(), NotificationError> {
    let recipient = recipient.trim();

    if recipient.is_empty() {
        return Err(NotificationError::InvalidRequest(
            "Recipient email is required".to_string(),
        ));
    }

    if recipient.len() > 254 {
        return Err(NotificationError::InvalidRequest(
            "Recipient email too long (maximum 254 characters)".to_string(),
        ));
    }

    Address::from_str(recipient).map_err(|e| {
        NotificationError::InvalidRequest(format!("Invalid recipient email '{}': {}", recipient, e))
    })?;

    Ok(())
}
